//! Unit tests for FIFO framing

use crate::common::{powered_up_radio, Operation, Radio, SimRadio};
use tda5340::{BitOrder, Config, ConfigSet, Error, Mode, RunMode};

fn transmitting_radio() -> (Radio, SimRadio) {
    let (mut radio, sim) = powered_up_radio(Config::default());
    radio
        .set_mode(RunMode::Transmit, false, ConfigSet::A)
        .unwrap();
    sim.clear_operations();
    (radio, sim)
}

#[test]
fn test_read_all_single_block() {
    let (mut radio, sim) = powered_up_radio(Config::default());
    sim.queue_rx(0xABCD, 16);
    sim.queue_rx(0, 0);

    let mut buf = [0u8; 36];
    let bits = radio.read_all(&mut buf, 288).unwrap();

    assert_eq!(bits, 16);
    assert_eq!(&buf[..2], &[0xCD, 0xAB]);
    // every block is its own transaction
    assert_eq!(sim.count(Operation::FifoRead), 2);
    assert_eq!(sim.count(Operation::Select), 2);
    assert_eq!(sim.count(Operation::Mask), 2);
}

#[test]
fn test_read_all_concatenates_blocks() {
    let (mut radio, sim) = powered_up_radio(Config::default());
    sim.queue_rx(0x1234_5678, 32);
    sim.queue_rx(0b101, 3);
    sim.queue_rx(0b11, 2);

    let mut buf = [0u8; 8];
    let bits = radio.read_all(&mut buf, 64).unwrap();

    assert_eq!(bits, 37);
    assert_eq!(&buf[..5], &[0x78, 0x56, 0x34, 0x12, 0b0001_1101]);
}

#[test]
fn test_read_all_on_empty_fifo() {
    let (mut radio, _sim) = powered_up_radio(Config::default());

    let mut buf = [0u8; 4];
    assert_eq!(radio.read_all(&mut buf, 32).unwrap(), 0);
}

#[test]
fn test_read_all_reports_overflow() {
    let (mut radio, sim) = powered_up_radio(Config::default());
    sim.queue_rx(0xFF, 8);
    sim.queue_rx(0xFFFF, 0x80 | 16);
    sim.queue_rx(0xFF, 8);

    let mut buf = [0u8; 8];
    let result = radio.read_all(&mut buf, 64);

    // no bit count comes back, the packet is to be dropped
    assert!(matches!(result, Err(Error::FifoOverflow)));
    // nothing is read after the overflow
    assert_eq!(sim.count(Operation::FifoRead), 2);
}

#[test]
fn test_read_all_rejects_oversized_block() {
    let (mut radio, sim) = powered_up_radio(Config::default());
    sim.queue_rx(0xFFFF, 16);

    let mut buf = [0u8; 1];
    let result = radio.read_all(&mut buf, 8);

    assert!(matches!(result, Err(Error::BufferTooSmall)));
    assert_eq!(buf, [0x00]);
}

#[test]
fn test_read_all_honours_bit_limit() {
    let (mut radio, sim) = powered_up_radio(Config::default());
    sim.queue_rx(0xAAAA, 16);
    sim.queue_rx(0xFFFF, 16);

    let mut buf = [0u8; 8];
    let result = radio.read_all(&mut buf, 20);

    assert!(matches!(result, Err(Error::BufferTooSmall)));
    assert_eq!(&buf[..3], &[0xAA, 0xAA, 0x00]);
}

#[test]
fn test_read_frame_bit_order() {
    let (mut radio, sim) = powered_up_radio(Config::default());
    sim.queue_rx(0x0102_0304, 32);

    let frame = radio.read_frame().unwrap();

    assert_eq!(frame.data, 0x0102_0304);
    assert_eq!(frame.valid_bits, 32);
    assert!(!frame.overflow);
    // four data bytes lsb first, the status byte msb first
    assert_eq!(
        sim.fifo_read_orders(),
        [vec![
            BitOrder::LsbFirst,
            BitOrder::LsbFirst,
            BitOrder::LsbFirst,
            BitOrder::LsbFirst,
            BitOrder::MsbFirst,
        ]]
    );
}

#[test]
fn test_write_frame_framing() {
    let (mut radio, sim) = transmitting_radio();

    radio.write_frame(&[0xA5, 0x01, 0xEE], 9).unwrap();

    let writes = sim.fifo_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].length, 8);
    assert_eq!(writes[0].length_order, BitOrder::MsbFirst);
    assert_eq!(
        writes[0].payload,
        [(0xA5, BitOrder::LsbFirst), (0x01, BitOrder::LsbFirst)]
    );

    // msb first is restored right after the payload
    let ops = sim.operations();
    let tail = &ops[ops.len() - 4..];
    assert_eq!(
        tail,
        [
            Operation::BitOrder(BitOrder::LsbFirst),
            Operation::BitOrder(BitOrder::MsbFirst),
            Operation::Deselect,
            Operation::Unmask,
        ]
    );
}

#[test]
fn test_write_frame_full_length() {
    let (mut radio, sim) = transmitting_radio();
    let data = [0x5Au8; 32];

    radio.write_frame(&data, 256).unwrap();

    let writes = sim.fifo_writes();
    assert_eq!(writes[0].length, 255);
    assert_eq!(writes[0].payload.len(), 32);
}

#[test]
fn test_write_frame_rejects_bad_lengths() {
    let (mut radio, sim) = transmitting_radio();

    for (data, bits) in [(&[0u8; 1][..], 0), (&[0u8; 33][..], 257), (&[0u8; 1][..], 9)] {
        let result = radio.write_frame(data, bits);
        assert!(
            matches!(result, Err(Error::InvalidFrameLength(b)) if b == bits),
            "{bits} bits accepted"
        );
    }
    assert!(sim.operations().is_empty());
}

#[test]
fn test_write_frame_requires_transmit_mode() {
    let (mut radio, sim) = powered_up_radio(Config::default());

    let result = radio.write_frame(&[0xFF], 8);

    assert!(matches!(result, Err(Error::WrongMode(Mode::Sleep))));
    assert!(sim.operations().is_empty());
    assert!(sim.fifo_writes().is_empty());
}
