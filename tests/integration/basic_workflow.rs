//! Integration test for a complete receive and transmit cycle

use crate::common::{Call, Ctx, Operation, Recorder, SimRadio};
use tda5340::registers::{FifoEvents, ReceiverEvents, CMC, IM0, IM2, IS0, IS2, TXC};
use tda5340::{
    Config, ConfigEntry, ConfigSet, Mode, ReceiveHandler, RunMode, Tda5340, TransmitHandler,
};

const CONFIG_A: [ConfigEntry; 4] = [
    ConfigEntry::new(0x0004, 0x21),
    ConfigEntry::new(0x0005, 0x40),
    ConfigEntry::new(0x0104, 0x0C),
    ConfigEntry::new(0x0290, 0x7F),
];

/// Collects a received packet into a buffer
struct PacketCollector {
    packet: [u8; 36],
    bits: usize,
    calls: Recorder,
}

impl Default for PacketCollector {
    fn default() -> Self {
        Self {
            packet: [0; 36],
            bits: 0,
            calls: Recorder::default(),
        }
    }
}

impl ReceiveHandler<Ctx<'_>> for PacketCollector {
    fn frame_sync(&mut self, radio: &mut Ctx<'_>, config: ConfigSet) {
        self.calls.frame_sync(radio, config);
    }

    fn end_of_message(&mut self, radio: &mut Ctx<'_>, config: ConfigSet) {
        self.calls.end_of_message(radio, config);
        self.bits = radio.read_all(&mut self.packet, 288).unwrap();
    }
}

impl TransmitHandler<Ctx<'_>> for PacketCollector {
    fn ready(&mut self, radio: &mut Ctx<'_>) {
        self.calls.ready(radio);
    }
}

#[test]
fn test_receive_then_transmit() {
    let sim = SimRadio::new();
    let mut radio = Tda5340::try_new(
        sim.bus(),
        sim.irq(),
        sim.pon(),
        sim.delay(),
        Config::default(),
    )
    .unwrap();
    let mut handler = PacketCollector::default();

    // power-on interrupt
    sim.power_on();
    radio.handle_interrupt(&mut handler).unwrap();
    assert_eq!(radio.mode(), Mode::Sleep);

    // configure while sleeping
    radio.write_bulk(&CONFIG_A).unwrap();
    for entry in CONFIG_A {
        assert_eq!(sim.register(entry.address), Some(entry.value));
    }
    radio
        .set_receiver_interrupt_mask(
            ReceiverEvents::all()
                .difference(ReceiverEvents::FRAME_SYNC_A | ReceiverEvents::END_OF_MESSAGE_A),
        )
        .unwrap();
    radio
        .set_fifo_interrupt_mask(FifoEvents::RX_ALMOST_FULL | FifoEvents::TX_EMPTY)
        .unwrap();
    assert_eq!(sim.register(IM0), Some(0b1111_0101));
    assert_eq!(sim.register(IM2), Some(0b0000_0101));

    // receive one packet
    radio.set_mode(RunMode::Slave, false, ConfigSet::A).unwrap();
    sim.script_status(IS0, &[0b0000_0010]);
    sim.script_status(IS2, &[0x00]);
    sim.raise_interrupt();
    radio.handle_interrupt(&mut handler).unwrap();

    sim.queue_rx(0xDEAD_BEEF, 32);
    sim.queue_rx(0x0000_0003, 4);
    sim.queue_rx(0, 0);
    sim.script_status(IS0, &[0b0000_1000]);
    sim.script_status(IS2, &[0x00]);
    sim.raise_interrupt();
    radio.handle_interrupt(&mut handler).unwrap();

    assert_eq!(handler.bits, 36);
    assert_eq!(&handler.packet[..5], &[0xEF, 0xBE, 0xAD, 0xDE, 0x03]);

    // answer
    radio.set_mode(RunMode::Sleep, false, ConfigSet::A).unwrap();
    radio
        .set_mode(RunMode::Transmit, true, ConfigSet::A)
        .unwrap();
    radio.write_frame(&handler.packet[..5], 36).unwrap();
    radio.start_transmission().unwrap();

    sim.script_status(IS2, &[0b0100_0000]);
    sim.raise_interrupt();
    radio.handle_interrupt(&mut handler).unwrap();

    assert_eq!(
        handler.calls.calls,
        [
            Call::FrameSync(ConfigSet::A),
            Call::EndOfMessage(ConfigSet::A),
            Call::TxReady
        ]
    );
    let frames = sim.fifo_writes();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].length, 35);
    assert_eq!(frames[0].payload.len(), 5);
    assert_eq!(
        sim.writes_to(CMC),
        [0b0001_0010, 0b0001_0000, 0b0001_0011]
    );
    assert_eq!(sim.writes_to(TXC), [0b0011_1011, 0b1001_1011]);

    // the bus is released and the source enabled after every step
    assert!(!sim.is_selected());
    assert!(!sim.is_masked());
    assert_eq!(sim.count(Operation::Select), sim.count(Operation::Deselect));
    assert_eq!(sim.count(Operation::Mask), sim.count(Operation::Unmask));

    let (_bus, _irq, _pon, _delay) = radio.release();
}
