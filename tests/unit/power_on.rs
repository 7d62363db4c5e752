//! Unit tests for power-on validation in reset mode

use crate::common::{create_radio, Operation, Recorder, SimRadio};
use tda5340::registers::{IS0, IS1, IS2};
use tda5340::{Config, Error, Events, Mode, NoHandler, Tda5340};

#[test]
fn test_try_new_pulses_reset() {
    let sim = SimRadio::new();

    let radio = Tda5340::try_new(
        sim.bus(),
        sim.irq(),
        sim.pon(),
        sim.delay(),
        Config::default(),
    )
    .unwrap();

    assert_eq!(radio.mode(), Mode::Reset);
    assert_eq!(
        sim.operations(),
        [
            Operation::PowerOff,
            Operation::Delay(200),
            Operation::PowerOn
        ]
    );
}

#[test]
fn test_valid_power_on_enters_sleep() {
    let (mut radio, sim) = create_radio(Config::default());
    sim.power_on();

    let events = radio.handle_interrupt(&mut NoHandler).unwrap();

    assert_eq!(events, Events::empty());
    assert_eq!(radio.mode(), Mode::Sleep);
    assert_eq!(sim.reads(), [IS0, IS1, IS2, IS2]);
    // the interrupt path never toggles the source itself
    assert_eq!(sim.count(Operation::Mask), 0);
    assert_eq!(sim.count(Operation::PowerOff), 0);
}

#[test]
fn test_sleep_entered_exactly_once() {
    let (mut radio, sim) = create_radio(Config::default());
    sim.power_on();
    radio.handle_interrupt(&mut NoHandler).unwrap();
    sim.clear_operations();

    // further interrupts in sleep touch nothing
    sim.raise_interrupt();
    let events = radio.handle_interrupt(&mut NoHandler).unwrap();

    assert!(events.is_empty());
    assert_eq!(radio.mode(), Mode::Sleep);
    assert!(sim.operations().is_empty());
}

#[test]
fn test_without_edge_nothing_happens() {
    let (mut radio, sim) = create_radio(Config::default());

    radio.handle_interrupt(&mut NoHandler).unwrap();

    assert_eq!(radio.mode(), Mode::Reset);
    assert!(sim.operations().is_empty());
}

#[test]
fn test_status_mismatch_pulses_reset() {
    let (mut radio, sim) = create_radio(Config::default());
    sim.script_status(IS0, &[0xFF]);
    sim.script_status(IS1, &[0x7F]);
    sim.raise_interrupt();

    radio.handle_interrupt(&mut NoHandler).unwrap();

    assert_eq!(radio.mode(), Mode::Reset);
    // IS2 is not read once a status register is off
    assert_eq!(sim.reads(), [IS0, IS1]);
    assert_eq!(sim.count(Operation::PowerOff), 1);
    assert_eq!(sim.count(Operation::PowerOn), 1);
}

#[test]
fn test_residual_status_pulses_reset() {
    let (mut radio, sim) = create_radio(Config::default());
    sim.script_status(IS0, &[0xFF]);
    sim.script_status(IS1, &[0xFF]);
    sim.script_status(IS2, &[0xFF, 0x04]);
    sim.raise_interrupt();

    radio.handle_interrupt(&mut NoHandler).unwrap();

    assert_eq!(radio.mode(), Mode::Reset);
    assert_eq!(sim.reads(), [IS0, IS1, IS2, IS2]);
    assert_eq!(sim.count(Operation::PowerOff), 1);
}

#[test]
fn test_recovers_after_failed_attempt() {
    let (mut radio, sim) = create_radio(Config::default());
    sim.script_status(IS0, &[0x00]);
    sim.raise_interrupt();
    radio.handle_interrupt(&mut NoHandler).unwrap();
    assert_eq!(radio.mode(), Mode::Reset);

    sim.power_on();
    radio.handle_interrupt(&mut Recorder::default()).unwrap();

    assert_eq!(radio.mode(), Mode::Sleep);
}

#[test]
fn test_reset_attempts_bounded_by_config() {
    let (mut radio, sim) = create_radio(Config {
        max_reset_attempts: Some(2),
        ..Config::default()
    });

    for _ in 0..2 {
        sim.script_status(IS0, &[0x00]);
        sim.raise_interrupt();
        radio.handle_interrupt(&mut NoHandler).unwrap();
    }
    sim.script_status(IS0, &[0x00]);
    sim.raise_interrupt();
    let result = radio.handle_interrupt(&mut NoHandler);

    assert!(matches!(result, Err(Error::ResetFailed)));
    assert_eq!(radio.mode(), Mode::Reset);
    assert_eq!(sim.count(Operation::PowerOff), 2);
}

#[test]
fn test_foreground_reset_clears_attempts() {
    let (mut radio, sim) = create_radio(Config {
        max_reset_attempts: Some(1),
        ..Config::default()
    });
    sim.script_status(IS0, &[0x00]);
    sim.raise_interrupt();
    radio.handle_interrupt(&mut NoHandler).unwrap();

    radio.reset().unwrap();
    sim.script_status(IS0, &[0x00]);
    sim.raise_interrupt();

    // one more attempt is allowed after the explicit reset
    radio.handle_interrupt(&mut NoHandler).unwrap();
    assert_eq!(sim.count(Operation::PowerOff), 3);
}

#[test]
fn test_unbounded_attempts_by_default() {
    let (mut radio, sim) = create_radio(Config::default());

    for _ in 0..10 {
        sim.script_status(IS0, &[0x12]);
        sim.raise_interrupt();
        radio.handle_interrupt(&mut NoHandler).unwrap();
    }

    assert_eq!(radio.mode(), Mode::Reset);
    assert_eq!(sim.count(Operation::PowerOff), 10);
}
