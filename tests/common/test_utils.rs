//! Test utilities and helper functions

use tda5340::{Config, ConfigSet, IrqContext, ReceiveHandler, Tda5340, TransmitHandler};

use crate::common::sim::{SimBus, SimDelay, SimIrq, SimPon, SimRadio};

/// Driver type wired to a [`SimRadio`]
pub type Radio = Tda5340<SimBus, SimIrq, SimPon, SimDelay>;

/// What handler callbacks of a [`Radio`] get
pub type Ctx<'a> = IrqContext<'a, SimBus, SimIrq, SimPon, SimDelay>;

/// Create a driver in reset mode without any bus traffic
/// Returns (driver, sim) where sim shares state with the driver
pub fn create_radio(cfg: Config) -> (Radio, SimRadio) {
    let sim = SimRadio::new();
    let radio = Tda5340::new(sim.bus(), sim.irq(), sim.pon(), sim.delay(), cfg);
    (radio, sim)
}

/// Create a driver that has gone through power-on validation and sleeps
///
/// The operation log is cleared before returning.
pub fn powered_up_radio(cfg: Config) -> (Radio, SimRadio) {
    let (mut radio, sim) = create_radio(cfg);
    sim.power_on();
    radio
        .handle_interrupt(&mut Recorder::default())
        .expect("power-on validation failed");
    assert_eq!(radio.mode(), tda5340::Mode::Sleep);
    sim.clear_operations();
    (radio, sim)
}

/// Handler callback invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    FrameSync(ConfigSet),
    EndOfMessage(ConfigSet),
    FifoAlmostFull,
    TxError,
    TxFifoAlmostEmpty,
    TxFifoEmpty,
    TxReady,
}

/// Handler recording every callback in order
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

impl<R> ReceiveHandler<R> for Recorder {
    fn frame_sync(&mut self, _radio: &mut R, config: ConfigSet) {
        self.calls.push(Call::FrameSync(config));
    }

    fn end_of_message(&mut self, _radio: &mut R, config: ConfigSet) {
        self.calls.push(Call::EndOfMessage(config));
    }

    fn fifo_almost_full(&mut self, _radio: &mut R) {
        self.calls.push(Call::FifoAlmostFull);
    }
}

impl<R> TransmitHandler<R> for Recorder {
    fn error(&mut self, _radio: &mut R) {
        self.calls.push(Call::TxError);
    }

    fn fifo_almost_empty(&mut self, _radio: &mut R) {
        self.calls.push(Call::TxFifoAlmostEmpty);
    }

    fn fifo_empty(&mut self, _radio: &mut R) {
        self.calls.push(Call::TxFifoEmpty);
    }

    fn ready(&mut self, _radio: &mut R) {
        self.calls.push(Call::TxReady);
    }
}
