use core::convert::Infallible;

use bitflags::bitflags;
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use regiface::{ReadableRegister, WritableRegister};

use crate::{
    device::Device,
    fifo::FifoFrame,
    radio::Tda5340,
    transport::{InterruptSource, Transport},
    Config, ConfigSet, Error, Mode,
};

bitflags! {
    /// Events dispatched by [`Tda5340::handle_interrupt`](crate::Tda5340::handle_interrupt)
    #[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
    pub struct Events: u16 {
        const FrameSyncA = 1;
        const FrameSyncB = (1 << 1);
        const EndOfMessageA = (1 << 2);
        const EndOfMessageB = (1 << 3);
        const RxFifoAlmostFull = (1 << 4);
        const TxError = (1 << 5);
        const TxFifoAlmostEmpty = (1 << 6);
        const TxFifoEmpty = (1 << 7);
        const TxReady = (1 << 8);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Events {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Events {{ 0b{0=0..16:016b} }}", self.bits())
    }
}

/// The driver as seen from handler callbacks
///
/// Callbacks run in interrupt context, with the NINT source masked. They get register
/// and FIFO access but cannot change the mode or reset the radio; those stay with the
/// foreground. Bus accesses made through the context leave the source masked.
///
/// Mode changes are not reachable from a callback:
/// ```compile_fail
/// use tda5340::{ConfigSet, IrqContext, ReceiveHandler, RunMode};
///
/// struct Switch;
///
/// impl<T, IRQ, PON, DELAY> ReceiveHandler<IrqContext<'_, T, IRQ, PON, DELAY>> for Switch {
///     fn frame_sync(&mut self, radio: &mut IrqContext<'_, T, IRQ, PON, DELAY>, _: ConfigSet) {
///         let _ = radio.set_mode(RunMode::Transmit, false, ConfigSet::A);
///     }
/// }
/// ```
///
/// Neither is a nested interrupt:
/// ```compile_fail
/// use tda5340::{ConfigSet, IrqContext, NoHandler, ReceiveHandler};
///
/// struct Nested;
///
/// impl<T, IRQ, PON, DELAY> ReceiveHandler<IrqContext<'_, T, IRQ, PON, DELAY>> for Nested {
///     fn frame_sync(&mut self, radio: &mut IrqContext<'_, T, IRQ, PON, DELAY>, _: ConfigSet) {
///         let _ = radio.handle_interrupt(&mut NoHandler);
///     }
/// }
/// ```
pub struct IrqContext<'a, T, IRQ, PON, DELAY> {
    radio: &'a mut Tda5340<T, IRQ, PON, DELAY>,
}

impl<'a, T, IRQ, PON, DELAY> IrqContext<'a, T, IRQ, PON, DELAY> {
    pub(crate) fn new(radio: &'a mut Tda5340<T, IRQ, PON, DELAY>) -> Self {
        Self { radio }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.radio.mode()
    }

    /// Whether transmissions use start bit framing
    pub fn send_start_bit(&self) -> bool {
        self.radio.send_start_bit()
    }

    /// Get common config
    pub fn config(&self) -> Config {
        self.radio.config()
    }
}

impl<T, IRQ, PON, DELAY> IrqContext<'_, T, IRQ, PON, DELAY>
where
    T: Transport,
    IRQ: InterruptSource,
    PON: OutputPin,
    DELAY: DelayNs,
{
    /// See [`Tda5340::transaction`]
    pub fn transaction<R>(
        &mut self,
        f: impl FnOnce(&mut Device<T>) -> Result<R, Error<T::Error>>,
    ) -> Result<R, Error<T::Error>> {
        self.radio.transaction(f)
    }

    /// See [`Tda5340::read_register`]
    pub fn read_register(&mut self, address: u16) -> Result<u8, Error<T::Error>> {
        self.radio.read_register(address)
    }

    /// See [`Tda5340::write_register`]
    pub fn write_register(&mut self, address: u16, value: u8) -> Result<(), Error<T::Error>> {
        self.radio.write_register(address, value)
    }

    /// See [`Tda5340::read`]
    pub fn read<R>(&mut self) -> Result<R, Error<T::Error>>
    where
        R: ReadableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        self.radio.read()
    }

    /// See [`Tda5340::write`]
    pub fn write<R>(&mut self, register: R) -> Result<(), Error<T::Error>>
    where
        R: WritableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        self.radio.write(register)
    }

    /// See [`Tda5340::read_frame`]
    pub fn read_frame(&mut self) -> Result<FifoFrame, Error<T::Error>> {
        self.radio.read_frame()
    }

    /// See [`Tda5340::read_all`]
    pub fn read_all(&mut self, buf: &mut [u8], max_bits: usize) -> Result<usize, Error<T::Error>> {
        self.radio.read_all(buf, max_bits)
    }

    /// See [`Tda5340::write_frame`]
    pub fn write_frame(&mut self, data: &[u8], bits: usize) -> Result<(), Error<T::Error>> {
        self.radio.write_frame(data, bits)
    }

    /// See [`Tda5340::start_transmission`]
    pub fn start_transmission(&mut self) -> Result<(), Error<T::Error>> {
        self.radio.start_transmission()
    }
}

/// Callbacks for the receive modes
///
/// Every method defaults to doing nothing, so implementors only override the events
/// they care about. Callbacks run in interrupt context after the status registers have
/// been read. `radio` is an [`IrqContext`], e.g. to drain the FIFO.
///
/// Events raised together are dispatched in frame order: frame sync A, frame sync B,
/// end of message A, end of message B, then FIFO almost full.
pub trait ReceiveHandler<R> {
    /// A frame start was detected
    fn frame_sync(&mut self, _radio: &mut R, _config: ConfigSet) {}

    /// A frame ended
    fn end_of_message(&mut self, _radio: &mut R, _config: ConfigSet) {}

    /// The receive FIFO is almost full and should be drained
    fn fifo_almost_full(&mut self, _radio: &mut R) {}
}

/// Callbacks for the transmit mode
///
/// Events raised together are dispatched as error, FIFO almost empty, FIFO empty, then
/// transmitter ready.
pub trait TransmitHandler<R> {
    /// Transmission error
    fn error(&mut self, _radio: &mut R) {}

    /// The transmit FIFO is almost empty and can be refilled
    fn fifo_almost_empty(&mut self, _radio: &mut R) {}

    /// The transmit FIFO ran empty
    fn fifo_empty(&mut self, _radio: &mut R) {}

    /// The transmitter is ready for the next transmission
    fn ready(&mut self, _radio: &mut R) {}
}

/// Handler that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHandler;

impl<R> ReceiveHandler<R> for NoHandler {}

impl<R> TransmitHandler<R> for NoHandler {}
