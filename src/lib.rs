#![no_std]
//! TDA5340 Radio Driver
//!
//! This crate provides a platform agnostic driver for the Infineon TDA5340 sub-GHz
//! transceiver. The TDA5340 is a multi-channel ASK/FSK transceiver for the 300-960 MHz
//! bands, controlled over a four wire SPI bus plus an active-low interrupt line (NINT)
//! and a power-on pin (P_ON).
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`transport`]: The minimal synchronous bus abstraction the core runs on
//!   - [`Transport`]: byte exchange, chip-select and bit order control
//!   - [`InterruptSource`]: masking and edge flag of the NINT interrupt
//!   - [`HalTransport`]: an adapter over `embedded-hal` SPI bus and chip-select pin
//!
//! - [`device`]: Register file over the bus
//!   - SPI command framing
//!   - SFR page switching with a cached page
//!   - Write verification against the SPI trace registers, with bounded retries
//!
//! - [`fifo`]: FIFO framing and bit packing for the transmit and receive FIFOs
//!
//! - [`lock`]: Bus ownership tracking between the foreground and the interrupt handler
//!
//! - [`radio`]: The [`Tda5340`] driver, mode state machine and interrupt dispatch
//!
//! - [`registers`]: Typed definitions of the registers the driver operates on
//!
//! - [`irq`]: Interrupt events and the handler traits they are dispatched to
//!
//! # Usage
//! 1. Create a [`Tda5340`] with a [`Transport`], an [`InterruptSource`], the P_ON pin
//!    and a delay provider, then call [`Tda5340::reset`]
//! 2. Call [`Tda5340::handle_interrupt`] from the NINT interrupt handler. The first
//!    interrupt after a reset validates the power-on status and moves the radio
//!    from [`Mode::Reset`] to [`Mode::Sleep`]
//! 3. Load a configuration with [`Tda5340::write_bulk`] while sleeping
//! 4. Enter a receive or transmit mode with [`Tda5340::set_mode`]
//! 5. Exchange data through [`Tda5340::write_frame`] and [`Tda5340::read_all`],
//!    usually from within the [`ReceiveHandler`] and [`TransmitHandler`] callbacks
//!
//! # Important Notes
//! - The SPI bus gives no acknowledgement; every register write is read back through
//!   the trace registers and retried up to [`Config::write_retries`] times
//! - Foreground bus transactions mask the interrupt source for their duration
//! - Only the interrupt handler moves the radio out of [`Mode::Reset`]; every other
//!   mode change is made by the foreground through [`Tda5340::set_mode`]
//! - Callbacks get an [`IrqContext`] with register and FIFO access only
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::OutputPin};
//! use tda5340::{ConfigSet, Error, InterruptSource, RunMode, Tda5340, Transport};
//!
//! fn start_receiver<T, IRQ, PON, D>(
//!     radio: &mut Tda5340<T, IRQ, PON, D>,
//! ) -> Result<(), Error<T::Error>>
//! where
//!     T: Transport,
//!     IRQ: InterruptSource,
//!     PON: OutputPin,
//!     D: DelayNs,
//! {
//!     radio.set_mode(RunMode::Slave, false, ConfigSet::A)
//! }
//! ```

pub mod commands;
pub mod config;
pub mod device;
pub mod fifo;
pub mod irq;
pub mod lock;
pub mod radio;
pub mod registers;
pub mod transport;

pub use config::{Config, ConfigEntry, ConfigSet, Mode, RunMode};
pub use device::Device;
pub use fifo::{BitBuffer, FifoFrame};
pub use irq::{Events, IrqContext, NoHandler, ReceiveHandler, TransmitHandler};
pub use lock::{LockGuard, TransactionLock};
pub use radio::{Handler, Tda5340};
pub use transport::{BitOrder, HalTransport, InterruptSource, Transport};

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error on the underlying transport
    Bus(E),
    /// The P_ON pin could not be driven
    Pin,
    /// A register write could not be verified after all retries
    WriteVerify {
        /// Register that was written
        address: u16,
        /// Value that was written
        value: u8,
    },
    /// The receive FIFO overflowed, some data was lost
    FifoOverflow,
    /// The destination buffer cannot hold the received bits
    BufferTooSmall,
    /// A FIFO write frame must hold 1 to 256 bits, backed by enough payload bytes
    InvalidFrameLength(usize),
    /// The operation is not available in the current mode
    WrongMode(Mode),
    /// The power-on status could not be validated within the configured attempts
    ResetFailed,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
