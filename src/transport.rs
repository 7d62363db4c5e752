//! Bus transport abstraction
//!
//! The driver core only needs a handful of primitives from the platform: a blocking
//! full-duplex byte exchange, control over the chip-select line, the ability to flip
//! the shift direction of the bus, and control over the NINT interrupt source.
//! Everything else (pin muxing, clock setup, interrupt priorities) stays outside of
//! this crate.
//!
//! [`HalTransport`] implements [`Transport`] on top of any `embedded-hal`
//! [`SpiBus`] plus a chip-select [`OutputPin`]. Peripherals without a hardware
//! LSB-first mode are handled by mirroring each byte in software.

use embedded_hal::{digital::OutputPin, spi::SpiBus};

/// Shift direction of bytes on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first, used for all register traffic
    #[default]
    MsbFirst,
    /// Least significant bit first, used for FIFO payload bytes only
    LsbFirst,
}

/// Synchronous byte transport to the radio
///
/// Implementations block until each byte has been exchanged. The driver brackets every
/// group of exchanges with [`select`](Transport::select) and
/// [`deselect`](Transport::deselect).
pub trait Transport {
    /// Transport error type
    type Error;

    /// Send `byte` and return the byte clocked in at the same time
    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Assert chip-select
    fn select(&mut self) -> Result<(), Self::Error>;

    /// Deassert chip-select
    fn deselect(&mut self) -> Result<(), Self::Error>;

    /// Change the shift direction for subsequent exchanges
    fn set_bit_order(&mut self, order: BitOrder) -> Result<(), Self::Error>;
}

/// The NINT interrupt source as seen from the driver
pub trait InterruptSource {
    /// Keep the interrupt handler from running
    fn mask(&mut self);

    /// Allow the interrupt handler to run again
    fn unmask(&mut self);

    /// State of the edge detection flag, set on the falling edge of NINT and cleared
    /// by hardware on the rising edge
    fn is_pending(&mut self) -> bool;
}

/// Errors of [`HalTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError<S, P> {
    /// SPI bus error
    Spi(S),
    /// Chip-select pin error
    ChipSelect(P),
}

/// [`Transport`] over an `embedded-hal` SPI bus and a manually driven chip-select pin
///
/// The bus must be configured for SPI mode 0, MSB first. A separate chip-select pin
/// is required since the radio expects several instructions within one selection.
pub struct HalTransport<SPI, CS> {
    spi: SPI,
    cs: CS,
    order: BitOrder,
}

impl<SPI, CS> HalTransport<SPI, CS> {
    /// Creates a new transport from an SPI bus and its chip-select pin
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            spi,
            cs,
            order: BitOrder::MsbFirst,
        }
    }

    /// Current shift direction
    pub fn bit_order(&self) -> BitOrder {
        self.order
    }

    /// Releases the SPI bus and chip-select pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Transport for HalTransport<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    type Error = HalError<SPI::Error, CS::Error>;

    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut buf = match self.order {
            BitOrder::MsbFirst => [byte],
            BitOrder::LsbFirst => [byte.reverse_bits()],
        };
        self.spi.transfer_in_place(&mut buf).map_err(HalError::Spi)?;
        Ok(match self.order {
            BitOrder::MsbFirst => buf[0],
            BitOrder::LsbFirst => buf[0].reverse_bits(),
        })
    }

    fn select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(HalError::ChipSelect)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.spi.flush().map_err(HalError::Spi)?;
        self.cs.set_high().map_err(HalError::ChipSelect)
    }

    fn set_bit_order(&mut self, order: BitOrder) -> Result<(), Self::Error> {
        self.order = order;
        Ok(())
    }
}
