//! Mode and data path control registers
//!
//! This module contains the registers written on every mode change:
//! - Chip mode control, selecting the operating mode and configuration set
//! - Transmitter control, configuring the transmit FIFO and start bit framing
//! - Receiver control, configuring receive FIFO initialization

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::{ConfigSet, RunMode};

/// Chip mode control register (address: 0x00B8)
///
/// Selects the operating mode and the active configuration set.
///
/// # Important Notes
/// - The register is write only, so it cannot be updated with read-modify-write.
///   Every write must carry the complete intended state.
/// - The driver always enables the brown-out detector
#[register(0x00B8u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct ChipModeControl {
    /// Mode select (MSEL, bits 1:0)
    pub mode: RunMode,
    /// Configuration set select (MCS, bits 3:2)
    pub config: ConfigSet,
    /// Brown-out detector enable (ENBOD, bit 4)
    pub brown_out_detector: bool,
}

bitflags! {
    /// Transmitter control bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TxControlFlags: u8 {
        /// Fall back to a safe state if the FIFO runs dry mid frame (TXFAILSAFE)
        const FAILSAFE = 1 << 0;
        /// Go to transmitter ready once the FIFO is empty instead of repeating the last
        /// bit (TXENDFIFO)
        const END_ON_FIFO_EMPTY = 1 << 1;
        /// Start bit framing, prefix each transmission with a start bit (TXMODE)
        const START_BIT_MODE = 1 << 3;
        /// Synchronize FIFO reads to the baud rate generator (TXBDRSYNC)
        const BAUD_RATE_SYNC = 1 << 4;
        /// Clear the transmit FIFO (INITTXFIFO, self clearing)
        const INIT_FIFO = 1 << 5;
        /// Start transmitting the FIFO contents (TXSTART, self clearing)
        const START = 1 << 7;
    }
}

impl TxControlFlags {
    /// Value after reset
    pub const RESET: Self = Self::empty();

    /// Starts from the reset value, sets all bits in `set` and clears those in `clear`
    pub const fn from_reset(set: Self, clear: Self) -> Self {
        Self::RESET.union(set).difference(clear)
    }
}

/// Transmitter control register (address: 0x00BA)
#[register(0x00BAu16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct TxControl {
    /// Control bits
    pub flags: TxControlFlags,
}

bitflags! {
    /// Receiver control bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RxControlFlags: u8 {
        /// Initialize the receive FIFO on every frame start (FSINITRXFIFO)
        const FS_INIT_FIFO = 1 << 2;
        /// Initialize the receive FIFO now (INITRXFIFO, self clearing)
        const INIT_FIFO = 1 << 3;
    }
}

impl RxControlFlags {
    /// Value after reset
    pub const RESET: Self = Self::from_bits_retain(0x84);

    /// Starts from the reset value, sets all bits in `set` and clears those in `clear`
    pub const fn from_reset(set: Self, clear: Self) -> Self {
        Self::RESET.union(set).difference(clear)
    }
}

/// Receiver control register (address: 0x00BC)
#[register(0x00BCu16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct RxControl {
    /// Control bits, including bits the driver does not interpret
    pub flags: RxControlFlags,
}

impl Default for RxControl {
    fn default() -> Self {
        Self {
            flags: RxControlFlags::RESET,
        }
    }
}

impl ToByteArray for ChipModeControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.mode as u8 & 0x03)
            | ((self.config as u8 & 0x03) << 2)
            | ((self.brown_out_detector as u8) << 4)])
    }
}

impl FromByteArray for TxControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: TxControlFlags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for TxControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl FromByteArray for RxControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: RxControlFlags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for RxControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}
