//! Interrupt status and mask registers
//!
//! The TDA5340 reports events in two groups:
//! - Receiver events per configuration set: IS0 for sets A and B, IS1 for C and D
//! - FIFO and transmitter events: IS2
//!
//! Every status register has a mask register with the same layout. Status registers
//! are cleared on read, and NINT returns high once they have been read.
//!
//! Right after power-on reset all status registers read 0xFF.

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// Receiver events of two configuration sets
    ///
    /// The low nibble belongs to the first set of the register (A or C), the high
    /// nibble to the second (B or D).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ReceiverEvents: u8 {
        /// Wake-up found, first set
        const WAKE_UP_A = 1 << 0;
        /// Frame synchronization, first set
        const FRAME_SYNC_A = 1 << 1;
        /// Message ID match, first set
        const MESSAGE_ID_A = 1 << 2;
        /// End of message, first set
        const END_OF_MESSAGE_A = 1 << 3;
        /// Wake-up found, second set
        const WAKE_UP_B = 1 << 4;
        /// Frame synchronization, second set
        const FRAME_SYNC_B = 1 << 5;
        /// Message ID match, second set
        const MESSAGE_ID_B = 1 << 6;
        /// End of message, second set
        const END_OF_MESSAGE_B = 1 << 7;
    }
}

bitflags! {
    /// FIFO and transmitter events
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FifoEvents: u8 {
        /// Receive FIFO almost full (RXAF)
        const RX_ALMOST_FULL = 1 << 0;
        /// Transmit FIFO empty (TXEMPTY)
        const TX_EMPTY = 1 << 2;
        /// Transmit FIFO almost empty (TXAE)
        const TX_ALMOST_EMPTY = 1 << 3;
        /// Transmitter ready (TXR)
        const TX_READY = 1 << 6;
        /// Transmission error (TXE)
        const TX_ERROR = 1 << 7;
    }
}

/// Interrupt status register 0 (address: 0x00B0)
///
/// Receiver events of configuration sets A and B.
#[register(0x00B0u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct InterruptStatus0 {
    /// Pending events
    pub events: ReceiverEvents,
}

/// Interrupt status register 1 (address: 0x00B1)
///
/// Receiver events of configuration sets C and D.
#[register(0x00B1u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct InterruptStatus1 {
    /// Pending events
    pub events: ReceiverEvents,
}

/// Interrupt status register 2 (address: 0x00B2)
#[register(0x00B2u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct InterruptStatus2 {
    /// Pending events
    pub events: FifoEvents,
}

/// Interrupt mask register 0 (address: 0x00B4)
///
/// Set bits keep the matching event of [`InterruptStatus0`] from pulling NINT low.
#[register(0x00B4u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct InterruptMask0 {
    /// Masked events
    pub masked: ReceiverEvents,
}

/// Interrupt mask register 1 (address: 0x00B5)
#[register(0x00B5u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct InterruptMask1 {
    /// Masked events
    pub masked: ReceiverEvents,
}

/// Interrupt mask register 2 (address: 0x00B6)
#[register(0x00B6u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct InterruptMask2 {
    /// Masked events
    pub masked: FifoEvents,
}

impl FromByteArray for InterruptStatus0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            events: ReceiverEvents::from_bits_retain(bytes[0]),
        })
    }
}

impl FromByteArray for InterruptStatus1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            events: ReceiverEvents::from_bits_retain(bytes[0]),
        })
    }
}

impl FromByteArray for InterruptStatus2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            events: FifoEvents::from_bits_retain(bytes[0]),
        })
    }
}

impl FromByteArray for InterruptMask0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            masked: ReceiverEvents::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for InterruptMask0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.masked.bits()])
    }
}

impl FromByteArray for InterruptMask1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            masked: ReceiverEvents::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for InterruptMask1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.masked.bits()])
    }
}

impl FromByteArray for InterruptMask2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            masked: FifoEvents::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for InterruptMask2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.masked.bits()])
    }
}
