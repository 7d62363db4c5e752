//! SPI instruction set
//!
//! Every bus transaction starts with one of these instruction bytes, sent MSB first.
//!
//! # Frame formats
//! - [`Command::WriteRegister`]: instruction, address low byte, value
//! - [`Command::ReadRegister`]: instruction, address low byte, dummy byte (value is
//!   clocked out by the radio while the dummy is sent)
//! - [`Command::WriteFifo`]: instruction, bit count minus one, payload bytes LSB first
//! - [`Command::ReadFifo`]: instruction, four data bytes LSB first, one status byte
//!
//! The page bits of a register address are never sent; they are selected
//! beforehand through the SFR page register.

/// TDA5340 SPI instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Write a single register (WR)
    WriteRegister = 0x02,
    /// Read a single register (RD)
    ReadRegister = 0x03,
    /// Read one block from the receive FIFO (RDF)
    ReadFifo = 0x04,
    /// Write a frame into the transmit FIFO (WRF)
    WriteFifo = 0x06,
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command as u8
    }
}
