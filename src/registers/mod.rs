//! Register definitions for the TDA5340
//!
//! Register addresses are 16 bit wide. The low byte is the offset sent on the bus, bits
//! 8 and 9 select one of four SFR pages. Offsets from 0xA0 upwards are mirrored on
//! every page and can be accessed without a page switch.
//!
//! Only the registers the driver itself operates on are defined here. Configuration
//! registers are loaded as raw [`ConfigEntry`](crate::ConfigEntry) tables.

mod control;
mod spi;
mod status;

pub use control::*;
pub use spi::*;
pub use status::*;

/// First offset that is mirrored on all pages
pub const MIRRORED_OFFSET: u8 = 0xA0;

/// Value of every interrupt status register right after power-on reset
pub const POR_STATUS: u8 = 0xFF;

/// SFR page select register
pub const SFRPAGE: u16 = 0x00CF;
/// SPI address trace, offset of the most recent register write
pub const SPIAT: u16 = 0x00C8;
/// SPI data trace, value of the most recent register write
pub const SPIDT: u16 = 0x00C9;
/// Chip mode control (write only)
pub const CMC: u16 = 0x00B8;
/// Transmitter control
pub const TXC: u16 = 0x00BA;
/// Receiver control
pub const RXC: u16 = 0x00BC;
/// Interrupt status 0, configurations A and B
pub const IS0: u16 = 0x00B0;
/// Interrupt status 1, configurations C and D
pub const IS1: u16 = 0x00B1;
/// Interrupt status 2, FIFO and transmitter events
pub const IS2: u16 = 0x00B2;
/// Interrupt mask 0, configurations A and B
pub const IM0: u16 = 0x00B4;
/// Interrupt mask 1, configurations C and D
pub const IM1: u16 = 0x00B5;
/// Interrupt mask 2, FIFO and transmitter events
pub const IM2: u16 = 0x00B6;

/// SFR page an address lives on
pub const fn page(address: u16) -> u8 {
    ((address >> 8) & 0x03) as u8
}

/// Offset of an address within its page, as sent on the bus
pub const fn offset(address: u16) -> u8 {
    (address & 0xFF) as u8
}

/// Whether an address is reachable from every page
pub const fn is_mirrored(address: u16) -> bool {
    offset(address) >= MIRRORED_OFFSET
}
