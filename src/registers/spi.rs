//! SPI interface registers
//!
//! The page select register and the two trace registers used to verify writes. All of
//! them are mirrored on every page.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// SFR page register (address: 0x00CF)
///
/// Selects which of the four pages offsets below 0xA0 refer to.
///
/// # Important Notes
/// - Reset value is page 0
/// - Only the two low bits are implemented
#[register(0x00CFu16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct SfrPage {
    /// Selected page, 0 to 3
    pub page: u8,
}

/// SPI address trace register (address: 0x00C8)
///
/// Holds the offset of the most recent register write. Since the bus has no
/// acknowledgement, reading it back is the only way to confirm a write arrived.
#[register(0x00C8u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct SpiAddressTrace {
    /// Offset of the last written register
    pub address: u8,
}

/// SPI data trace register (address: 0x00C9)
///
/// Holds the value of the most recent register write.
#[register(0x00C9u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct SpiDataTrace {
    /// Last written value
    pub data: u8,
}

impl FromByteArray for SfrPage {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            page: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for SfrPage {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.page & 0x03])
    }
}

impl FromByteArray for SpiAddressTrace {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { address: bytes[0] })
    }
}

impl FromByteArray for SpiDataTrace {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { data: bytes[0] })
    }
}
