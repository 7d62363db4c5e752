//! TDA5340 Register File
//!
//! This module provides register level access to the TDA5340 over a [`Transport`].
//! It takes care of:
//! - Framing register accesses as instruction, offset and data byte
//! - Switching SFR pages, with the current page cached to skip redundant switches
//! - Verifying writes through the SPI trace registers and retrying failed ones
//!
//! [`Device`] does not manage chip-select or bus ownership itself. Its methods must be
//! called inside a transaction, see [`Tda5340::transaction`](crate::Tda5340::transaction).
//!
//! # Example
//! ```no_run
//! # use tda5340::{Device, Error, Transport, registers::TxControl};
//! fn dump<T: Transport>(device: &mut Device<T>) -> Result<(), Error<T::Error>> {
//!     let txc: TxControl = device.read()?;
//!     device.write_register(0x0142, 0x1A)?;
//!     Ok(())
//! }
//! ```

use core::convert::Infallible;

use regiface::{ReadableRegister, WritableRegister};

use crate::{
    commands::Command,
    registers::{self, SfrPage, SpiAddressTrace, SpiDataTrace},
    transport::{BitOrder, Transport},
    ConfigEntry, Error,
};

/// Paged register file of the TDA5340
///
/// Wraps the transport and tracks the currently selected SFR page.
pub struct Device<T> {
    transport: T,
    page: Option<u8>,
    retries: u8,
}

impl<T> Device<T> {
    /// Creates a new register file on a freshly reset radio (page 0 selected).
    ///
    /// # Arguments
    /// * `transport` - Bus to the radio
    /// * `retries` - Additional attempts for writes that fail verification
    pub fn new(transport: T, retries: u8) -> Self {
        Self {
            transport,
            page: Some(0),
            retries,
        }
    }

    /// Releases the underlying transport.
    pub fn release(self) -> T {
        self.transport
    }

    /// Cached SFR page, `None` after a failed page switch left it unknown
    pub fn page(&self) -> Option<u8> {
        self.page
    }

    /// Additional attempts for writes that fail verification
    pub fn retries(&self) -> u8 {
        self.retries
    }

    pub(crate) fn set_retries(&mut self, retries: u8) {
        self.retries = retries;
    }

    /// The chip comes out of reset on page 0
    pub(crate) fn assume_reset_page(&mut self) {
        self.page = Some(0);
    }
}

impl<T> Device<T>
where
    T: Transport,
{
    /// Reads a register.
    ///
    /// # Arguments
    /// * `address` - Register address including page bits
    ///
    /// # Errors
    /// * `Error::Bus` - Transport failed
    /// * `Error::WriteVerify` - The required page switch could not be verified
    pub fn read_register(&mut self, address: u16) -> Result<u8, Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("read_register(0x{:04x})", address);
        self.select_page(address)?;
        self.read_offset(registers::offset(address))
    }

    /// Writes a register and verifies the write.
    ///
    /// A write that fails verification is repeated up to [`retries`](Self::retries)
    /// times.
    ///
    /// # Errors
    /// * `Error::Bus` - Transport failed
    /// * `Error::WriteVerify` - The write or the required page switch could not be
    ///   verified
    pub fn write_register(&mut self, address: u16, value: u8) -> Result<(), Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("write_register(0x{:04x}, 0x{:02x})", address, value);
        self.select_page(address)?;
        self.write_with_retries(address, value)
    }

    /// Writes a sequence of registers in order.
    ///
    /// Stops at the first entry that fails; earlier entries stay applied.
    pub fn write_bulk(&mut self, entries: &[ConfigEntry]) -> Result<(), Error<T::Error>> {
        entries
            .iter()
            .try_for_each(|entry| self.write_register(entry.address, entry.value))
    }

    /// Reads a typed register.
    pub fn read<R>(&mut self) -> Result<R, Error<T::Error>>
    where
        R: ReadableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        let raw = self.read_register(R::id())?;
        match R::from_bytes([raw]) {
            Ok(register) => Ok(register),
            Err(never) => match never {},
        }
    }

    /// Writes a typed register, with verification.
    pub fn write<R>(&mut self, register: R) -> Result<(), Error<T::Error>>
    where
        R: WritableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        let [raw] = match register.to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };
        self.write_register(R::id(), raw)
    }

    pub(crate) fn select(&mut self) -> Result<(), Error<T::Error>> {
        Ok(self.transport.select()?)
    }

    pub(crate) fn deselect(&mut self) -> Result<(), Error<T::Error>> {
        Ok(self.transport.deselect()?)
    }

    pub(crate) fn exchange(&mut self, byte: u8) -> Result<u8, Error<T::Error>> {
        Ok(self.transport.exchange(byte)?)
    }

    pub(crate) fn set_bit_order(&mut self, order: BitOrder) -> Result<(), Error<T::Error>> {
        Ok(self.transport.set_bit_order(order)?)
    }

    fn select_page(&mut self, address: u16) -> Result<(), Error<T::Error>> {
        // registers from 0xa0 upwards are mirrored on all pages
        if registers::is_mirrored(address) {
            return Ok(());
        }
        let page = registers::page(address);
        if self.page == Some(page) {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("select page {}", page);
        self.page = None;
        self.write_unpaged(SfrPage { page })?;
        self.page = Some(page);
        Ok(())
    }

    fn write_with_retries(&mut self, address: u16, value: u8) -> Result<(), Error<T::Error>> {
        let offset = registers::offset(address);
        for _ in 0..=self.retries {
            if self.write_verified(offset, value)? {
                return Ok(());
            }
            #[cfg(feature = "defmt")]
            defmt::debug!("write to 0x{:04x} not verified", address);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("giving up on write to 0x{:04x}", address);
        Err(Error::WriteVerify { address, value })
    }

    /// Single write followed by a read back of the trace registers
    fn write_verified(&mut self, offset: u8, value: u8) -> Result<bool, Error<T::Error>> {
        self.write_offset(offset, value)?;
        let last_address: SpiAddressTrace = self.read_unpaged()?;
        let last_data: SpiDataTrace = self.read_unpaged()?;
        Ok(last_address.address == offset && last_data.data == value)
    }

    /// Typed read of a mirrored register, without a page switch
    fn read_unpaged<R>(&mut self) -> Result<R, Error<T::Error>>
    where
        R: ReadableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        let raw = self.read_offset(registers::offset(R::id()))?;
        match R::from_bytes([raw]) {
            Ok(register) => Ok(register),
            Err(never) => match never {},
        }
    }

    /// Typed, verified write of a mirrored register, without a page switch
    fn write_unpaged<R>(&mut self, register: R) -> Result<(), Error<T::Error>>
    where
        R: WritableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        let [raw] = match register.to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };
        self.write_with_retries(R::id(), raw)
    }

    fn read_offset(&mut self, offset: u8) -> Result<u8, Error<T::Error>> {
        self.exchange(Command::ReadRegister.into())?;
        self.exchange(offset)?;
        self.exchange(0x00)
    }

    fn write_offset(&mut self, offset: u8, value: u8) -> Result<(), Error<T::Error>> {
        self.exchange(Command::WriteRegister.into())?;
        self.exchange(offset)?;
        self.exchange(value)?;
        Ok(())
    }
}
