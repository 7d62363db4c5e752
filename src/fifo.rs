//! FIFO framing and bit packing
//!
//! The TDA5340 moves payload through two FIFOs with unusual framing:
//!
//! - Transmit: a [`Command::WriteFifo`] instruction, a length byte holding the number
//!   of bits minus one, then the payload. Up to 256 bits per frame.
//! - Receive: a [`Command::ReadFifo`] instruction returns four data bytes and a status
//!   byte. The status holds the number of valid bits (bits 5:0) and an overflow flag
//!   (bit 7). At most 32 bits are valid per read; zero valid bits mean the FIFO is
//!   drained or the frame was truncated.
//!
//! Payload bytes travel LSB first, while instructions, lengths and status bytes keep
//! the regular MSB first order. The first payload byte holds the earliest bits.
//!
//! [`BitBuffer`] accumulates received blocks into a byte slice, bit `n` of the stream
//! being bit `n % 8` of byte `n / 8`.

use crate::{
    commands::Command,
    device::Device,
    transport::{BitOrder, Transport},
    Error,
};

/// Maximum number of bits in one transmit frame
pub const MAX_WRITE_BITS: usize = 256;

/// Maximum number of valid bits in one receive block
pub const MAX_READ_BITS: u8 = 32;

/// Size of the receive FIFO, in bits
pub const RX_FIFO_BITS: usize = 288;

const STATUS_OVERFLOW: u8 = 1 << 7;
const STATUS_VALID_BITS: u8 = 0x3F;

/// One block read from the receive FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoFrame {
    /// Received bits, the earliest bit in bit 0
    pub data: u32,
    /// Number of valid bits in `data`, 0 to 32
    pub valid_bits: u8,
    /// The FIFO overflowed and data was lost
    pub overflow: bool,
}

impl FifoFrame {
    /// Decodes the data bytes (in bus order) and the status byte of a FIFO read
    ///
    /// A valid bit count above 32 cannot be backed by the data word and is clamped.
    pub fn decode(data: [u8; 4], status: u8) -> Self {
        Self {
            data: u32::from_le_bytes(data),
            valid_bits: (status & STATUS_VALID_BITS).min(MAX_READ_BITS),
            overflow: status & STATUS_OVERFLOW != 0,
        }
    }

    /// Whether this block ends the transfer (drained FIFO or truncated frame)
    pub fn is_end(&self) -> bool {
        self.valid_bits == 0
    }
}

/// The destination of a [`BitBuffer`] is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferFull;

/// Bit accumulator over a byte slice
#[derive(Debug)]
pub struct BitBuffer<'a> {
    buf: &'a mut [u8],
    len: usize,
    capacity: usize,
}

impl<'a> BitBuffer<'a> {
    /// Creates an empty accumulator using all of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        let capacity = buf.len() * 8;
        Self {
            buf,
            len: 0,
            capacity,
        }
    }

    /// Creates an empty accumulator holding at most `max_bits`
    pub fn with_limit(buf: &'a mut [u8], max_bits: usize) -> Self {
        let capacity = max_bits.min(buf.len() * 8);
        Self {
            buf,
            len: 0,
            capacity,
        }
    }

    /// Number of accumulated bits
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bits have been accumulated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bits
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Accumulated bytes, the last one possibly partial
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len.div_ceil(8)]
    }

    /// Appends the low `bits` bits of `word`, bit 0 first.
    ///
    /// Nothing is written if the bits do not fit.
    pub fn push(&mut self, word: u32, bits: u8) -> Result<(), BufferFull> {
        let bits = usize::from(bits.min(MAX_READ_BITS));
        if self.len + bits > self.capacity {
            return Err(BufferFull);
        }

        for i in 0..bits {
            let pos = self.len + i;
            let mask = 1 << (pos % 8);
            if (word >> i) & 1 != 0 {
                self.buf[pos / 8] |= mask;
            } else {
                self.buf[pos / 8] &= !mask;
            }
        }
        self.len += bits;
        Ok(())
    }
}

/// Number of payload bytes for a transmit frame of `bits` bits
pub(crate) fn payload_len(bits: usize) -> Option<usize> {
    if (1..=MAX_WRITE_BITS).contains(&bits) {
        Some(bits.div_ceil(8))
    } else {
        None
    }
}

/// Number of payload bytes sent for a frame of `bits`, if `data` holds them
pub(crate) fn check_frame<E>(data: &[u8], bits: usize) -> Result<usize, Error<E>> {
    match payload_len(bits) {
        Some(bytes) if bytes <= data.len() => Ok(bytes),
        _ => Err(Error::InvalidFrameLength(bits)),
    }
}

impl<T> Device<T>
where
    T: Transport,
{
    /// Writes one frame into the transmit FIFO.
    ///
    /// # Arguments
    /// * `data` - Payload, the first bit to send in bit 0 of the first byte
    /// * `bits` - Number of bits to send, 1 to 256
    ///
    /// # Errors
    /// * `Error::InvalidFrameLength` - `bits` out of range or not covered by `data`
    /// * `Error::Bus` - Transport failed
    pub fn write_fifo(&mut self, data: &[u8], bits: usize) -> Result<(), Error<T::Error>> {
        let bytes = check_frame(data, bits)?;

        self.exchange(Command::WriteFifo.into())?;
        self.exchange((bits - 1) as u8)?;

        // payload is lsb first
        self.set_bit_order(BitOrder::LsbFirst)?;
        let sent = data[..bytes]
            .iter()
            .try_for_each(|&byte| self.exchange(byte).map(drop));
        let restored = self.set_bit_order(BitOrder::MsbFirst);
        sent.and(restored)
    }

    /// Reads one block from the receive FIFO.
    ///
    /// Overflow is reported through [`FifoFrame::overflow`].
    pub fn read_fifo(&mut self) -> Result<FifoFrame, Error<T::Error>> {
        self.exchange(Command::ReadFifo.into())?;

        // data is lsb first, the status byte is not
        self.set_bit_order(BitOrder::LsbFirst)?;
        let mut data = [0u8; 4];
        let received = data
            .iter_mut()
            .try_for_each(|byte| self.exchange(0x00).map(|value| *byte = value));
        let restored = self.set_bit_order(BitOrder::MsbFirst);
        received.and(restored)?;

        let status = self.exchange(0x00)?;
        Ok(FifoFrame::decode(data, status))
    }
}
