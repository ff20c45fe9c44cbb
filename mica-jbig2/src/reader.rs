//! A reader for bits and big-endian integers over a bounded byte window.

use crate::error::{DecodeError, Result};

/// A reader for reading bits and bytes from a byte stream.
///
/// Multi-byte reads assume that the reader is byte-aligned.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// The underlying data.
    data: &'a [u8],
    /// The position in bits.
    cur_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    #[inline(always)]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cur_pos: 0 }
    }

    /// Skip to the next byte boundary.
    #[inline(always)]
    pub fn align(&mut self) {
        let bit_pos = self.bit_pos();

        if bit_pos != 0 {
            self.cur_pos += 8 - bit_pos;
        }
    }

    /// Whether all bytes have been consumed.
    #[inline(always)]
    pub fn at_end(&self) -> bool {
        self.byte_pos() >= self.data.len()
    }

    /// The unread bytes, starting at the current (possibly partial) byte.
    #[inline(always)]
    pub fn tail(&self) -> &'a [u8] {
        self.data.get(self.byte_pos()..).unwrap_or_default()
    }

    /// The total number of bytes in the window.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the window is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The current position in bytes.
    #[inline(always)]
    pub fn byte_pos(&self) -> usize {
        self.cur_pos / 8
    }

    /// The bit position inside of the current byte.
    #[inline(always)]
    pub fn bit_pos(&self) -> usize {
        self.cur_pos % 8
    }

    /// Read a single bit.
    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<u32> {
        let byte = *self
            .data
            .get(self.byte_pos())
            .ok_or(DecodeError::UnexpectedEof)?;
        let shift = 7 - self.bit_pos();
        self.cur_pos += 1;

        Ok(u32::from(byte >> shift) & 1)
    }

    /// Read up to 32 bits, most significant bit first.
    #[inline]
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);

        if self.cur_pos + count as usize > self.data.len() * 8 {
            return Err(DecodeError::UnexpectedEof);
        }

        let mut value = 0_u64;

        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }

        Ok(value as u32)
    }

    /// Read the given number of bytes.
    #[inline(always)]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        debug_assert_eq!(self.bit_pos(), 0);

        let start = self.byte_pos();
        let end = start.checked_add(len).ok_or(DecodeError::UnexpectedEof)?;
        let bytes = self
            .data
            .get(start..end)
            .ok_or(DecodeError::UnexpectedEof)?;
        self.cur_pos += len * 8;

        Ok(bytes)
    }

    /// Skip the given number of bytes.
    #[inline(always)]
    pub fn skip_bytes(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read a single byte.
    #[inline(always)]
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a signed byte.
    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    /// Read an u16 number.
    #[inline(always)]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;

        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read an u32 number.
    #[inline(always)]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;

        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an i32 number.
    #[inline(always)]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_then_bytes() {
        let mut reader = BitReader::new(&[0b1011_0000, 0x12, 0x34, 0xFF]);

        assert_eq!(reader.read_bits(4), Ok(0b1011));
        reader.align();
        assert_eq!(reader.read_u16(), Ok(0x1234));
        assert_eq!(reader.read_i8(), Ok(-1));
        assert!(reader.at_end());
        assert_eq!(reader.read_byte(), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn read_bits_past_end_does_not_advance() {
        let mut reader = BitReader::new(&[0xAA]);

        assert_eq!(reader.read_bits(9), Err(DecodeError::UnexpectedEof));
        assert_eq!(reader.read_bits(8), Ok(0xAA));
    }

    #[test]
    fn tail_starts_at_current_byte() {
        let mut reader = BitReader::new(&[1, 2, 3]);
        reader.skip_bytes(1).unwrap();

        assert_eq!(reader.tail(), &[2, 3]);
        assert_eq!(reader.read_i32(), Err(DecodeError::UnexpectedEof));
        assert_eq!(reader.byte_pos(), 1);
    }
}
