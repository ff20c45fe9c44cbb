//! Bit-level reader for T.6 encoded data.

use crate::{DecodeError, Result};

#[derive(Debug, Clone)]
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    /// Position in bits.
    bit_offset: usize,
}

impl<'a> BitReader<'a> {
    #[inline(always)]
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_offset: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn read_bit(&mut self) -> Result<u32> {
        let byte = *self
            .data
            .get(self.bit_offset >> 3)
            .ok_or(DecodeError::UnexpectedEof)?;
        let shift = 7 - (self.bit_offset & 7);
        self.bit_offset += 1;

        Ok(u32::from(byte >> shift) & 1)
    }

    /// Look at the next `count` bits without consuming them.
    ///
    /// Returns `None` if fewer than `count` bits are left.
    #[inline]
    pub(crate) fn peek_bits(&self, count: usize) -> Option<u32> {
        debug_assert!(count <= 32);

        if self.bit_offset + count > self.data.len() * 8 {
            return None;
        }

        let mut copy = self.clone();
        let mut value = 0_u32;

        for _ in 0..count {
            value = (value << 1) | copy.read_bit().ok()?;
        }

        Some(value)
    }

    #[inline]
    pub(crate) fn skip_bits(&mut self, count: usize) {
        self.bit_offset = (self.bit_offset + count).min(self.data.len() * 8);
    }

    #[inline]
    pub(crate) fn align(&mut self) {
        let rem = self.bit_offset & 7;

        if rem != 0 {
            self.bit_offset += 8 - rem;
        }
    }

    /// The number of bytes touched so far (a partially read byte counts).
    #[inline]
    pub(crate) fn consumed_bytes(&self) -> usize {
        self.bit_offset.div_ceil(8)
    }
}
