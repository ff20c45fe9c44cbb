//! The arithmetic integer decoding procedure (A.2).

use crate::arithmetic_decoder::{ArithmeticDecoder, Context, contexts};
use crate::error::{DecodeError, Result};

/// Number of bits and offset of each magnitude range, selected by the number
/// of leading 1-bits of the prefix (Figure A.1).
const RANGES: [(u32, u64); 6] = [(2, 0), (4, 4), (6, 20), (8, 84), (12, 340), (32, 4436)];

/// Decoder for one arithmetic integer procedure (IADH, IADW, IAEX, ...).
///
/// "Each arithmetic integer decoding procedure requires 512 bytes of storage
/// for its context memory." (A.2)
#[derive(Debug, Clone)]
pub struct IntegerDecoder {
    contexts: Vec<Context>,
}

impl IntegerDecoder {
    /// Create a new integer decoder with fresh contexts.
    pub fn new() -> Self {
        Self {
            contexts: contexts(512),
        }
    }

    /// Reset all contexts to their initial state.
    pub fn reset(&mut self) {
        self.contexts.fill(Context::default());
    }

    /// Decode a signed integer. `None` stands for OOB.
    ///
    /// "The result of the integer arithmetic decoding procedure is equal to:
    /// V if S = 0, -V if S = 1 and V > 0, OOB if S = 1 and V = 0" (A.2)
    ///
    /// Values outside of the `i32` range fail with [`DecodeError::Overflow`].
    pub fn decode(&mut self, decoder: &mut ArithmeticDecoder<'_>) -> Result<Option<i32>> {
        let mut prev = 1_usize;

        let sign = self.bit(decoder, &mut prev);

        let mut range = 0;
        while range < RANGES.len() - 1 && self.bit(decoder, &mut prev) == 1 {
            range += 1;
        }

        let (bits, offset) = RANGES[range];
        let mut value = 0_u64;

        for _ in 0..bits {
            value = (value << 1) | u64::from(self.bit(decoder, &mut prev));
        }

        let magnitude = i64::try_from(value + offset).map_err(|_| DecodeError::Overflow)?;

        let signed = match (sign, magnitude) {
            (0, m) => m,
            (_, 0) => return Ok(None),
            (_, m) => -m,
        };

        i32::try_from(signed)
            .map(Some)
            .map_err(|_| DecodeError::Overflow)
    }

    #[inline]
    fn bit(&mut self, decoder: &mut ArithmeticDecoder<'_>, prev: &mut usize) -> u32 {
        let d = decoder.decode(&mut self.contexts[*prev]);

        // "PREV always contains the values of the eight most-recently-decoded
        // bits, plus a leading 1 bit" (A.2)
        *prev = if *prev < 256 {
            (*prev << 1) | d as usize
        } else {
            (((*prev << 1) | d as usize) & 511) | 256
        };

        d
    }
}

impl Default for IntegerDecoder {
    fn default() -> Self {
        Self::new()
    }
}
