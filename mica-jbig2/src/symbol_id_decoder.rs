//! Symbol ID (IAID) decoder (A.3).

use crate::arithmetic_decoder::{ArithmeticDecoder, Context, contexts};
use crate::error::{HeaderError, Result, bail};

/// The longest supported ID, which allows for 16M symbols.
pub const MAX_CODE_LEN: u32 = 24;

/// Decoder for fixed-length symbol IDs.
#[derive(Debug, Clone)]
pub struct SymbolIdDecoder {
    contexts: Vec<Context>,
    code_len: u32,
}

impl SymbolIdDecoder {
    /// Create a decoder for IDs of `code_len` bits (SBSYMCODELEN).
    pub fn new(code_len: u32) -> Result<Self> {
        if code_len > MAX_CODE_LEN {
            bail!(HeaderError::InvalidDimension);
        }

        // "The number of contexts required is 2^SBSYMCODELEN" (A.3)
        Ok(Self {
            contexts: contexts(1 << code_len),
            code_len,
        })
    }

    /// The number of bits per ID.
    pub fn code_len(&self) -> u32 {
        self.code_len
    }

    /// Decode the next symbol ID.
    #[inline]
    pub fn decode(&mut self, decoder: &mut ArithmeticDecoder<'_>) -> u32 {
        // PREV starts out as 1 and never reaches 2^SBSYMCODELEN before the
        // last bit, so it can index the contexts directly.
        let mut prev = 1_usize;

        for _ in 0..self.code_len {
            let d = decoder.decode(&mut self.contexts[prev]);
            prev = (prev << 1) | d as usize;
        }

        (prev - (1 << self.code_len)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::test_encoder::{Encoder, encode_symbol_id};

    #[test]
    fn decodes_fixed_length_ids() {
        let ids = [0, 5, 7, 3, 3, 1, 6];
        let mut encoder = Encoder::new();
        let mut cxs = contexts(8);

        for id in ids {
            encode_symbol_id(&mut encoder, &mut cxs, 3, id);
        }

        let data = encoder.finish();
        let mut decoder = ArithmeticDecoder::new(&data);
        let mut symbols = SymbolIdDecoder::new(3).unwrap();

        for id in ids {
            assert_eq!(symbols.decode(&mut decoder), id);
        }
    }

    #[test]
    fn zero_length_ids_are_zero() {
        let mut decoder = ArithmeticDecoder::new(&[]);
        let mut symbols = SymbolIdDecoder::new(0).unwrap();

        assert_eq!(symbols.decode(&mut decoder), 0);
        assert_eq!(decoder.decoded_symbols(), 0);
    }

    #[test]
    fn rejects_long_codes() {
        assert_eq!(
            SymbolIdDecoder::new(MAX_CODE_LEN + 1).unwrap_err(),
            DecodeError::Header(HeaderError::InvalidDimension)
        );
    }
}
