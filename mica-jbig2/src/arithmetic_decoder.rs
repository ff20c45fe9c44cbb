//! The MQ arithmetic decoder (T.88, Annex E).
//!
//! The decoder is fed context slots by the region and integer decoders and
//! yields one binary decision per call. It never fails: once the data is
//! exhausted, or a marker code is reached, it keeps shifting in 1-bits.

/// The probability state of one context (E.2.4).
///
/// "Each context has associated with it an index, I(CX), which identifies a
/// particular probability estimate and its associated MPS value."
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    /// Index into the Qe table.
    pub(crate) index: u8,
    /// The sense of the more probable symbol.
    pub(crate) mps: u8,
}

/// A set of context slots, addressed by context value.
pub(crate) fn contexts(len: usize) -> Vec<Context> {
    vec![Context::default(); len]
}

/// The MQ decoder state (E.3.1).
#[derive(Debug, Clone)]
pub struct ArithmeticDecoder<'a> {
    data: &'a [u8],
    /// The code register. Its upper half is Chigh, the lower half Clow.
    c: u32,
    /// The interval register, kept in `[0x8000, 0x10000)` between decisions.
    a: u32,
    /// Index of the byte that was read last.
    pos: usize,
    /// Number of bits left in Clow before the next byte has to be read.
    ct: u32,
    decoded: u64,
}

impl<'a> ArithmeticDecoder<'a> {
    /// Create a new decoder and run INITDEC on the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        let mut decoder = Self {
            data,
            c: 0,
            a: 0,
            pos: 0,
            ct: 0,
            decoded: 0,
        };

        // INITDEC (Figure G.1). The C register is kept inverted, as in the
        // software conventions of Annex G.
        decoder.c = (u32::from(decoder.byte_at(0)) ^ 0xFF) << 16;
        decoder.byte_in();
        decoder.c <<= 7;
        decoder.ct -= 7;
        decoder.a = 0x8000;

        decoder
    }

    /// Decode one binary decision with the given context, updating its
    /// probability state (Figure G.2).
    #[inline(always)]
    pub fn decode(&mut self, cx: &mut Context) -> u32 {
        let entry = &QE_TABLE[usize::from(cx.index)];
        let qe = u32::from(entry.qe);

        self.decoded += 1;
        self.a -= qe;

        let d = if (self.c >> 16) < self.a {
            if self.a & 0x8000 != 0 {
                return u32::from(cx.mps);
            }

            // MPS_EXCHANGE (Figure E.16).
            let d = if self.a < qe {
                Self::lps(cx, entry)
            } else {
                Self::mps(cx, entry)
            };
            self.renormalize();

            d
        } else {
            self.c -= self.a << 16;

            // LPS_EXCHANGE (Figure E.17).
            let d = if self.a < qe {
                Self::mps(cx, entry)
            } else {
                Self::lps(cx, entry)
            };
            self.a = qe;
            self.renormalize();

            d
        };

        u32::from(d)
    }

    /// The number of decisions decoded so far.
    pub fn decoded_symbols(&self) -> u64 {
        self.decoded
    }

    #[inline(always)]
    fn mps(cx: &mut Context, entry: &QeEntry) -> u8 {
        cx.index = entry.nmps;

        cx.mps
    }

    #[inline(always)]
    fn lps(cx: &mut Context, entry: &QeEntry) -> u8 {
        let d = 1 - cx.mps;

        if entry.switch {
            cx.mps = d;
        }

        cx.index = entry.nlps;

        d
    }

    /// RENORMD (Figure E.18).
    #[inline(always)]
    fn renormalize(&mut self) {
        loop {
            if self.ct == 0 {
                self.byte_in();
            }

            self.a <<= 1;
            self.c <<= 1;
            self.ct -= 1;

            if self.a & 0x8000 != 0 {
                break;
            }
        }
    }

    /// BYTEIN (Figure G.3).
    #[inline(always)]
    fn byte_in(&mut self) {
        let b = self.byte_at(self.pos);

        if b == 0xFF {
            // 0xFF followed by a byte above 0x8F is a marker code, which
            // terminates the arithmetically coded data.
            if self.byte_at(self.pos + 1) > 0x8F {
                self.ct = 8;
            } else {
                self.pos += 1;
                self.c = self
                    .c
                    .wrapping_add(0xFE00)
                    .wrapping_sub(u32::from(self.byte_at(self.pos)) << 9);
                self.ct = 7;
            }
        } else {
            self.pos += 1;
            self.c = self
                .c
                .wrapping_add(0xFF00)
                .wrapping_sub(u32::from(self.byte_at(self.pos)) << 8);
            self.ct = 8;
        }
    }

    /// Bytes beyond the end of the data read as 0xFF.
    #[inline(always)]
    fn byte_at(&self, pos: usize) -> u8 {
        self.data.get(pos).copied().unwrap_or(0xFF)
    }
}

/// One row of Table E.1.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QeEntry {
    pub(crate) qe: u16,
    pub(crate) nmps: u8,
    pub(crate) nlps: u8,
    pub(crate) switch: bool,
}

const fn entry(qe: u16, nmps: u8, nlps: u8, switch: bool) -> QeEntry {
    QeEntry {
        qe,
        nmps,
        nlps,
        switch,
    }
}

/// "Table E.1 - Qe values and probability estimation process"
#[rustfmt::skip]
pub(crate) static QE_TABLE: [QeEntry; 47] = [
    entry(0x5601, 1, 1, true),    entry(0x3401, 2, 6, false),
    entry(0x1801, 3, 9, false),   entry(0x0AC1, 4, 12, false),
    entry(0x0521, 5, 29, false),  entry(0x0221, 38, 33, false),
    entry(0x5601, 7, 6, true),    entry(0x5401, 8, 14, false),
    entry(0x4801, 9, 14, false),  entry(0x3801, 10, 14, false),
    entry(0x3001, 11, 17, false), entry(0x2401, 12, 18, false),
    entry(0x1C01, 13, 20, false), entry(0x1601, 29, 21, false),
    entry(0x5601, 15, 14, true),  entry(0x5401, 16, 14, false),
    entry(0x5101, 17, 15, false), entry(0x4801, 18, 16, false),
    entry(0x3801, 19, 17, false), entry(0x3401, 20, 18, false),
    entry(0x3001, 21, 19, false), entry(0x2801, 22, 19, false),
    entry(0x2401, 23, 20, false), entry(0x2201, 24, 21, false),
    entry(0x1C01, 25, 22, false), entry(0x1801, 26, 23, false),
    entry(0x1601, 27, 24, false), entry(0x1401, 28, 25, false),
    entry(0x1201, 29, 26, false), entry(0x1101, 30, 27, false),
    entry(0x0AC1, 31, 28, false), entry(0x09C1, 32, 29, false),
    entry(0x08A1, 33, 30, false), entry(0x0521, 34, 31, false),
    entry(0x0441, 35, 32, false), entry(0x02A1, 36, 33, false),
    entry(0x0221, 37, 34, false), entry(0x0141, 38, 35, false),
    entry(0x0111, 39, 36, false), entry(0x0085, 40, 37, false),
    entry(0x0049, 41, 38, false), entry(0x0025, 42, 39, false),
    entry(0x0015, 43, 40, false), entry(0x0009, 44, 41, false),
    entry(0x0005, 45, 42, false), entry(0x0001, 45, 43, false),
    entry(0x5601, 46, 46, false),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_encoder::Encoder;

    /// The test sequence of T.88, H.2.
    const H2_ENCODED: [u8; 30] = [
        0x84, 0xC7, 0x3B, 0xFC, 0xE1, 0xA1, 0x43, 0x04, 0x02, 0x20, 0x00, 0x00, 0x41, 0x0D, 0xBB,
        0x86, 0xF4, 0x31, 0x7F, 0xFF, 0x88, 0xFF, 0x37, 0x47, 0x1A, 0xDB, 0x6A, 0xDF, 0xFF, 0xAC,
    ];

    const H2_DECODED: [u8; 32] = [
        0x00, 0x02, 0x00, 0x51, 0x00, 0x00, 0x00, 0xC0, 0x03, 0x52, 0x87, 0x2A, 0xAA, 0xAA, 0xAA,
        0xAA, 0x82, 0xC0, 0x20, 0x00, 0xFC, 0xD7, 0x9E, 0xF6, 0xBF, 0x7F, 0xED, 0x90, 0x4F, 0x46,
        0xA3, 0xBF,
    ];

    #[test]
    fn decodes_h2_test_sequence() {
        let mut decoder = ArithmeticDecoder::new(&H2_ENCODED);
        let mut cx = Context::default();

        for expected in H2_DECODED {
            let mut byte = 0_u8;

            for _ in 0..8 {
                byte = (byte << 1) | decoder.decode(&mut cx) as u8;
            }

            assert_eq!(byte, expected);
        }

        assert_eq!(decoder.decoded_symbols(), 256);
    }

    #[test]
    fn encoder_reproduces_h2_test_sequence() {
        let mut encoder = Encoder::new();
        let mut cx = Context::default();

        for byte in H2_DECODED {
            for shift in (0..8).rev() {
                encoder.encode(&mut cx, u32::from(byte >> shift) & 1);
            }
        }

        assert_eq!(encoder.finish(), H2_ENCODED);
    }

    #[test]
    fn round_trips_multiple_contexts() {
        // A deterministic mix of skewed and balanced contexts.
        let symbols: Vec<(usize, u32)> = (0..5000_u32)
            .map(|i| {
                let hash = i.wrapping_mul(2_654_435_761) >> 7;
                let cx = (hash % 5) as usize;
                let bit = match cx {
                    0 => 0,
                    1 => u32::from(hash % 17 == 0),
                    2 => u32::from(hash % 3 != 0),
                    _ => (hash >> 12) & 1,
                };

                (cx, bit)
            })
            .collect();

        let mut encoder = Encoder::new();
        let mut cxs = contexts(5);

        for &(cx, bit) in &symbols {
            encoder.encode(&mut cxs[cx], bit);
        }

        let data = encoder.finish();
        let mut decoder = ArithmeticDecoder::new(&data);
        let mut cxs = contexts(5);

        for &(cx, bit) in &symbols {
            assert_eq!(decoder.decode(&mut cxs[cx]), bit);
        }
    }

    #[test]
    fn exhausted_data_keeps_decoding() {
        let mut decoder = ArithmeticDecoder::new(&[]);
        let mut cx = Context::default();

        // Only checks that the decoder is deterministic and does not panic.
        let first: Vec<u32> = (0..64).map(|_| decoder.decode(&mut cx)).collect();

        let mut decoder = ArithmeticDecoder::new(&[0xFF, 0xAC]);
        let mut cx = Context::default();
        let second: Vec<u32> = (0..64).map(|_| decoder.decode(&mut cx)).collect();

        assert_eq!(first, second);
    }
}
