//! An MQ encoder (T.88, E.2) used to produce test streams.

use crate::arithmetic_decoder::{Context, QE_TABLE};
use crate::bitmap::Bitmap;

pub(crate) struct Encoder {
    a: u32,
    c: u32,
    ct: u32,
    /// The byte that was produced last, not yet written because a carry may
    /// still propagate into it.
    b: u8,
    started: bool,
    out: Vec<u8>,
}

impl Encoder {
    /// INITENC.
    pub(crate) fn new() -> Self {
        Self {
            a: 0x8000,
            c: 0,
            ct: 12,
            b: 0,
            started: false,
            out: Vec::new(),
        }
    }

    pub(crate) fn encode(&mut self, cx: &mut Context, bit: u32) {
        let entry = &QE_TABLE[usize::from(cx.index)];
        let qe = u32::from(entry.qe);

        self.a -= qe;

        if bit == u32::from(cx.mps) {
            // CODEMPS
            if self.a & 0x8000 != 0 {
                self.c += qe;

                return;
            }

            if self.a < qe {
                self.a = qe;
            } else {
                self.c += qe;
            }

            cx.index = entry.nmps;
        } else {
            // CODELPS
            if self.a < qe {
                self.c += qe;
            } else {
                self.a = qe;
            }

            if entry.switch {
                cx.mps = 1 - cx.mps;
            }

            cx.index = entry.nlps;
        }

        self.renormalize();
    }

    /// FLUSH, followed by the 0xFFAC marker.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        // SETBITS
        let temp = self.c + self.a;
        self.c |= 0xFFFF;

        if self.c >= temp {
            self.c -= 0x8000;
        }

        self.c <<= self.ct;
        self.byte_out();
        self.c <<= self.ct;
        self.byte_out();

        if self.b != 0xFF {
            self.emit(0xFF);
        }

        self.emit(0xAC);
        self.out.push(self.b);

        self.out
    }

    fn renormalize(&mut self) {
        loop {
            self.a <<= 1;
            self.c <<= 1;
            self.ct -= 1;

            if self.ct == 0 {
                self.byte_out();
            }

            if self.a & 0x8000 != 0 {
                break;
            }
        }
    }

    fn byte_out(&mut self) {
        if self.b == 0xFF {
            self.emit_stuffed();
        } else if self.c < 0x800_0000 {
            self.emit_plain();
        } else {
            self.b = self.b.wrapping_add(1);

            if self.b == 0xFF {
                self.c &= 0x7FF_FFFF;
                self.emit_stuffed();
            } else {
                self.emit_plain();
            }
        }
    }

    fn emit_stuffed(&mut self) {
        self.emit((self.c >> 20) as u8);
        self.c &= 0xF_FFFF;
        self.ct = 7;
    }

    fn emit_plain(&mut self) {
        self.emit((self.c >> 19) as u8);
        self.c &= 0x7_FFFF;
        self.ct = 8;
    }

    fn emit(&mut self, next: u8) {
        // The first call replaces the byte before the start of the data.
        if self.started {
            self.out.push(self.b);
        }

        self.started = true;
        self.b = next;
    }
}

/// Encode a value with the integer procedure of A.2. `None` encodes OOB.
pub(crate) fn encode_integer(encoder: &mut Encoder, contexts: &mut [Context], value: Option<i32>) {
    let (sign, magnitude) = match value {
        None => (1, 0),
        Some(v) => (u32::from(v < 0), u64::from(v.unsigned_abs())),
    };

    let (prefix, bits, offset): (&[u32], u32, u64) = match magnitude {
        0..=3 => (&[0], 2, 0),
        4..=19 => (&[1, 0], 4, 4),
        20..=83 => (&[1, 1, 0], 6, 20),
        84..=339 => (&[1, 1, 1, 0], 8, 84),
        340..=4435 => (&[1, 1, 1, 1, 0], 12, 340),
        _ => (&[1, 1, 1, 1, 1], 32, 4436),
    };

    let mut prev = 1_usize;
    let mut put = |bit: u32| {
        encoder.encode(&mut contexts[prev], bit);

        prev = if prev < 256 {
            (prev << 1) | bit as usize
        } else {
            (((prev << 1) | bit as usize) & 511) | 256
        };
    };

    put(sign);

    for &bit in prefix {
        put(bit);
    }

    let value = magnitude - offset;

    for shift in (0..bits).rev() {
        put(((value >> shift) & 1) as u32);
    }
}

/// Encode a symbol ID with the IAID procedure of A.3.
pub(crate) fn encode_symbol_id(
    encoder: &mut Encoder,
    contexts: &mut [Context],
    code_len: u32,
    id: u32,
) {
    let mut prev = 1_usize;

    for shift in (0..code_len).rev() {
        let bit = (id >> shift) & 1;
        encoder.encode(&mut contexts[prev], bit);
        prev = (prev << 1) | bit as usize;
    }
}

/// A deterministic bitmap with some structure and some noise.
pub(crate) fn test_bitmap(width: u32, height: u32) -> Bitmap {
    let mut bitmap = Bitmap::new(width, height).unwrap();
    let mut state = 0x2545_F491_u32;

    for y in 0..height {
        for x in 0..width {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;

            let shape = (x / 4 + y / 3) % 3 == 0;
            let noise = state % 11 == 0;
            bitmap.set_pixel(x, y, u8::from(shape ^ noise));
        }
    }

    bitmap
}
