/*!
A memory-safe, pure-Rust decoder for CCITT Group 4 (ITU-T T.6) data.

Group 4 coding is also known as MMR ("Modified Modified READ"). This crate
implements the two-dimensional coding scheme only, which is what JBIG2 uses as
its non-arithmetic alternative for generic regions.

Decoded pixels are pushed into a [`Decoder`] sink as runs of equal colour, one
line at a time.

# Example
```rust
struct Count(u32);

impl mica_ccitt::Decoder for Count {
    fn push_run(&mut self, black: bool, count: u32) {
        if black {
            self.0 += count;
        }
    }

    fn next_line(&mut self) {}
}

// Two all-white lines of 8 pixels followed by EOFB.
let data = [0xC0, 0x04, 0x00, 0x40];
let settings = mica_ccitt::DecodeSettings {
    columns: 8,
    rows: 2,
    end_of_block: true,
};

let mut sink = Count(0);
let decoded = mica_ccitt::decode(&data, &mut sink, &settings).unwrap();

assert_eq!(decoded.rows, 2);
assert_eq!(sink.0, 0);
```
*/

#![forbid(unsafe_code)]

mod bit_reader;
mod decode;
mod states;

use core::fmt;

use bit_reader::BitReader;

/// Settings that control how the data is decoded.
#[derive(Copy, Clone, Debug)]
pub struct DecodeSettings {
    /// The width of each line in pixels.
    pub columns: u32,
    /// The maximum number of lines to decode.
    pub rows: u32,
    /// Whether the data may be terminated by an end-of-facsimile block.
    pub end_of_block: bool,
}

/// A sink for decoded pixels.
pub trait Decoder {
    /// Push `count` pixels of the same colour.
    fn push_run(&mut self, black: bool, count: u32);
    /// Called after the last run of a line.
    fn next_line(&mut self);
}

/// Summary of a successful decode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// The number of complete lines that were pushed into the sink.
    pub rows: u32,
    /// The number of bytes consumed, rounded up to the next byte boundary.
    pub consumed_bytes: usize,
}

/// An error that occurred while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The data ended in the middle of a line.
    UnexpectedEof,
    /// A bit sequence that is not a valid code.
    InvalidCode,
    /// A changing element fell outside of the current line.
    LineOverflow,
    /// A run length overflowed.
    Overflow,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of data"),
            Self::InvalidCode => write!(f, "invalid code"),
            Self::LineOverflow => write!(f, "changing element outside of the line"),
            Self::Overflow => write!(f, "run length overflow"),
        }
    }
}

impl core::error::Error for DecodeError {}

/// Result type for CCITT decoding.
pub type Result<T> = core::result::Result<T, DecodeError>;

/// Decode Group 4 data into the given sink.
///
/// Decoding stops after `settings.rows` lines or at an end-of-facsimile block,
/// whichever comes first. The reader is always left on a byte boundary.
pub fn decode(data: &[u8], decoder: &mut impl Decoder, settings: &DecodeSettings) -> Result<Decoded> {
    let mut reader = BitReader::new(data);

    let rows = if settings.columns == 0 {
        // Zero-width lines carry no codes at all.
        for _ in 0..settings.rows {
            decoder.next_line();
        }

        settings.rows
    } else {
        decode::decode_group4(&mut reader, decoder, settings)?
    };

    reader.align();

    Ok(Decoded {
        rows,
        consumed_bytes: reader.consumed_bytes(),
    })
}
