//! Two-dimensional line decoding (T.6, 2.2).

use log::{trace, warn};

use crate::bit_reader::BitReader;
use crate::states::{EOFB, Mode, decode_mode, decode_run};
use crate::{DecodeError, DecodeSettings, Decoder, Result};

/// Keeps track of the changing elements of the reference and the coding line.
///
/// A changing element is stored as the index of the first pixel whose colour
/// differs from its left neighbour. Colours alternate, starting with black,
/// since every line begins with an imaginary white pixel.
struct LineState {
    columns: u32,
    reference: Vec<u32>,
    coding: Vec<u32>,
    /// Index of the first reference element to the right of `a0`.
    ref_pos: usize,
    /// "a0: The reference or starting changing element on the coding line."
    /// -1 stands for the imaginary element before the first pixel.
    a0: i64,
    white: bool,
}

impl LineState {
    fn new(columns: u32) -> Self {
        Self {
            columns,
            // "The reference line for the first coding line in a page is an
            // imaginary white line." (T.6, 2.2.1)
            reference: Vec::new(),
            coding: Vec::new(),
            ref_pos: 0,
            a0: -1,
            white: true,
        }
    }

    fn reference_at(&self, idx: usize) -> u32 {
        self.reference.get(idx).copied().unwrap_or(self.columns)
    }

    /// Compute b1 and b2 relative to the current a0.
    ///
    /// "b1: The first changing element on the reference line to the right of
    /// a0 and of opposite colour to a0 colour."
    /// "b2: The next changing element to the right of b1 on the reference
    /// line." (T.4, 4.2.1.3.1)
    fn b1_b2(&mut self) -> (u32, u32) {
        while self.ref_pos < self.reference.len()
            && i64::from(self.reference[self.ref_pos]) <= self.a0
        {
            self.ref_pos += 1;
        }

        // Even indices turn the line black, odd ones white.
        let mut idx = self.ref_pos;
        if idx.is_multiple_of(2) != self.white {
            idx += 1;
        }

        (self.reference_at(idx), self.reference_at(idx + 1))
    }

    fn start(&self) -> u32 {
        self.a0.max(0) as u32
    }

    fn end_of_line(&self) -> bool {
        self.a0 >= i64::from(self.columns)
    }

    /// Emit pixels of the current colour up to (excluding) `to`.
    fn fill_to<T: Decoder>(&mut self, sink: &mut T, to: u32) -> Result<()> {
        let from = self.start();

        if to < from || to > self.columns {
            return Err(DecodeError::LineOverflow);
        }

        if to > from {
            sink.push_run(!self.white, to - from);
        }

        self.a0 = i64::from(to);

        Ok(())
    }

    /// Switch colour at the current a0.
    fn flip(&mut self) {
        let at = self.start();

        if at < self.columns {
            self.coding.push(at);
        }

        self.white = !self.white;
    }

    fn next_line(&mut self) {
        core::mem::swap(&mut self.reference, &mut self.coding);
        self.coding.clear();
        self.ref_pos = 0;
        self.a0 = -1;
        self.white = true;
    }
}

pub(crate) fn decode_group4<T: Decoder>(
    reader: &mut BitReader<'_>,
    sink: &mut T,
    settings: &DecodeSettings,
) -> Result<u32> {
    let mut line = LineState::new(settings.columns);
    let mut rows = 0_u32;

    while rows < settings.rows {
        if settings.end_of_block && reader.peek_bits(24) == Some(EOFB) {
            trace!("end of block after {rows} rows");
            reader.skip_bits(24);

            return Ok(rows);
        }

        decode_line(reader, sink, &mut line)?;
        line.next_line();
        sink.next_line();
        rows += 1;
    }

    // "If the number of bytes contained in the encoded bitmap is known in
    // advance, then it is permissible for the data stream not to contain an
    // EOFB" (T.88, 6.2.6), so the marker is optional here.
    if settings.end_of_block {
        if reader.peek_bits(24) == Some(EOFB) {
            reader.skip_bits(24);
        } else {
            trace!("no end of block marker after {rows} rows");
        }
    }

    Ok(rows)
}

fn decode_line<T: Decoder>(
    reader: &mut BitReader<'_>,
    sink: &mut T,
    line: &mut LineState,
) -> Result<()> {
    while !line.end_of_line() {
        let mode = decode_mode(reader)?;
        let (b1, b2) = line.b1_b2();

        match mode {
            // "Pass mode: This mode is identified when the position of b2 lies
            // on the left of a1." (T.4, 4.2.1.3.2 a)
            Mode::Pass => {
                line.fill_to(sink, b2)?;
            }
            // "Horizontal mode: [...] both run-lengths a0a1 and a1a2 are coded"
            // (T.4, 4.2.1.3.2 c)
            Mode::Horizontal => {
                let first = decode_run(reader, line.white)?;
                let second = decode_run(reader, !line.white)?;

                let a1 = line
                    .start()
                    .checked_add(first)
                    .ok_or(DecodeError::Overflow)?;
                line.fill_to(sink, a1)?;
                line.flip();

                let a2 = a1.checked_add(second).ok_or(DecodeError::Overflow)?;
                line.fill_to(sink, a2)?;
                line.flip();
            }
            // "Vertical mode: [...] a1 is coded relative to the position of b1"
            // (T.4, 4.2.1.3.2 b)
            Mode::Vertical(offset) => {
                let a1 = i64::from(b1) + i64::from(offset);

                let Ok(a1) = u32::try_from(a1) else {
                    warn!("vertical mode moved a1 to {a1}");

                    return Err(DecodeError::LineOverflow);
                };

                line.fill_to(sink, a1)?;
                line.flip();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects the decoded lines as strings of `0` (white) and `1` (black).
    #[derive(Default)]
    struct Lines {
        lines: Vec<Vec<u8>>,
        current: Vec<u8>,
    }

    impl Decoder for Lines {
        fn push_run(&mut self, black: bool, count: u32) {
            self.current
                .extend(core::iter::repeat_n(u8::from(black), count as usize));
        }

        fn next_line(&mut self) {
            self.lines.push(core::mem::take(&mut self.current));
        }
    }

    fn lines(data: &[u8], columns: u32, rows: u32) -> Result<Vec<Vec<u8>>> {
        let settings = DecodeSettings {
            columns,
            rows,
            end_of_block: true,
        };
        let mut sink = Lines::default();
        decode_group4(&mut BitReader::new(data), &mut sink, &settings)?;

        Ok(sink.lines)
    }

    #[test]
    fn white_lines_via_vertical_mode() {
        // V0 V0 EOFB
        let decoded = lines(&[0xC0, 0x04, 0x00, 0x40], 8, 2).unwrap();

        assert_eq!(decoded, vec![vec![0; 8], vec![0; 8]]);
    }

    #[test]
    fn horizontal_then_vertical() {
        // H W2 B4 V0 | V0 V0 V0 | EOFB
        let decoded = lines(&[0x2E, 0xFC, 0x00, 0x40, 0x04], 8, 2).unwrap();
        let expected = vec![0, 0, 1, 1, 1, 1, 0, 0];

        assert_eq!(decoded, vec![expected.clone(), expected]);
    }

    #[test]
    fn pass_mode() {
        // H W2 B4 V0 | P V0 | EOFB
        let decoded = lines(&[0x2E, 0xE3, 0x00, 0x10, 0x01], 8, 2).unwrap();

        assert_eq!(decoded, vec![vec![0, 0, 1, 1, 1, 1, 0, 0], vec![0; 8]]);
    }

    #[test]
    fn early_end_of_block_stops() {
        let decoded = lines(&[0xC0, 0x04, 0x00, 0x40], 8, 5).unwrap();

        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn horizontal_overflow() {
        // H W2 B4 on a line that is only 4 pixels wide.
        assert_eq!(
            lines(&[0x2E, 0xE0], 4, 1),
            Err(DecodeError::LineOverflow)
        );
    }

    #[test]
    fn missing_data() {
        // Eight V0 codes decode eight lines, the ninth runs out of data.
        assert_eq!(lines(&[0xFF], 8, 9), Err(DecodeError::UnexpectedEof));
    }
}
