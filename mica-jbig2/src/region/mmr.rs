//! Generic region decoding with MMR coding (6.2.6).

use crate::DecodeSettings;
use crate::bitmap::Bitmap;
use crate::error::{HeaderError, Result, bail};
use crate::log::{ltrace, lwarn};
use crate::reader::BitReader;

/// A sink that writes decoded runs into a bitmap.
struct BitmapSink<'a> {
    bitmap: &'a mut Bitmap,
    x: u32,
    y: u32,
}

impl mica_ccitt::Decoder for BitmapSink<'_> {
    fn push_run(&mut self, black: bool, count: u32) {
        // White runs leave the zeroed pixels alone.
        if black {
            self.bitmap.fill_run(self.y, self.x, count);
        }

        self.x = self.x.saturating_add(count);
    }

    fn next_line(&mut self) {
        self.x = 0;
        self.y += 1;
    }
}

/// Decode a `width` x `height` bitmap coded with T.6 two-dimensional coding.
///
/// An EOFB following the last row is consumed. On success, `reader` is
/// positioned at the first byte after the coded data.
pub fn decode_mmr(
    width: u32,
    height: u32,
    reader: &mut BitReader<'_>,
    settings: &DecodeSettings,
) -> Result<Bitmap> {
    let mut bitmap = Bitmap::with_settings(width, height, settings)?;

    // The coded data always starts on a byte boundary.
    reader.align();

    let ccitt_settings = mica_ccitt::DecodeSettings {
        columns: width,
        rows: height,
        end_of_block: true,
    };

    let mut sink = BitmapSink {
        bitmap: &mut bitmap,
        x: 0,
        y: 0,
    };

    let decoded = mica_ccitt::decode(reader.tail(), &mut sink, &ccitt_settings)?;

    if decoded.rows < height {
        lwarn!(
            "MMR data ended after {} of {} rows",
            decoded.rows,
            height
        );

        bail!(HeaderError::MissingRows);
    }

    ltrace!(
        "decoded {}x{} MMR bitmap from {} bytes",
        width,
        height,
        decoded.consumed_bytes
    );

    reader.skip_bytes(decoded.consumed_bytes)?;

    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    fn decode(data: &[u8], width: u32, height: u32) -> Result<(Bitmap, usize)> {
        let mut reader = BitReader::new(data);
        let bitmap = decode_mmr(width, height, &mut reader, &DecodeSettings::default())?;

        Ok((bitmap, reader.byte_pos()))
    }

    #[test]
    fn all_white() {
        let (bitmap, consumed) = decode(&[0xC0, 0x04, 0x00, 0x40], 8, 2).unwrap();

        assert_eq!(bitmap.count_black(), 0);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn horizontal_and_vertical_modes() {
        let (bitmap, _) = decode(&[0x2E, 0xFC, 0x00, 0x40, 0x04], 8, 2).unwrap();

        assert_eq!(bitmap.data(), &[0x3C, 0x3C]);
    }

    #[test]
    fn pass_mode() {
        let (bitmap, _) = decode(&[0x2E, 0xE3, 0x00, 0x10, 0x01], 8, 2).unwrap();

        assert_eq!(bitmap.data(), &[0x3C, 0x00]);
    }

    #[test]
    fn single_row_leaves_trailing_bytes() {
        let data = [0x2E, 0xE0, 0x02, 0x00, 0x20, 0xAB];
        let (bitmap, consumed) = decode(&data, 8, 1).unwrap();

        assert_eq!(bitmap.data(), &[0x3C]);
        assert_eq!(consumed, 5);
    }

    #[test]
    fn early_end_of_block() {
        // Two white rows, followed by EOFB, for a region of three rows.
        assert_eq!(
            decode(&[0xC0, 0x04, 0x00, 0x40], 8, 3).unwrap_err(),
            DecodeError::Header(HeaderError::MissingRows)
        );
    }

    #[test]
    fn truncated_and_invalid_data() {
        assert_eq!(
            decode(&[0x2E], 8, 2).unwrap_err(),
            DecodeError::UnexpectedEof
        );
        // A run of zeros that is no valid mode code.
        assert_eq!(
            decode(&[0x00, 0x00, 0x00, 0x00], 8, 2).unwrap_err(),
            DecodeError::Header(HeaderError::MmrDesync)
        );
    }

    #[test]
    fn respects_pixel_budget() {
        let settings = DecodeSettings {
            max_pixels: 15,
            ..DecodeSettings::default()
        };

        assert_eq!(
            decode_mmr(8, 2, &mut BitReader::new(&[0xC0, 0x04, 0x00, 0x40]), &settings)
                .unwrap_err(),
            DecodeError::Header(HeaderError::TooManyPixels)
        );
    }
}
