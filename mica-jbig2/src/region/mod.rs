//! Region segment information field parsing (7.4.1) and the region decoders.

pub(crate) mod generic;
pub(crate) mod generic_refinement;
pub(crate) mod mmr;

use crate::DecodeSettings;
use crate::bitmap::Bitmap;
use crate::compose::{CombinationOperator, compose};
use crate::error::{HeaderError, Result, bail};
use crate::log::lwarn;
use crate::reader::BitReader;

/// Adaptive template pixel position, relative to the pixel being decoded.
///
/// "The AT coordinate X and Y fields are signed values." (7.4.6.3)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AdaptivePixel {
    /// Horizontal offset. Negative values point to the left.
    pub x: i8,
    /// Vertical offset. Negative values point upwards.
    pub y: i8,
}

impl AdaptivePixel {
    /// Create a new adaptive pixel at the given offset.
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Whether the pixel lies before the current pixel in raster order.
    ///
    /// "AT pixels must reference already-decoded pixels" (6.2.5.4, Figure 7).
    pub(crate) fn is_causal(self) -> bool {
        self.y < 0 || (self.y == 0 && self.x < 0)
    }

    fn parse(reader: &mut BitReader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_i8()?,
            y: reader.read_i8()?,
        })
    }
}

/// Read `count` adaptive pixels (7.4.6.3, 7.4.7.3).
pub(crate) fn parse_adaptive_pixels(
    reader: &mut BitReader<'_>,
    count: usize,
) -> Result<Vec<AdaptivePixel>> {
    (0..count).map(|_| AdaptivePixel::parse(reader)).collect()
}

/// Parsed region segment information field (7.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    /// "This four-byte field gives the width in pixels of the bitmap encoded
    /// in this segment." (7.4.1.1)
    pub width: u32,
    /// "This four-byte field gives the height in pixels of the bitmap encoded
    /// in this segment." (7.4.1.2)
    pub height: u32,
    /// The horizontal offset of the region relative to the page (7.4.1.3).
    pub x: u32,
    /// The vertical offset of the region relative to the page (7.4.1.4).
    pub y: u32,
    /// "Bits 0-2: External combination operator." (7.4.1.5)
    pub combination_operator: CombinationOperator,
    /// "Bit 3: Colour extension flag (COLEXTFLAG)." Colour extensions are
    /// not supported, so the flag is only recorded.
    pub colour_extension: bool,
}

impl RegionInfo {
    /// The size of the field in bytes.
    pub const SIZE: usize = 17;

    /// Parse a region segment information field.
    ///
    /// Nonzero reserved bits are an error with `settings.strict` and a
    /// warning otherwise.
    pub fn parse(reader: &mut BitReader<'_>, settings: &DecodeSettings) -> Result<Self> {
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let x = reader.read_u32()?;
        let y = reader.read_u32()?;
        let flags = reader.read_byte()?;

        let combination_operator = CombinationOperator::from_value(flags & 0x07)?;
        let colour_extension = flags & 0x08 != 0;

        // "Bits 4-7: Reserved; must be 0."
        check_reserved(flags & 0xF0, settings)?;

        Ok(Self {
            width,
            height,
            x,
            y,
            combination_operator,
            colour_extension,
        })
    }
}

/// Fail or warn depending on the strictness, if `bits` is nonzero.
pub(crate) fn check_reserved(bits: u8, settings: &DecodeSettings) -> Result<()> {
    if bits != 0 {
        if settings.strict {
            bail!(HeaderError::ReservedBits);
        }

        lwarn!("ignoring nonzero reserved bits {bits:#04x}");
    }

    Ok(())
}

/// A decoded region bitmap together with its placement on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRegion {
    /// The region segment information field. Its height reflects the number
    /// of rows that were actually decoded.
    pub info: RegionInfo,
    /// The decoded pixels.
    pub bitmap: Bitmap,
}

impl DecodedRegion {
    /// Combine the region into `page` at its location, using its
    /// combination operator.
    pub fn compose_into(&self, page: &mut Bitmap) {
        compose(
            page,
            &self.bitmap,
            i64::from(self.info.x),
            i64::from(self.info.y),
            self.info.combination_operator,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    const INFO: [u8; 17] = [
        0, 0, 0, 16, // width
        0, 0, 0, 4, // height
        0, 0, 0, 2, // x
        0, 0, 1, 0, // y
        0x0A, // XOR, COLEXTFLAG
    ];

    #[test]
    fn parses_region_info() {
        let mut reader = BitReader::new(&INFO);
        let info = RegionInfo::parse(&mut reader, &DecodeSettings::default()).unwrap();

        assert_eq!(
            info,
            RegionInfo {
                width: 16,
                height: 4,
                x: 2,
                y: 256,
                combination_operator: CombinationOperator::Xor,
                colour_extension: true,
            }
        );
        assert_eq!(reader.byte_pos(), RegionInfo::SIZE);
    }

    #[test]
    fn reserved_bits_depend_on_strictness() {
        let mut data = INFO;
        data[16] = 0x42;

        let lenient = DecodeSettings::default();
        assert!(RegionInfo::parse(&mut BitReader::new(&data), &lenient).is_ok());

        let strict = DecodeSettings {
            strict: true,
            ..DecodeSettings::default()
        };
        assert_eq!(
            RegionInfo::parse(&mut BitReader::new(&data), &strict),
            Err(DecodeError::Header(HeaderError::ReservedBits))
        );
    }

    #[test]
    fn invalid_operator_and_truncation() {
        let mut data = INFO;
        data[16] = 0x05;

        assert_eq!(
            RegionInfo::parse(&mut BitReader::new(&data), &DecodeSettings::default()),
            Err(DecodeError::Header(HeaderError::InvalidCombinationOperator))
        );
        assert_eq!(
            RegionInfo::parse(&mut BitReader::new(&INFO[..10]), &DecodeSettings::default()),
            Err(DecodeError::UnexpectedEof)
        );
    }

    #[test]
    fn causal_adaptive_pixels() {
        assert!(AdaptivePixel::new(3, -1).is_causal());
        assert!(AdaptivePixel::new(-1, 0).is_causal());
        assert!(!AdaptivePixel::new(0, 0).is_causal());
        assert!(!AdaptivePixel::new(-5, 1).is_causal());
    }
}
