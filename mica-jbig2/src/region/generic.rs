//! Generic region segment parsing and decoding (7.4.6, 6.2).
//!
//! "The data parts of all three of the generic region segment types
//! ('intermediate generic region', 'immediate generic region' and 'immediate
//! lossless generic region') are coded identically, but are acted upon
//! differently, see 8.2." (7.4.6)

use super::mmr::decode_mmr;
use super::{AdaptivePixel, DecodedRegion, RegionInfo, check_reserved, parse_adaptive_pixels};
use crate::DecodeSettings;
use crate::arithmetic_decoder::{ArithmeticDecoder, Context, contexts};
use crate::bitmap::Bitmap;
use crate::error::{DecodeError, HeaderError, Locate, RegionDecodeError, Result, bail, err};
use crate::log::{ldebug, ltrace, lwarn};
use crate::reader::BitReader;

/// "GBTEMPLATE - The template identifier." (Table 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericTemplate {
    /// 16 pixel template with four adaptive pixels (Figure 3).
    Template0,
    /// 13 pixel template (Figure 4).
    Template1,
    /// 10 pixel template over three rows (Figure 5).
    Template2,
    /// 10 pixel template over two rows (Figure 6).
    Template3,
}

/// A neighbour of the pixel being decoded.
#[derive(Debug, Clone, Copy)]
enum Tap {
    Fixed(i8, i8),
    /// Index into the adaptive pixels.
    Adaptive(usize),
}

use Tap::{Adaptive, Fixed};

// Neighbours in the order in which they enter the context, most significant
// bit first (6.2.5.3).
#[rustfmt::skip]
const TEMPLATE0: [Tap; 16] = [
    Adaptive(3), Fixed(-1, -2), Fixed(0, -2), Fixed(1, -2), Adaptive(2),
    Adaptive(1), Fixed(-2, -1), Fixed(-1, -1), Fixed(0, -1), Fixed(1, -1), Fixed(2, -1), Adaptive(0),
    Fixed(-4, 0), Fixed(-3, 0), Fixed(-2, 0), Fixed(-1, 0),
];

#[rustfmt::skip]
const TEMPLATE1: [Tap; 13] = [
    Fixed(-1, -2), Fixed(0, -2), Fixed(1, -2), Fixed(2, -2),
    Fixed(-2, -1), Fixed(-1, -1), Fixed(0, -1), Fixed(1, -1), Fixed(2, -1), Adaptive(0),
    Fixed(-3, 0), Fixed(-2, 0), Fixed(-1, 0),
];

#[rustfmt::skip]
const TEMPLATE2: [Tap; 10] = [
    Fixed(-1, -2), Fixed(0, -2), Fixed(1, -2),
    Fixed(-2, -1), Fixed(-1, -1), Fixed(0, -1), Fixed(1, -1), Adaptive(0),
    Fixed(-2, 0), Fixed(-1, 0),
];

#[rustfmt::skip]
const TEMPLATE3: [Tap; 10] = [
    Fixed(-3, -1), Fixed(-2, -1), Fixed(-1, -1), Fixed(0, -1), Fixed(1, -1), Adaptive(0),
    Fixed(-4, 0), Fixed(-3, 0), Fixed(-2, 0), Fixed(-1, 0),
];

impl GenericTemplate {
    /// Parse the 2-bit GBTEMPLATE field.
    pub fn from_value(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Template0),
            1 => Ok(Self::Template1),
            2 => Ok(Self::Template2),
            3 => Ok(Self::Template3),
            _ => err!(HeaderError::InvalidTemplate),
        }
    }

    /// The number of adaptive pixels the template uses.
    pub fn adaptive_pixel_count(self) -> usize {
        match self {
            Self::Template0 => 4,
            _ => 1,
        }
    }

    /// The adaptive pixel positions of Figures 3 to 6, as used by encoders
    /// that do not move them.
    pub fn nominal_adaptive_pixels(self) -> &'static [AdaptivePixel] {
        const T0: [AdaptivePixel; 4] = [
            AdaptivePixel::new(3, -1),
            AdaptivePixel::new(-3, -1),
            AdaptivePixel::new(2, -2),
            AdaptivePixel::new(-2, -2),
        ];
        const T1: [AdaptivePixel; 1] = [AdaptivePixel::new(3, -1)];
        const T23: [AdaptivePixel; 1] = [AdaptivePixel::new(2, -1)];

        match self {
            Self::Template0 => &T0,
            Self::Template1 => &T1,
            Self::Template2 | Self::Template3 => &T23,
        }
    }

    /// The number of bits in a context value.
    pub fn context_bits(self) -> u32 {
        self.taps().len() as u32
    }

    fn taps(self) -> &'static [Tap] {
        match self {
            Self::Template0 => &TEMPLATE0,
            Self::Template1 => &TEMPLATE1,
            Self::Template2 => &TEMPLATE2,
            Self::Template3 => &TEMPLATE3,
        }
    }

    /// The context used for the SLTP bit (Figures 8 to 11).
    fn typical_prediction_context(self) -> usize {
        match self {
            Self::Template0 => 0b1001_1011_0010_0101,
            Self::Template1 => 0b0_0111_1001_0101,
            Self::Template2 => 0b00_1110_0101,
            Self::Template3 => 0b01_1001_0101,
        }
    }
}

/// Decoder for arithmetically coded generic regions (6.2.5).
///
/// The decoder owns its contexts. Decoding several bitmaps with the same
/// decoder keeps adapting the same contexts, as required when decoding the
/// symbols of a symbol dictionary. Use [`GenericRegionDecoder::reset`] to
/// start over.
#[derive(Debug, Clone)]
pub struct GenericRegionDecoder {
    template: GenericTemplate,
    /// Neighbour offsets with the adaptive pixels resolved.
    offsets: Vec<(i64, i64)>,
    tpgdon: bool,
    contexts: Vec<Context>,
}

impl GenericRegionDecoder {
    /// Create a new decoder.
    ///
    /// `adaptive_pixels` must contain exactly
    /// [`GenericTemplate::adaptive_pixel_count`] entries, each referring to a
    /// pixel that precedes the current one.
    pub fn new(
        template: GenericTemplate,
        adaptive_pixels: &[AdaptivePixel],
        tpgdon: bool,
    ) -> Result<Self> {
        if adaptive_pixels.len() != template.adaptive_pixel_count() {
            bail!(HeaderError::InvalidAtPixel);
        }

        if let Some(at) = adaptive_pixels.iter().find(|at| !at.is_causal()) {
            lwarn!("adaptive pixel ({}, {}) is not yet decoded", at.x, at.y);

            bail!(HeaderError::InvalidAtPixel);
        }

        let offsets = template
            .taps()
            .iter()
            .map(|tap| match *tap {
                Fixed(x, y) => (i64::from(x), i64::from(y)),
                Adaptive(i) => (
                    i64::from(adaptive_pixels[i].x),
                    i64::from(adaptive_pixels[i].y),
                ),
            })
            .collect();

        Ok(Self {
            template,
            offsets,
            tpgdon,
            contexts: contexts(1 << template.context_bits()),
        })
    }

    /// The template of this decoder.
    pub fn template(&self) -> GenericTemplate {
        self.template
    }

    /// Reset all contexts to their initial state.
    pub fn reset(&mut self) {
        self.contexts.fill(Context::default());
    }

    /// Decode a `width` x `height` bitmap (6.2.5.7).
    pub fn decode(
        &mut self,
        width: u32,
        height: u32,
        decoder: &mut ArithmeticDecoder<'_>,
        settings: &DecodeSettings,
    ) -> Result<Bitmap> {
        let mut bitmap = Bitmap::with_settings(width, height, settings)?;
        let sltp_context = self.template.typical_prediction_context();

        // "1) Set: LTP = 0"
        let mut ltp = false;

        for y in 0..height {
            if self.tpgdon {
                // "Let SLTP be the value of this bit. Set: LTP = LTP XOR SLTP"
                ltp ^= decoder.decode(&mut self.contexts[sltp_context]) == 1;

                // "If LTP = 1 then set every pixel of the current row of GBREG
                // equal to the corresponding pixel of the row immediately
                // above." The row above the first one is white.
                if ltp {
                    if y > 0 {
                        bitmap.copy_row(y - 1, y);
                    }

                    continue;
                }
            }

            for x in 0..width {
                let cx = self.context(&bitmap, i64::from(x), i64::from(y));

                if decoder.decode(&mut self.contexts[cx]) == 1 {
                    bitmap.set_pixel(x, y, 1);
                }
            }
        }

        Ok(bitmap)
    }

    /// The context of the pixel at (x, y) (6.2.5.3, 6.2.5.4).
    ///
    /// "All pixels lying outside the bounds of the actual bitmap have the
    /// value 0." (6.2.5.2)
    #[inline(always)]
    pub(crate) fn context(&self, bitmap: &Bitmap, x: i64, y: i64) -> usize {
        self.offsets.iter().fold(0, |cx, &(dx, dy)| {
            (cx << 1) | bitmap.pixel(x + dx, y + dy) as usize
        })
    }
}

/// Decode an arithmetically coded generic region with fresh contexts.
pub fn decode_generic_region(
    width: u32,
    height: u32,
    template: GenericTemplate,
    adaptive_pixels: &[AdaptivePixel],
    tpgdon: bool,
    decoder: &mut ArithmeticDecoder<'_>,
    settings: &DecodeSettings,
) -> Result<Bitmap> {
    GenericRegionDecoder::new(template, adaptive_pixels, tpgdon)?
        .decode(width, height, decoder, settings)
}

/// Parsed generic region segment header (7.4.6.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericRegionHeader {
    /// Region segment information field (7.4.1).
    pub region_info: RegionInfo,
    /// "Bit 0: MMR"
    pub mmr: bool,
    /// "Bits 1-2: GBTEMPLATE"
    pub template: GenericTemplate,
    /// "Bit 3: TPGDON"
    pub tpgdon: bool,
    /// Adaptive pixels (7.4.6.3). Empty for MMR coded regions.
    pub adaptive_pixels: Vec<AdaptivePixel>,
}

impl GenericRegionHeader {
    /// Parse a generic region segment data header.
    pub fn parse(reader: &mut BitReader<'_>, settings: &DecodeSettings) -> Result<Self> {
        let region_info = RegionInfo::parse(reader, settings)?;
        let flags = reader.read_byte()?;

        let mmr = flags & 0x01 != 0;
        let template = GenericTemplate::from_value((flags >> 1) & 0x03)?;
        let tpgdon = flags & 0x08 != 0;

        // "Bit 4: EXTTEMPLATE. This field specifies whether extended reference
        // template is used."
        if flags & 0x10 != 0 {
            lwarn!("extended generic templates are not supported");

            bail!(HeaderError::InvalidTemplate);
        }

        // "Bits 5-7: Reserved; must be zero."
        check_reserved(flags & 0xE0, settings)?;

        let adaptive_pixels = if mmr {
            // "If MMR is 1 then this field must contain the value zero."
            if template != GenericTemplate::Template0 {
                bail!(HeaderError::InvalidTemplate);
            }

            Vec::new()
        } else {
            parse_adaptive_pixels(reader, template.adaptive_pixel_count())?
        };

        Ok(Self {
            region_info,
            mmr,
            template,
            tpgdon,
            adaptive_pixels,
        })
    }
}

/// Decode the data of a generic region segment.
///
/// `unknown_length` states whether the segment header announced an unknown
/// data length, in which case the data ends with the number of rows that
/// were actually coded (7.4.6.4).
pub fn decode_generic_region_segment(
    data: &[u8],
    unknown_length: bool,
    segment_number: Option<u32>,
    settings: &DecodeSettings,
) -> core::result::Result<DecodedRegion, RegionDecodeError> {
    let mut reader = BitReader::new(data);
    let mut header = GenericRegionHeader::parse(&mut reader, settings).locate(segment_number, 0)?;

    let offset = reader.byte_pos();
    let mut encoded = reader.tail();

    if unknown_length {
        let split = encoded
            .len()
            .checked_sub(4)
            .ok_or(DecodeError::UnexpectedEof)
            .locate(segment_number, data.len())?;
        let (head, tail) = encoded.split_at(split);
        let rows = BitReader::new(tail)
            .read_u32()
            .locate(segment_number, offset + split)?;

        // "it must be no greater than the region segment bitmap height value
        // in the segment's region segment information field." (7.4.6.4)
        if rows > header.region_info.height {
            return Err(RegionDecodeError {
                segment_number,
                offset: offset + split,
                error: HeaderError::InvalidDimension.into(),
            });
        }

        header.region_info.height = rows;
        encoded = head;
    }

    let RegionInfo { width, height, .. } = header.region_info;

    ltrace!(
        "decoding {}x{} generic region (mmr: {}, template: {:?}, tpgdon: {})",
        width,
        height,
        header.mmr,
        header.template,
        header.tpgdon
    );

    let result = if header.mmr {
        decode_mmr(width, height, &mut BitReader::new(encoded), settings)
    } else {
        let mut decoder = ArithmeticDecoder::new(encoded);
        let bitmap = decode_generic_region(
            width,
            height,
            header.template,
            &header.adaptive_pixels,
            header.tpgdon,
            &mut decoder,
            settings,
        );

        ldebug!("decoded {} symbols", decoder.decoded_symbols());

        bitmap
    };

    let bitmap = result.locate(segment_number, offset)?;

    Ok(DecodedRegion {
        info: header.region_info,
        bitmap,
    })
}
