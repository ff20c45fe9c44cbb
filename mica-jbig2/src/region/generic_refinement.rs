//! Generic refinement region segment parsing and decoding (7.4.7, 6.3).

use super::{AdaptivePixel, DecodedRegion, RegionInfo, check_reserved, parse_adaptive_pixels};
use crate::DecodeSettings;
use crate::arithmetic_decoder::{ArithmeticDecoder, Context, contexts};
use crate::bitmap::Bitmap;
use crate::error::{DecodeError, HeaderError, Locate, RegionDecodeError, Result, bail};
use crate::log::{ldebug, ltrace, lwarn};
use crate::reader::BitReader;

/// "GRTEMPLATE - The template identifier." (Table 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefinementTemplate {
    /// 13 pixel template with two adaptive pixels (Figure 12).
    Template0,
    /// 10 pixel template (Figure 13).
    Template1,
}

impl RefinementTemplate {
    /// Parse the 1-bit GRTEMPLATE field.
    pub fn from_value(value: u8) -> Self {
        if value & 1 == 0 {
            Self::Template0
        } else {
            Self::Template1
        }
    }

    /// The number of adaptive pixels the template uses. The first one lies
    /// in the bitmap being decoded, the second one in the reference bitmap.
    pub fn adaptive_pixel_count(self) -> usize {
        match self {
            Self::Template0 => 2,
            Self::Template1 => 0,
        }
    }

    /// The adaptive pixel positions of Figure 12.
    pub fn nominal_adaptive_pixels(self) -> &'static [AdaptivePixel] {
        const T0: [AdaptivePixel; 2] = [AdaptivePixel::new(-1, -1), AdaptivePixel::new(-1, -1)];

        match self {
            Self::Template0 => &T0,
            Self::Template1 => &[],
        }
    }

    /// The number of bits in a context value.
    pub fn context_bits(self) -> u32 {
        match self {
            Self::Template0 => 13,
            Self::Template1 => 10,
        }
    }

    /// The context used for the SLTP bit (Figures 14 and 15).
    fn typical_prediction_context(self) -> usize {
        match self {
            Self::Template0 => 0b0_0000_0001_0000,
            Self::Template1 => 0b00_0000_1000,
        }
    }
}

/// Decoder for generic refinement regions (6.3.5).
///
/// Like [`GenericRegionDecoder`](crate::GenericRegionDecoder), the decoder
/// owns its contexts and keeps adapting them across calls until
/// [`RefinementRegionDecoder::reset`] is called.
#[derive(Debug, Clone)]
pub struct RefinementRegionDecoder {
    template: RefinementTemplate,
    /// Neighbours in the bitmap being decoded, most significant bit first.
    region_offsets: Vec<(i64, i64)>,
    /// Neighbours in the reference bitmap, relative to the reference pixel.
    reference_offsets: Vec<(i64, i64)>,
    tpgron: bool,
    contexts: Vec<Context>,
}

impl RefinementRegionDecoder {
    /// Create a new decoder.
    ///
    /// Template 0 takes two adaptive pixels. The first one must refer to an
    /// already decoded pixel, the second one may point anywhere in the
    /// reference bitmap.
    pub fn new(
        template: RefinementTemplate,
        adaptive_pixels: &[AdaptivePixel],
        tpgron: bool,
    ) -> Result<Self> {
        if adaptive_pixels.len() != template.adaptive_pixel_count() {
            bail!(HeaderError::InvalidAtPixel);
        }

        let at = |i: usize| {
            let pixel = adaptive_pixels[i];
            (i64::from(pixel.x), i64::from(pixel.y))
        };

        let (region_offsets, reference_offsets) = match template {
            RefinementTemplate::Template0 => {
                if !adaptive_pixels[0].is_causal() {
                    lwarn!(
                        "refinement adaptive pixel ({}, {}) is not yet decoded",
                        adaptive_pixels[0].x,
                        adaptive_pixels[0].y
                    );

                    bail!(HeaderError::InvalidAtPixel);
                }

                (
                    vec![at(0), (0, -1), (1, -1), (-1, 0)],
                    vec![
                        at(1),
                        (0, -1),
                        (1, -1),
                        (-1, 0),
                        (0, 0),
                        (1, 0),
                        (-1, 1),
                        (0, 1),
                        (1, 1),
                    ],
                )
            }
            RefinementTemplate::Template1 => (
                vec![(-1, -1), (0, -1), (1, -1), (-1, 0)],
                vec![(0, -1), (-1, 0), (0, 0), (1, 0), (0, 1), (1, 1)],
            ),
        };

        Ok(Self {
            template,
            region_offsets,
            reference_offsets,
            tpgron,
            contexts: contexts(1 << template.context_bits()),
        })
    }

    /// The template of this decoder.
    pub fn template(&self) -> RefinementTemplate {
        self.template
    }

    /// Reset all contexts to their initial state.
    pub fn reset(&mut self) {
        self.contexts.fill(Context::default());
    }

    /// Decode a `width` x `height` refinement of `reference` (6.3.5.6).
    ///
    /// The reference pixel of (x, y) is (x - `dx`, y - `dy`). Pixels outside
    /// of either bitmap read as 0.
    pub fn decode(
        &mut self,
        width: u32,
        height: u32,
        reference: &Bitmap,
        dx: i32,
        dy: i32,
        decoder: &mut ArithmeticDecoder<'_>,
        settings: &DecodeSettings,
    ) -> Result<Bitmap> {
        let mut bitmap = Bitmap::with_settings(width, height, settings)?;
        let sltp_context = self.template.typical_prediction_context();
        let (dx, dy) = (i64::from(dx), i64::from(dy));

        // "1) Set LTP = 0."
        let mut ltp = false;

        for y in 0..height {
            if self.tpgron {
                // "Let SLTP be the value of this bit. Set: LTP = LTP XOR SLTP"
                ltp ^= decoder.decode(&mut self.contexts[sltp_context]) == 1;
            }

            for x in 0..width {
                let (x, y) = (i64::from(x), i64::from(y));

                // "If TPGRPIX is 1 then implicitly decode the current pixel by
                // setting it equal to its predicted value (TPGRVAL)."
                let pixel = match ltp.then(|| typical_value(reference, x - dx, y - dy)) {
                    Some(Some(value)) => value,
                    _ => {
                        let cx = self.context(&bitmap, reference, x, y, dx, dy);
                        decoder.decode(&mut self.contexts[cx])
                    }
                };

                if pixel == 1 {
                    bitmap.set_pixel(x as u32, y as u32, 1);
                }
            }
        }

        Ok(bitmap)
    }

    /// The context of the pixel at (x, y) (6.3.5.3).
    #[inline(always)]
    pub(crate) fn context(
        &self,
        bitmap: &Bitmap,
        reference: &Bitmap,
        x: i64,
        y: i64,
        dx: i64,
        dy: i64,
    ) -> usize {
        let (rx, ry) = (x - dx, y - dy);

        let cx = self.region_offsets.iter().fold(0, |cx, &(ox, oy)| {
            (cx << 1) | bitmap.pixel(x + ox, y + oy) as usize
        });

        self.reference_offsets.iter().fold(cx, |cx, &(ox, oy)| {
            (cx << 1) | reference.pixel(rx + ox, ry + oy) as usize
        })
    }
}

/// TPGRVAL, if the 3 x 3 neighbourhood of the reference pixel at (x, y) is
/// uniform (Figure 16).
#[inline]
pub(crate) fn typical_value(reference: &Bitmap, x: i64, y: i64) -> Option<u32> {
    let center = reference.pixel(x, y);

    for oy in -1..=1 {
        for ox in -1..=1 {
            if reference.pixel(x + ox, y + oy) != center {
                return None;
            }
        }
    }

    Some(center)
}

/// Decode a generic refinement region with fresh contexts.
pub fn decode_refinement_region(
    width: u32,
    height: u32,
    template: RefinementTemplate,
    reference: &Bitmap,
    dx: i32,
    dy: i32,
    adaptive_pixels: &[AdaptivePixel],
    tpgron: bool,
    decoder: &mut ArithmeticDecoder<'_>,
    settings: &DecodeSettings,
) -> Result<Bitmap> {
    RefinementRegionDecoder::new(template, adaptive_pixels, tpgron)?
        .decode(width, height, reference, dx, dy, decoder, settings)
}

/// Parsed generic refinement region segment header (7.4.7.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementRegionHeader {
    /// Region segment information field (7.4.1).
    pub region_info: RegionInfo,
    /// "Bit 0: GRTEMPLATE"
    pub template: RefinementTemplate,
    /// "Bit 1: TPGRON"
    pub tpgron: bool,
    /// Adaptive pixels (7.4.7.3). Only present for template 0.
    pub adaptive_pixels: Vec<AdaptivePixel>,
}

impl RefinementRegionHeader {
    /// Parse a generic refinement region segment data header.
    pub fn parse(reader: &mut BitReader<'_>, settings: &DecodeSettings) -> Result<Self> {
        let region_info = RegionInfo::parse(reader, settings)?;
        let flags = reader.read_byte()?;

        let template = RefinementTemplate::from_value(flags);
        let tpgron = flags & 0x02 != 0;

        // "Bits 2-7: Reserved; must be 0."
        check_reserved(flags & 0xFC, settings)?;

        let adaptive_pixels = parse_adaptive_pixels(reader, template.adaptive_pixel_count())?;

        Ok(Self {
            region_info,
            template,
            tpgron,
            adaptive_pixels,
        })
    }
}

/// Decode the data of a generic refinement region segment.
///
/// `reference` is the bitmap being refined and (`reference_x`,
/// `reference_y`) its location on the page. When refining the page itself,
/// that is (0, 0).
pub fn decode_refinement_region_segment(
    data: &[u8],
    reference: &Bitmap,
    reference_x: u32,
    reference_y: u32,
    segment_number: Option<u32>,
    settings: &DecodeSettings,
) -> core::result::Result<DecodedRegion, RegionDecodeError> {
    let mut reader = BitReader::new(data);
    let header = RefinementRegionHeader::parse(&mut reader, settings).locate(segment_number, 0)?;
    let offset = reader.byte_pos();

    let offset_between = |reference: u32, region: u32| {
        i32::try_from(i64::from(reference) - i64::from(region)).map_err(|_| DecodeError::Overflow)
    };

    let dx = offset_between(reference_x, header.region_info.x).locate(segment_number, 0)?;
    let dy = offset_between(reference_y, header.region_info.y).locate(segment_number, 0)?;

    let RegionInfo { width, height, .. } = header.region_info;

    ltrace!(
        "decoding {}x{} refinement region (template: {:?}, tpgron: {}, offset: ({}, {}))",
        width,
        height,
        header.template,
        header.tpgron,
        dx,
        dy
    );

    let mut decoder = ArithmeticDecoder::new(reader.tail());
    let bitmap = decode_refinement_region(
        width,
        height,
        header.template,
        reference,
        dx,
        dy,
        &header.adaptive_pixels,
        header.tpgron,
        &mut decoder,
        settings,
    )
    .locate(segment_number, offset)?;

    ldebug!("decoded {} symbols", decoder.decoded_symbols());

    Ok(DecodedRegion {
        info: header.region_info,
        bitmap,
    })
}
