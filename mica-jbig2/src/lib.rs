/*!
A memory-safe, pure-Rust JBIG2 region decoding engine.

`mica-jbig2` implements the parts of ITU-T T.88 (also known as ISO/IEC 14492)
that turn the data of a single region segment back into pixels: the MQ
arithmetic decoder, the integer and symbol ID decoding procedures, generic
region decoding with templates or MMR, generic refinement region decoding and
composition of region bitmaps into a page. Segment framing and page assembly
are left to the caller.

# Example
```rust
use mica_jbig2::{Bitmap, DecodeSettings, GenericTemplate, compose, CombinationOperator};

// A 2x2 region coded with template 0, decoded from an empty stream.
let mut decoder = mica_jbig2::ArithmeticDecoder::new(&[]);
let region = mica_jbig2::decode_generic_region(
    2,
    2,
    GenericTemplate::Template0,
    GenericTemplate::Template0.nominal_adaptive_pixels(),
    false,
    &mut decoder,
    &DecodeSettings::default(),
)
.unwrap();

let mut page = Bitmap::new(16, 16).unwrap();
compose(&mut page, &region, 4, 4, CombinationOperator::Or);
assert_eq!(page.count_black(), region.count_black());
```

# Cargo features
- `image` (default): conversion of bitmaps into [`image::GrayImage`].
- `logging`: forward diagnostics to the [`log`](https://docs.rs/log) crate.

# Safety
This crate forbids unsafe code via a crate-level attribute.
*/

#![forbid(unsafe_code)]

mod arithmetic_decoder;
mod bitmap;
mod compose;
mod error;
#[cfg(feature = "image")]
mod integration;
mod integer_decoder;
mod log;
mod reader;
mod region;
mod symbol_id_decoder;
#[cfg(test)]
mod test_encoder;

pub use arithmetic_decoder::{ArithmeticDecoder, Context};
pub use bitmap::Bitmap;
pub use compose::{CombinationOperator, compose};
pub use error::{DecodeError, HeaderError, RegionDecodeError, Result};
pub use integer_decoder::IntegerDecoder;
pub use reader::BitReader;
pub use region::generic::{
    GenericRegionDecoder, GenericRegionHeader, GenericTemplate, decode_generic_region,
    decode_generic_region_segment,
};
pub use region::generic_refinement::{
    RefinementRegionDecoder, RefinementRegionHeader, RefinementTemplate,
    decode_refinement_region, decode_refinement_region_segment,
};
pub use region::mmr::decode_mmr;
pub use region::{AdaptivePixel, DecodedRegion, RegionInfo};
pub use symbol_id_decoder::{MAX_CODE_LEN, SymbolIdDecoder};

/// The pixel budget of [`DecodeSettings::default`].
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 28;

/// Settings to apply during decoding.
#[derive(Debug, Copy, Clone)]
pub struct DecodeSettings {
    /// The maximum number of pixels a single bitmap may have.
    ///
    /// Regions exceeding it fail with [`HeaderError::TooManyPixels`] before
    /// any memory is allocated for them.
    pub max_pixels: u64,
    /// Whether to reject nonzero reserved header bits instead of ignoring
    /// them.
    pub strict: bool,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
            strict: false,
        }
    }
}
