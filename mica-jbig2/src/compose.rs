//! Combining region bitmaps into a page bitmap (6.2.5.10, 7.4.1.5).

use crate::bitmap::{Bitmap, padding_mask};
use crate::error::{HeaderError, Result, err};

/// "These operators describe how the segment's bitmap is to be combined with
/// the page bitmap." (7.4.1.5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinationOperator {
    /// "0 OR"
    Or,
    /// "1 AND"
    And,
    /// "2 XOR"
    Xor,
    /// "3 XNOR"
    Xnor,
    /// "4 REPLACE"
    Replace,
}

impl CombinationOperator {
    /// Parse the 3-bit operator field of a region segment information field.
    pub fn from_value(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Or),
            1 => Ok(Self::And),
            2 => Ok(Self::Xor),
            3 => Ok(Self::Xnor),
            4 => Ok(Self::Replace),
            _ => err!(HeaderError::InvalidCombinationOperator),
        }
    }

    /// Apply the operator to eight packed pixels at once.
    #[inline(always)]
    fn apply(self, dst: u8, src: u8) -> u8 {
        match self {
            Self::Or => dst | src,
            Self::And => dst & src,
            Self::Xor => dst ^ src,
            Self::Xnor => !(dst ^ src),
            Self::Replace => src,
        }
    }
}

/// Combine `region` into `page`, placing its top-left pixel at (x, y).
///
/// The region may extend over any edge of the page, in which case the pixels
/// that fall outside are dropped. The page dimensions never change.
pub fn compose(page: &mut Bitmap, region: &Bitmap, x: i64, y: i64, op: CombinationOperator) {
    let (Some((x0, x1)), Some((y0, y1))) = (
        clip(x, region.width(), page.width()),
        clip(y, region.height(), page.height()),
    ) else {
        return;
    };

    if x % 8 == 0 {
        compose_aligned(page, region, x, y, (x0, x1), (y0, y1), op);
    } else {
        for py in y0..y1 {
            let ry = (py - y) as u32;

            for px in x0..x1 {
                let rx = (px - x) as u32;
                let (px, py) = (px as u32, py as u32);
                let value = op.apply(page.get_pixel(px, py), region.get_pixel(rx, ry)) & 1;
                page.set_pixel(px, py, value);
            }
        }
    }
}

/// The visible range `[start, end)` in page coordinates.
fn clip(offset: i64, len: u32, page_len: u32) -> Option<(i64, i64)> {
    let start = offset.max(0);
    let end = (offset + i64::from(len)).min(i64::from(page_len));

    (start < end).then_some((start, end))
}

/// Whole bytes of the region line up with whole bytes of the page.
fn compose_aligned(
    page: &mut Bitmap,
    region: &Bitmap,
    x: i64,
    y: i64,
    (x0, x1): (i64, i64),
    (y0, y1): (i64, i64),
    op: CombinationOperator,
) {
    // In region coordinates, only pixels in `[x0 - x, x1 - x)` are visible.
    // Since both `x` and 0 are multiples of 8, the start is byte-aligned.
    let first = ((x0 - x) / 8) as usize;
    let visible = (x1 - x) as u32;
    let last = visible.div_ceil(8) as usize;
    let tail_mask = padding_mask(visible);
    let shift = x / 8;

    for py in y0..y1 {
        let ry = (py - y) as u32;

        let (Some(src), Some(dst)) = (region.row(ry), page.row_mut(py as u32)) else {
            continue;
        };

        let start = (first as i64 + shift) as usize;
        let dst = &mut dst[start..start + (last - first)];

        for (i, (d, &s)) in dst.iter_mut().zip(&src[first..last]).enumerate() {
            let mask = if first + i + 1 == last { tail_mask } else { 0xFF };

            *d = (*d & !mask) | (op.apply(*d, s) & mask);
        }
    }
}
