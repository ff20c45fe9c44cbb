//! Packed bi-level bitmaps.
//!
//! "Pixels decoded by the MMR decoder having the value 'black' shall be treated
//! as having the value 1. Pixels decoded by the MMR decoder having the value
//! 'white' shall be treated as having the value 0." (6.2.6)

use core::fmt;

use crate::DecodeSettings;
use crate::error::{HeaderError, Result, bail};

/// A bi-level bitmap with one bit per pixel.
///
/// Rows are padded to whole bytes and the most significant bit of each byte
/// is the leftmost pixel. A set bit is black. Padding bits are always zero.
///
/// Reading a pixel outside of the bitmap yields 0 and writing one is a no-op.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create a white bitmap, using the default pixel budget.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_settings(width, height, &DecodeSettings::default())
    }

    /// Create a white bitmap, failing if it has more than
    /// `settings.max_pixels` pixels.
    ///
    /// The check happens before anything is allocated.
    pub fn with_settings(width: u32, height: u32, settings: &DecodeSettings) -> Result<Self> {
        let pixels = u64::from(width) * u64::from(height);

        if pixels > settings.max_pixels {
            bail!(HeaderError::TooManyPixels);
        }

        let stride = width.div_ceil(8) as usize;
        let len = stride
            .checked_mul(height as usize)
            .ok_or(HeaderError::TooManyPixels)?;

        Ok(Self {
            width,
            height,
            stride,
            data: vec![0; len],
        })
    }

    /// Wrap packed pixel data. Returns `None` if the length does not match.
    ///
    /// Padding bits at the end of each row are cleared.
    pub fn from_packed(width: u32, height: u32, mut data: Vec<u8>) -> Option<Self> {
        let stride = width.div_ceil(8) as usize;

        if stride.checked_mul(height as usize)? != data.len() {
            return None;
        }

        let mask = padding_mask(width);

        if mask != 0xFF {
            for row in data.chunks_exact_mut(stride) {
                row[stride - 1] &= mask;
            }
        }

        Some(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// The width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The number of bytes per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The packed pixel data, row by row.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the bitmap, returning the packed pixel data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The value (0 or 1) of the pixel at (x, y).
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }

        let byte = self.data[y as usize * self.stride + (x / 8) as usize];

        (byte >> (7 - (x % 8))) & 1
    }

    /// Set the pixel at (x, y). Any nonzero value is black.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = y as usize * self.stride + (x / 8) as usize;
        let bit = 0x80 >> (x % 8);

        if value != 0 {
            self.data[idx] |= bit;
        } else {
            self.data[idx] &= !bit;
        }
    }

    /// Pixel access with signed coordinates, as needed for template
    /// neighbourhoods that reach over the edges.
    #[inline(always)]
    pub(crate) fn pixel(&self, x: i64, y: i64) -> u32 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }

        u32::from(self.get_pixel(x as u32, y as u32))
    }

    /// The packed bytes of row `y`.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }

        let start = y as usize * self.stride;

        Some(&self.data[start..start + self.stride])
    }

    /// The packed bytes of row `y`, mutably.
    ///
    /// Callers must keep the padding bits of the last byte zero.
    pub(crate) fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }

        let start = y as usize * self.stride;

        Some(&mut self.data[start..start + self.stride])
    }

    /// Copy row `from` over row `to`. Out-of-range rows are ignored.
    pub fn copy_row(&mut self, from: u32, to: u32) {
        if from >= self.height || to >= self.height || from == to {
            return;
        }

        let src = from as usize * self.stride;
        self.data
            .copy_within(src..src + self.stride, to as usize * self.stride);
    }

    /// Set every pixel to the given colour.
    pub fn fill(&mut self, black: bool) {
        if !black {
            self.data.fill(0);

            return;
        }

        self.data.fill(0xFF);

        let mask = padding_mask(self.width);
        let stride = self.stride;

        if mask != 0xFF && stride > 0 {
            for row in self.data.chunks_exact_mut(stride) {
                row[stride - 1] = mask;
            }
        }
    }

    /// Set `count` pixels of row `y`, starting at `x`, to black.
    pub(crate) fn fill_run(&mut self, y: u32, x: u32, count: u32) {
        let end = x.saturating_add(count).min(self.width);

        let Some(row) = self.row_mut(y) else {
            return;
        };

        let mut x = x;

        while x < end {
            let bit = x % 8;
            let take = (8 - bit).min(end - x);
            let mask = ((0xFF_u16 << (8 - take)) as u8) >> bit;
            row[(x / 8) as usize] |= mask;
            x += take;
        }
    }

    /// The number of black pixels.
    pub fn count_black(&self) -> u64 {
        self.data.iter().map(|b| u64::from(b.count_ones())).sum()
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitmap {}x{}", self.width, self.height)?;

        for y in 0..self.height {
            for x in 0..self.width {
                f.write_str(if self.get_pixel(x, y) == 1 { "#" } else { "." })?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

/// Mask of the valid bits in the last byte of a row.
pub(crate) fn padding_mask(width: u32) -> u8 {
    match width % 8 {
        0 => 0xFF,
        rem => 0xFF << (8 - rem),
    }
}
