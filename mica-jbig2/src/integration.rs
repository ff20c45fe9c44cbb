//! Integration with the [image] crate

use ::image::error::{DecodingError, ImageFormatHint};
use ::image::{ColorType, ExtendedColorType, GrayImage, ImageDecoder, ImageError, ImageResult};

use crate::Bitmap;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

impl Bitmap {
    /// Convert the bitmap into an 8-bit grayscale image with black pixels
    /// as 0 and white pixels as 255.
    pub fn to_gray_image(&self) -> GrayImage {
        let mut buf = vec![0; self.width() as usize * self.height() as usize];
        expand_into(self, &mut buf);

        // The buffer length always matches.
        GrayImage::from_raw(self.width(), self.height(), buf)
            .unwrap_or_else(|| GrayImage::new(self.width(), self.height()))
    }
}

impl From<&Bitmap> for GrayImage {
    fn from(bitmap: &Bitmap) -> Self {
        bitmap.to_gray_image()
    }
}

impl ImageDecoder for Bitmap {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn color_type(&self) -> ColorType {
        ColorType::L8
    }

    fn original_color_type(&self) -> ExtendedColorType {
        ExtendedColorType::L1
    }

    fn read_image(self, buf: &mut [u8]) -> ImageResult<()>
    where
        Self: Sized,
    {
        expand_into(&self, buf);

        Ok(())
    }

    fn read_image_boxed(self: Box<Self>, buf: &mut [u8]) -> ImageResult<()> {
        expand_into(&self, buf);

        Ok(())
    }
}

fn expand_into(bitmap: &Bitmap, buf: &mut [u8]) {
    let width = bitmap.width() as usize;

    if width == 0 {
        return;
    }

    for (y, out) in (0..bitmap.height()).zip(buf.chunks_exact_mut(width)) {
        let Some(row) = bitmap.row(y) else {
            continue;
        };

        for (x, pixel) in out.iter_mut().enumerate() {
            let black = (row[x / 8] >> (7 - (x % 8))) & 1 == 1;
            *pixel = if black { BLACK } else { WHITE };
        }
    }
}

impl From<crate::DecodeError> for DecodingError {
    fn from(value: crate::DecodeError) -> Self {
        let format = ImageFormatHint::Name("JBIG2".to_owned());
        Self::new(format, value)
    }
}

impl From<crate::DecodeError> for ImageError {
    fn from(value: crate::DecodeError) -> Self {
        Self::Decoding(value.into())
    }
}

impl From<crate::RegionDecodeError> for ImageError {
    fn from(value: crate::RegionDecodeError) -> Self {
        let format = ImageFormatHint::Name("JBIG2".to_owned());
        Self::Decoding(DecodingError::new(format, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_is_zero() {
        let mut bitmap = Bitmap::new(10, 2).unwrap();
        bitmap.set_pixel(0, 0, 1);
        bitmap.set_pixel(9, 1, 1);

        let image = bitmap.to_gray_image();

        assert_eq!(image.dimensions(), (10, 2));
        assert_eq!(image.get_pixel(0, 0).0, [0]);
        assert_eq!(image.get_pixel(1, 0).0, [255]);
        assert_eq!(image.get_pixel(9, 1).0, [0]);
        assert_eq!(image.get_pixel(8, 1).0, [255]);
    }

    #[test]
    fn decoder_fills_buffer() {
        let mut bitmap = Bitmap::new(3, 1).unwrap();
        bitmap.set_pixel(1, 0, 1);

        assert_eq!(bitmap.total_bytes(), 3);

        let mut buf = [7; 3];
        bitmap.read_image(&mut buf).unwrap();
        assert_eq!(buf, [255, 0, 255]);
    }
}
