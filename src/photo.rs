use std::io::Cursor;

use image::{GenericImageView, ImageFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoError {
    /// The uploaded bytes are not a decodable image.
    #[error("could not decode uploaded image: {0}")]
    Decode(image::ImageError),

    #[error("could not encode photo as JPEG: {0}")]
    Encode(image::ImageError),
}

/// Normalizes an uploaded photo to a centered-square JPEG.
///
/// The crop keeps `min(width, height)` pixels per side and discards the rest;
/// nothing is scaled or letterboxed. Callers must only pass a payload with
/// nonzero length — an empty upload means "no new photo", not an error.
pub fn normalize(raw: &[u8]) -> Result<Vec<u8>, PhotoError> {
    let img = image::load_from_memory(raw).map_err(PhotoError::Decode)?;

    let (width, height) = img.dimensions();
    let size = width.min(height);
    let square = img.crop_imm((width - size) / 2, (height - size) / 2, size, size);

    let mut out = Cursor::new(Vec::new());
    square
        .write_to(&mut out, ImageFormat::Jpeg)
        .map_err(PhotoError::Encode)?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buf = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(buf)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn landscape_is_cropped_to_square() {
        let out = normalize(&png_bytes(80, 60)).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.dimensions(), (60, 60));
    }

    #[test]
    fn portrait_is_cropped_to_square() {
        let out = normalize(&png_bytes(30, 90)).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.dimensions(), (30, 30));
    }

    #[test]
    fn square_input_keeps_its_side() {
        let out = normalize(&png_bytes(64, 64)).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.dimensions(), (64, 64));
    }

    #[test]
    fn output_is_jpeg() {
        let out = normalize(&png_bytes(48, 32)).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn output_survives_a_second_pass() {
        let first = normalize(&png_bytes(50, 70)).unwrap();
        let second = normalize(&first).unwrap();
        let img = image::load_from_memory(&second).unwrap();
        assert_eq!(img.dimensions(), (50, 50));
    }

    #[test]
    fn corrupt_bytes_are_a_decode_error() {
        let err = normalize(b"not an image at all").unwrap_err();
        assert!(matches!(err, PhotoError::Decode(_)));
    }
}
