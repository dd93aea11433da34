//! Image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the RGBA
//! buffer that pieces are cut from.

use image::RgbaImage;

use crate::types::PuzzleError;

/// Decode raw image bytes into RGBA.
///
/// Images without an alpha channel come back fully opaque.
///
/// # Errors
///
/// Returns [`PuzzleError::EmptyInput`] if `bytes` is empty.
/// Returns [`PuzzleError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PuzzleError> {
    if bytes.is_empty() {
        return Err(PuzzleError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{ImageEncoder, Rgb, RgbImage};

    use super::*;

    #[test]
    fn empty_input_returns_error() {
        let result = decode_rgba(&[]);
        assert!(matches!(result, Err(PuzzleError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_rgba(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PuzzleError::ImageDecode(_))));
    }

    #[test]
    fn rgb_png_decodes_as_opaque_rgba() {
        let img = RgbImage::from_fn(3, 2, |x, _| Rgb([10 * u8::try_from(x).unwrap(), 20, 30]));
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(img.as_raw(), 3, 2, image::ExtendedColorType::Rgb8)
            .unwrap();

        let rgba = decode_rgba(&buf).unwrap();
        assert_eq!(rgba.dimensions(), (3, 2));
        assert_eq!(rgba.get_pixel(2, 1).0, [20, 20, 30, 255]);
    }
}
