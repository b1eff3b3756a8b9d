/// Avatar image normalization
///
/// Accepted uploads (JPEG or PNG) are decoded, resized to a fixed square,
/// and re-encoded as PNG before storage, so every stored avatar has the same
/// format and dimensions regardless of what was uploaded.

use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;

/// Side length of the stored square avatar, in pixels
pub const AVATAR_SIZE: u32 = 250;

/// Error type for avatar processing
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    /// Bytes did not decode as a supported image
    #[error("unable to decode image: {0}")]
    Decode(String),

    /// PNG re-encoding failed
    #[error("unable to encode image: {0}")]
    Encode(String),
}

/// Normalizes uploaded image bytes to a 250×250 PNG
///
/// # Errors
///
/// Returns [`AvatarError::Decode`] when the bytes are not a decodable JPEG
/// or PNG, [`AvatarError::Encode`] if re-encoding fails.
pub fn normalize_avatar(bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AvatarError::Decode(e.to_string()))?;

    let resized = decoded.resize_exact(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| AvatarError::Encode(e.to_string()))?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_png_input_is_resized_to_square() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let bytes = encode(&source, ImageFormat::Png);

        let normalized = normalize_avatar(&bytes).expect("normalization should succeed");

        let result = image::load_from_memory(&normalized).unwrap();
        assert_eq!(result.width(), AVATAR_SIZE);
        assert_eq!(result.height(), AVATAR_SIZE);
        assert_eq!(
            image::guess_format(&normalized).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_jpeg_input_becomes_png() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(100, 300));
        let bytes = encode(&source, ImageFormat::Jpeg);

        let normalized = normalize_avatar(&bytes).unwrap();

        assert_eq!(
            image::guess_format(&normalized).unwrap(),
            ImageFormat::Png
        );
        let result = image::load_from_memory(&normalized).unwrap();
        assert_eq!((result.width(), result.height()), (AVATAR_SIZE, AVATAR_SIZE));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let result = normalize_avatar(b"definitely not an image");
        assert!(matches!(result, Err(AvatarError::Decode(_))));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(normalize_avatar(&[]).is_err());
    }
}
