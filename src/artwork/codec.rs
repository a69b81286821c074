/// Image codec for the artwork payload column
///
/// Bitmaps are stored as PNG: lossless and self-describing, so a decoded
/// image is pixel-for-pixel identical to the one that was encoded.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while converting between bitmaps and bytes
#[derive(Debug, Error)]
pub enum CodecError {
    /// Bitmap has a zero width or height
    #[error("cannot encode an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// No bytes to decode (NULL or zero-length blob)
    #[error("image payload is empty")]
    EmptyInput,

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to read image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Encode a bitmap into PNG bytes
pub fn encode(bitmap: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(CodecError::EmptyImage { width, height });
    }

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(bitmap.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(CodecError::Encode)?;

    Ok(bytes)
}

/// Decode bytes back into a bitmap
///
/// The format is sniffed from the payload, so rows written by other tools
/// (JPEG, BMP, ...) still load as long as the `image` crate supports them.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::EmptyInput);
    }

    let image = image::load_from_memory(bytes).map_err(CodecError::Decode)?;
    Ok(image.to_rgba8())
}

/// Read an image file from disk into a bitmap
pub fn load_file(path: &Path) -> Result<RgbaImage, CodecError> {
    let image = image::open(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = ((x * 37 + y * 11) % 256) as u8;
            Rgba([v, 255 - v, (x % 7) as u8 * 30, if (x + y) % 2 == 0 { 255 } else { 128 }])
        })
    }

    #[test]
    fn test_round_trip_is_pixel_exact() {
        let original = checkerboard(31, 17);
        let bytes = encode(&original).unwrap();
        let restored = decode(&bytes).unwrap();

        assert_eq!(restored.dimensions(), (31, 17));
        assert_eq!(restored, original);
    }

    #[test]
    fn test_single_pixel_round_trip() {
        let original = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4]));
        let restored = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_encode_rejects_empty_image() {
        let empty = RgbaImage::new(0, 10);
        assert!(matches!(
            encode(&empty),
            Err(CodecError::EmptyImage { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_decode_rejects_empty_bytes() {
        assert!(matches!(decode(&[]), Err(CodecError::EmptyInput)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let bytes = encode(&checkerboard(8, 8)).unwrap();
        assert!(decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_load_file_missing() {
        let result = load_file(Path::new("/nonexistent/artwork.png"));
        assert!(matches!(result, Err(CodecError::Io { .. })));
    }

    #[test]
    fn test_load_file_reads_saved_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.png");
        let original = checkerboard(12, 9);
        std::fs::write(&path, encode(&original).unwrap()).unwrap();

        assert_eq!(load_file(&path).unwrap(), original);
    }
}
