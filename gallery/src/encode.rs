//! Bitmap re-encoding for uploads and local copies.

use api_client::ApiClientError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// JPEG quality used for uploads (0.75 on a 0..1 scale).
pub const UPLOAD_JPEG_QUALITY: u8 = 75;

fn decode(bytes: &[u8]) -> Result<DynamicImage, ApiClientError> {
    image::load_from_memory(bytes).map_err(|e| ApiClientError::DecodeFailure(e.to_string()))
}

/// Decode `bytes` in any supported format and re-encode them as JPEG.
pub fn encode_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, ApiClientError> {
    let rgb = decode(bytes)?.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| ApiClientError::DecodeFailure(e.to_string()))?;
    Ok(out)
}

pub fn encode_png(bytes: &[u8]) -> Result<Vec<u8>, ApiClientError> {
    let img = decode(bytes)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ApiClientError::DecodeFailure(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_fixture() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 3, Rgba([200, 40, 10, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_png_to_jpeg() {
        let jpeg = encode_jpeg(&png_fixture(), UPLOAD_JPEG_QUALITY).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_jpeg_to_png() {
        let jpeg = encode_jpeg(&png_fixture(), UPLOAD_JPEG_QUALITY).unwrap();
        let png = encode_png(&jpeg).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_garbage_is_decode_failure() {
        let err = encode_jpeg(b"definitely not an image", UPLOAD_JPEG_QUALITY).unwrap_err();
        assert!(matches!(err, ApiClientError::DecodeFailure(_)));
    }
}
