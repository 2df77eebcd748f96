//! JPEG encoding of camera frames into data URIs.

use base64::prelude::*;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::{Error, Result};

/// MIME type of encoded snapshots.
pub const JPEG_MIME: &str = "image/jpeg";

/// Encode a frame as JPEG at `quality` (1-100).
///
/// # Errors
///
/// Returns an error if the encoder rejects the frame.
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut encoded = Vec::<u8>::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100));
    encoder
        .encode_image(frame)
        .map_err(|e| Error::ImageEncode(e.to_string()))?;
    Ok(encoded)
}

/// Encode a frame as a `data:image/jpeg;base64,...` URI.
///
/// # Errors
///
/// Returns an error if the encoder rejects the frame.
pub fn encode_jpeg_data_url(frame: &RgbImage, quality: u8) -> Result<String> {
    let bytes = encode_jpeg(frame, quality)?;
    Ok(to_data_url(JPEG_MIME, &bytes))
}

/// Build a base64 data URI.
#[must_use]
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))
}

/// Split a base64 data URI into its MIME type and decoded bytes.
///
/// Returns `None` for anything that is not a well-formed base64 data URI.
#[must_use]
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = BASE64_STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// File extension conventionally used for a MIME type.
#[must_use]
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        })
    }

    #[test]
    fn test_encode_jpeg_produces_jpeg() {
        let bytes = encode_jpeg(&gradient(32, 24), 80).unwrap();
        // SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let frame = gradient(64, 64);
        let high = encode_jpeg(&frame, 95).unwrap();
        let low = encode_jpeg(&frame, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_data_url_prefix() {
        let url = encode_jpeg_data_url(&gradient(8, 8), 80).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[test]
    fn test_decode_data_url() {
        let url = to_data_url("image/png", b"abc");
        assert_eq!(url, "data:image/png;base64,YWJj");

        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn test_decode_data_url_rejects_garbage() {
        assert!(decode_data_url("http://example.com/x.jpg").is_none());
        assert!(decode_data_url("data:image/jpeg,rawtext").is_none());
        assert!(decode_data_url("data:image/jpeg;base64,@@@").is_none());
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("application/octet-stream"), "jpg");
    }
}
