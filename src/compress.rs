//! Image shrinking applied to attachments before upload.

use std::io::Cursor;

use anyhow::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Longest edge allowed after shrinking, in pixels.
const MAX_DIMENSION: u32 = 1600;
/// Quality used for the normalized JPEG re-encode.
const JPEG_QUALITY: u8 = 70;

/// Bytes and MIME type of an attachment after the compressor ran.
#[derive(Debug)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Shrink an attachment when it is an image; pass anything else through.
///
/// Images are decoded, proportionally downscaled so neither edge exceeds
/// 1600 px (never upscaled) and re-encoded as JPEG at quality 70. The
/// original bytes are kept whenever the re-encode is not strictly smaller,
/// and any decode or encode failure also falls back to the original, so this
/// step never grows the payload and never corrupts an attachment.
pub fn shrink(bytes: Vec<u8>, mime_type: &str) -> Compressed {
    if !mime_type.starts_with("image/") {
        return Compressed {
            bytes,
            mime_type: mime_type.to_string(),
        };
    }

    match reencode_smaller(&bytes) {
        Ok(jpeg) if jpeg.len() < bytes.len() => Compressed {
            bytes: jpeg,
            // The payload is normalized to JPEG; the file keeps its name.
            mime_type: "image/jpeg".to_string(),
        },
        _ => Compressed {
            bytes,
            mime_type: mime_type.to_string(),
        },
    }
}

/// Decode, downscale and re-encode one image.
fn reencode_smaller(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;

    // Only downscale; images already inside the bounds keep their size.
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let mut buf = Cursor::new(Vec::new());
    // to_rgb8 drops any alpha channel, which JPEG cannot carry anyway.
    img.to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic high-entropy PNG; noise keeps PNG large so the JPEG
    /// re-encode reliably wins.
    fn noise_png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(w, h, |x, y| {
            let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
            image::Rgb([(v >> 3) as u8, (v >> 11) as u8, (v >> 19) as u8])
        });
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_non_image_passes_through_unchanged() {
        let bytes = b"%PDF-1.7 not really a pdf".to_vec();
        let out = shrink(bytes.clone(), "application/pdf");
        assert_eq!(out.bytes, bytes);
        assert_eq!(out.mime_type, "application/pdf");
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let original = noise_png(3200, 50);
        let out = shrink(original.clone(), "image/png");
        assert!(out.bytes.len() < original.len());
        assert_eq!(out.mime_type, "image/jpeg");

        let img = image::load_from_memory(&out.bytes).unwrap();
        // Proportional fit inside 1600×1600: 3200×50 becomes 1600×25.
        assert_eq!((img.width(), img.height()), (1600, 25));
    }

    #[test]
    fn test_small_image_is_never_upscaled() {
        let original = noise_png(100, 80);
        let out = shrink(original.clone(), "image/png");
        // Size may only shrink, dimensions must stay put.
        assert!(out.bytes.len() <= original.len());
        let img = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (100, 80));
    }

    #[test]
    fn test_reencode_that_grows_keeps_original() {
        // A 1×1 flat PNG is far below JPEG's fixed header cost.
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([8, 8, 8]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        let original = buf.into_inner();

        let out = shrink(original.clone(), "image/png");
        assert_eq!(out.bytes, original);
        assert_eq!(out.mime_type, "image/png");
    }

    #[test]
    fn test_undecodable_image_falls_back_to_original() {
        let bytes = b"detta ar inte en bild".to_vec();
        let out = shrink(bytes.clone(), "image/png");
        assert_eq!(out.bytes, bytes);
        assert_eq!(out.mime_type, "image/png");
    }
}
