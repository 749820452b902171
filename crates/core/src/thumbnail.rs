//! Gallery thumbnail derivation.
//!
//! Thumbnails are a fixed square, filled and center-cropped (never
//! letterboxed), and always re-encoded as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::CoreError;

/// Edge length of the square thumbnail, in pixels.
pub const THUMBNAIL_SIZE: u32 = 300;

/// JPEG quality used for thumbnails.
pub const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// Decode `image_bytes` and produce the JPEG thumbnail bytes.
///
/// Deterministic: identical input yields identical output.
pub fn derive_thumbnail(image_bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let img = image::load_from_memory(image_bytes)?;
    let filled = img.resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(filled.to_rgb8());

    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(
        &mut out,
        THUMBNAIL_JPEG_QUALITY,
    ))?;
    Ok(out)
}
