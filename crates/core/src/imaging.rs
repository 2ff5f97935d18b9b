//! Upload constraints and image processing.
//!
//! Uploaded images are decoded, scaled down to fit a per-kind bounding box
//! (never enlarged), and re-encoded in their original format. JPEG output
//! carries a per-kind quality setting; the other formats keep their native
//! encoding parameters.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::CoreError;

/// Maximum accepted image upload size (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum accepted PDF upload size (20 MiB).
pub const MAX_PDF_BYTES: usize = 20 * 1024 * 1024;

/// Extensions accepted for category images.
pub const CATEGORY_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// Extensions accepted for project main/gallery images.
pub const PROJECT_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Extensions accepted for sponsor logos. SVG logos are stored verbatim.
pub const SPONSOR_LOGO_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "svg", "webp"];

/// Bounding box plus JPEG quality for one image kind.
#[derive(Debug, Clone, Copy)]
pub struct ResizeSpec {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

/// Category tile image: fit 800x600.
pub const CATEGORY_IMAGE: ResizeSpec = ResizeSpec {
    max_width: 800,
    max_height: 600,
    jpeg_quality: 85,
};

/// Project main image: near-lossless, capped at 4000px.
pub const PROJECT_MAIN_IMAGE: ResizeSpec = ResizeSpec {
    max_width: 4000,
    max_height: 4000,
    jpeg_quality: 95,
};

/// Gallery full-resolution variant.
pub const GALLERY_FULL: ResizeSpec = ResizeSpec {
    max_width: 2000,
    max_height: 2000,
    jpeg_quality: 90,
};

/// Gallery thumbnail variant.
pub const GALLERY_THUMB: ResizeSpec = ResizeSpec {
    max_width: 200,
    max_height: 200,
    jpeg_quality: 75,
};

/// Sponsor logo.
pub const SPONSOR_LOGO: ResizeSpec = ResizeSpec {
    max_width: 800,
    max_height: 800,
    jpeg_quality: 85,
};

pub fn is_allowed_extension(ext: &str, allowed: &[&str]) -> bool {
    allowed.contains(&ext)
}

/// Decode, scale down to fit `spec`, and re-encode in the format implied by
/// `ext`.
///
/// Images already inside the bounding box are re-encoded without resampling.
/// Undecodable input is a validation error, not an internal one: it means
/// the client sent a file that is not the image it claims to be.
pub fn process_image(bytes: &[u8], ext: &str, spec: &ResizeSpec) -> Result<Vec<u8>, CoreError> {
    let format = ImageFormat::from_extension(ext).ok_or_else(|| {
        CoreError::Validation(format!("Unsupported image extension '{ext}'."))
    })?;

    let img = image::load_from_memory(bytes)
        .map_err(|_| CoreError::Validation("The uploaded file is not a valid image.".into()))?;

    let img = scale_down(img, spec.max_width, spec.max_height);

    encode(&img, format, spec.jpeg_quality)
}

/// Fit within `max_width` x `max_height` preserving aspect ratio; images
/// already inside the box pass through untouched.
fn scale_down(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}

fn encode(img: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>, CoreError> {
    let mut cursor = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            let encoder = JpegEncoder::new_with_quality(&mut cursor, jpeg_quality);
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| CoreError::Internal(format!("Failed to encode image: {e}")))?;
        }
        other => {
            img.write_to(&mut cursor, other)
                .map_err(|e| CoreError::Internal(format!("Failed to encode image: {e}")))?;
        }
    }

    Ok(cursor.into_inner())
}
