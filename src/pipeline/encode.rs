//! Image encoding: `DynamicImage` → base64 PNG wrapped in [`PageImage`].
//!
//! The Messages API accepts images as base64 blocks in the JSON request body.
//! PNG is chosen over JPEG because it is lossless — text crispness matters
//! far more than payload size for transcription accuracy.

use crate::provider::PageImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as a base64 PNG ready for the API request.
pub fn encode_page(img: &DynamicImage) -> Result<PageImage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page image → {} bytes base64", b64.len());

    Ok(PageImage {
        data: b64,
        media_type: "image/png".to_string(),
    })
}
