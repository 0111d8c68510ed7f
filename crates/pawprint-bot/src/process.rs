//! Photo processing: center-crop to a square and encode the JPEG artifact.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::BotResult;

/// Side length of the posted artifact in pixels.
pub const TARGET_SIZE: u32 = 1080;

/// JPEG quality of the posted artifact.
pub const JPEG_QUALITY: u8 = 92;

/// Center-crop `img` to a square and resize it to `size` per side.
pub fn square_image(img: &DynamicImage, size: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let side = w.min(h);
    let left = (w - side) / 2;
    let top = (h - side) / 2;
    img.crop_imm(left, top, side, side)
        .resize_exact(size, size, FilterType::Lanczos3)
}

/// Encode `img` as a JPEG at [`JPEG_QUALITY`].
pub fn encode_jpeg(img: &DynamicImage) -> BotResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

/// Decode raw bytes, square them to `size`, and write the JPEG artifact to
/// `path`. Returns the processed raster for further use.
///
/// The source is flattened to RGB first; photos occasionally arrive as PNG
/// with an alpha channel, which the JPEG encoder rejects.
pub fn make_square_jpeg(bytes: &[u8], path: &Path, size: u32) -> BotResult<DynamicImage> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let squared = square_image(&rgb, size);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, encode_jpeg(&squared)?)?;
    Ok(squared)
}
