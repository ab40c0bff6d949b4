//! Image preparation for OCR: decode, flatten to RGB, downscale, PNG-encode.
//!
//! Phone photos of worksheets arrive as multi-megabyte JPEGs, sometimes with
//! an alpha channel or in palette mode. OCR services cap upload size and read
//! printed text just as well at 2000 px, so every image is normalised to an
//! RGB PNG whose longest side is at most `max_side` before it leaves the
//! machine. PNG is lossless; JPEG artefacts around glyph edges hurt OCR.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Decode `bytes`, convert to RGB8, shrink so neither side exceeds `max_side`
/// (never enlarging), and return PNG bytes.
pub fn prepare_for_ocr(bytes: &[u8], max_side: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let (w, h) = (rgb.width(), rgb.height());

    let rgb = match scaled_dimensions(w, h, max_side) {
        Some((nw, nh)) => {
            debug!("Downscaling OCR image {}x{} → {}x{}", w, h, nw, nh);
            rgb.resize_exact(nw, nh, FilterType::Lanczos3)
        }
        None => rgb,
    };

    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!("Prepared OCR image → {} bytes PNG", buf.len());
    Ok(buf)
}

/// Target size when the longest side exceeds `max_side`, else `None`.
fn scaled_dimensions(w: u32, h: u32, max_side: u32) -> Option<(u32, u32)> {
    let longest = w.max(h);
    if longest <= max_side || longest == 0 {
        return None;
    }
    let scale = max_side as f64 / longest as f64;
    let nw = ((w as f64 * scale) as u32).max(1);
    let nh = ((h as f64 * scale) as u32).max(1);
    Some((nw, nh))
}

/// Wrap prepared PNG bytes for a multimodal chat request.
///
/// `detail: "high"` keeps small print legible to GPT-4-class models.
pub fn to_image_data(png: &[u8]) -> ImageData {
    ImageData::new(STANDARD.encode(png), "image/png").with_detail("high")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_of(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 128])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn small_image_keeps_size_and_drops_alpha() {
        let out = prepare_for_ocr(&png_of(40, 20), 2000).expect("prepare");
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn large_image_is_downscaled() {
        let out = prepare_for_ocr(&png_of(400, 100), 200).expect("prepare");
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 50));
    }

    #[test]
    fn garbage_bytes_fail() {
        assert!(prepare_for_ocr(b"not an image", 2000).is_err());
    }

    #[test]
    fn scaled_dimensions_rules() {
        assert_eq!(scaled_dimensions(100, 50, 200), None);
        assert_eq!(scaled_dimensions(4000, 3000, 2000), Some((2000, 1500)));
        assert_eq!(scaled_dimensions(10, 5000, 1000), Some((2, 1000)));
    }

    #[test]
    fn image_data_is_base64_png() {
        let data = to_image_data(&png_of(4, 4));
        assert_eq!(data.mime_type, "image/png");
        assert!(STANDARD.decode(&data.data).is_ok());
    }
}
