//! Image cleanup ahead of OCR.
//!
//! Always the same three steps, in order: single-channel grayscale, a 3x3
//! median filter to knock out speckle noise, then a fixed 2x contrast boost.
//! Output dimensions always match the input.

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, Luma};

/// Contrast multiplier applied after denoising.
pub const CONTRAST_FACTOR: f32 = 2.0;

/// Decode `bytes` and run the full preprocessing pipeline.
pub fn preprocess_bytes(bytes: &[u8]) -> Result<GrayImage> {
    let image = image::load_from_memory(bytes).context("failed to decode image for OCR")?;
    Ok(preprocess(&image))
}

/// Grayscale, denoise, and boost contrast.
pub fn preprocess(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let denoised = median_filter(&gray);
    enhance_contrast(&denoised, CONTRAST_FACTOR)
}

/// 3x3 median filter. Pixels past the border are clamped to the nearest edge.
pub fn median_filter(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);
    let mut window = [0u8; 9];

    for y in 0..height {
        for x in 0..width {
            let mut i = 0;
            for dy in [-1i64, 0, 1] {
                for dx in [-1i64, 0, 1] {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    window[i] = image.get_pixel(sx, sy)[0];
                    i += 1;
                }
            }
            window.sort_unstable();
            out.put_pixel(x, y, Luma([window[4]]));
        }
    }

    out
}

/// Scale each pixel's distance from the mean luminance by `factor`.
///
/// `factor` 1.0 is the identity, 0.0 flattens the image to its mean.
pub fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let pixel_count = image.as_raw().len() as u64;
    if pixel_count == 0 {
        return image.clone();
    }

    let sum: u64 = image.as_raw().iter().map(|&p| p as u64).sum();
    let mean = ((sum as f64 / pixel_count as f64) + 0.5).floor() as f32;

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = mean + (pixel[0] as f32 - mean) * factor;
        pixel[0] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_output_is_gray_with_same_dimensions() {
        let image = RgbImage::from_fn(37, 11, |x, y| Rgb([(x * 7) as u8, (y * 20) as u8, 90]));
        let processed = preprocess_bytes(&encode_png(&image)).unwrap();
        assert_eq!(processed.dimensions(), (37, 11));
        // GrayImage is ImageBuffer<Luma<u8>>: one channel per pixel
        assert_eq!(processed.as_raw().len(), 37 * 11);
    }

    #[test]
    fn test_single_pixel_image() {
        let image = RgbImage::from_pixel(1, 1, Rgb([200, 200, 200]));
        let processed = preprocess_bytes(&encode_png(&image)).unwrap();
        assert_eq!(processed.dimensions(), (1, 1));
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        assert!(preprocess_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn test_median_removes_isolated_speck() {
        let mut image = GrayImage::from_pixel(5, 5, Luma([255]));
        image.put_pixel(2, 2, Luma([0]));
        let filtered = median_filter(&image);
        assert_eq!(filtered.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_median_keeps_solid_regions() {
        let image = GrayImage::from_fn(6, 6, |x, _| if x < 3 { Luma([0]) } else { Luma([255]) });
        let filtered = median_filter(&image);
        assert_eq!(filtered.get_pixel(0, 3)[0], 0);
        assert_eq!(filtered.get_pixel(5, 3)[0], 255);
    }

    #[test]
    fn test_contrast_doubles_distance_from_mean() {
        // mean of [100, 140] is 120
        let image = GrayImage::from_raw(2, 1, vec![100, 140]).unwrap();
        let enhanced = enhance_contrast(&image, CONTRAST_FACTOR);
        assert_eq!(enhanced.as_raw(), &vec![80, 160]);
    }

    #[test]
    fn test_contrast_clamps_to_byte_range() {
        let image = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let enhanced = enhance_contrast(&image, 4.0);
        assert_eq!(enhanced.as_raw(), &vec![0, 255]);
    }

    #[test]
    fn test_contrast_identity_factor() {
        let image = GrayImage::from_raw(3, 1, vec![10, 50, 200]).unwrap();
        assert_eq!(enhance_contrast(&image, 1.0), image);
    }
}
