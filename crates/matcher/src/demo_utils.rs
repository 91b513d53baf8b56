//! Synthetic fingerprint images for tests and demos.

use std::f64::consts::PI;
use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};

/// Parallel sinusoidal ridges running at `angle_deg`, `period` pixels apart.
///
/// A 9px period matches typical ridge spacing at 500 DPI.
pub fn ridge_pattern(width: u32, height: u32, angle_deg: f64, period: f64) -> GrayImage {
    let angle = angle_deg.to_radians();
    let (sin, cos) = angle.sin_cos();
    GrayImage::from_fn(width, height, |x, y| {
        let phase = 2.0 * PI * (f64::from(x) * cos + f64::from(y) * sin) / period;
        Luma([(128.0 + 100.0 * phase.sin()).round() as u8])
    })
}

/// Concentric ridges around the image centre, a crude whorl.
pub fn whorl_pattern(width: u32, height: u32, period: f64) -> GrayImage {
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    GrayImage::from_fn(width, height, |x, y| {
        let r = (f64::from(x) - cx).hypot(f64::from(y) - cy);
        Luma([(128.0 + 100.0 * (2.0 * PI * r / period).sin()).round() as u8])
    })
}

/// Uniform image with no ridge structure at all.
pub fn flat_image(width: u32, height: u32, level: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([level]))
}

/// Encode `image` as PNG bytes.
pub fn encode_png(image: &GrayImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

/// Encode `image` as BMP bytes.
pub fn encode_bmp(image: &GrayImage) -> Vec<u8> {
    encode(image, ImageFormat::Bmp)
}

fn encode(image: &GrayImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    if let Err(err) = image.write_to(&mut Cursor::new(&mut bytes), format) {
        panic!("failed to encode demo image as {format:?}: {err}");
    }
    bytes
}

/// Default-sized synthetic probe: vertical ridges at 500 DPI spacing.
pub fn demo_fingerprint_png() -> Vec<u8> {
    encode_png(&ridge_pattern(256, 320, 0.0, 9.0))
}
