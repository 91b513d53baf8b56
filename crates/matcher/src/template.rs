//! Image decoding and ridge-field templates.
//!
//! A template is the block-wise ridge field of a grayscale fingerprint
//! image. Each block stores its dominant ridge direction as a doubled-angle
//! unit vector (so 0° and 180° coincide), the coherence of the local
//! gradients and the local ridge period. Blocks with too little contrast or
//! no dominant direction are background and carry no feature.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{GrayImage, ImageError, ImageReader, Limits};

use crate::types::{MatchError, MatcherConfig, Side};

/// Shortest and longest ridge period a block can report, in pixels.
const MIN_PERIOD: f32 = 4.0;
const MAX_PERIOD: f32 = 32.0;

/// Relative period difference at which period agreement falls to `1/e`.
const PERIOD_TOLERANCE: f32 = 0.25;

/// Exponent applied to orientation agreement; higher is stricter.
const ORIENTATION_SHARPNESS: i32 = 4;

/// A decoded grayscale image normalized to the template resolution.
#[derive(Debug, Clone)]
pub struct FingerprintImage {
    pixels: GrayImage,
}

impl FingerprintImage {
    /// Decode `bytes` (PNG, JPEG, BMP or WebP) and rescale it from
    /// `cfg.dpi` to [`crate::TEMPLATE_DPI`].
    ///
    /// Images wider or taller than `cfg.max_image_dimension` are refused from
    /// their header, before pixel data is decoded.
    pub fn decode(bytes: &[u8], side: Side, cfg: &MatcherConfig) -> Result<Self, MatchError> {
        if bytes.is_empty() {
            return Err(MatchError::EmptyImage { side });
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| MatchError::Decode {
                side,
                reason: err.to_string(),
            })?;

        let mut limits = Limits::default();
        limits.max_image_width = Some(cfg.max_image_dimension);
        limits.max_image_height = Some(cfg.max_image_dimension);
        reader.limits(limits);

        let decoded = reader.decode().map_err(|err| match err {
            ImageError::Limits(_) => MatchError::ImageTooLarge {
                side,
                max: cfg.max_image_dimension,
            },
            other => MatchError::Decode {
                side,
                reason: other.to_string(),
            },
        })?;
        let mut pixels = decoded.to_luma8();

        let scale = cfg.scale();
        if (scale - 1.0).abs() > f64::EPSILON {
            let width = scaled_dimension(pixels.width(), scale);
            let height = scaled_dimension(pixels.height(), scale);
            pixels = image::imageops::resize(&pixels, width, height, FilterType::Triangle);
        }

        let min = cfg.block_size * 2;
        if pixels.width() < min || pixels.height() < min {
            return Err(MatchError::ImageTooSmall {
                side,
                width: pixels.width(),
                height: pixels.height(),
                min,
            });
        }

        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }
}

fn scaled_dimension(value: u32, scale: f64) -> u32 {
    (f64::from(value) * scale).round().max(1.0) as u32
}

/// Ridge feature of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFeature {
    /// Cosine of twice the ridge angle.
    pub cos2: f32,
    /// Sine of twice the ridge angle.
    pub sin2: f32,
    /// Gradient coherence in `[0, 1]`; 1 means perfectly parallel ridges.
    pub coherence: f32,
    /// Distance between neighbouring ridges, in pixels.
    pub period: f32,
}

impl BlockFeature {
    /// Cosine of the doubled angle between two ridge directions.
    ///
    /// 1 for parallel ridges, -1 for perpendicular ones.
    pub fn agreement(&self, other: &BlockFeature) -> f32 {
        self.cos2 * other.cos2 + self.sin2 * other.sin2
    }

    /// Gaussian agreement of the two ridge periods, 1 when equal.
    pub fn period_agreement(&self, other: &BlockFeature) -> f32 {
        let mean = (self.period + other.period) / 2.0;
        let relative = (self.period - other.period).abs() / mean / PERIOD_TOLERANCE;
        (-relative * relative).exp()
    }

    /// Combined similarity in `[0, 1]` of two blocks' ridge structure.
    pub fn similarity(&self, other: &BlockFeature) -> f32 {
        self.agreement(other).max(0.0).powi(ORIENTATION_SHARPNESS) * self.period_agreement(other)
    }
}

/// Block-wise ridge field of one fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintTemplate {
    cols: usize,
    rows: usize,
    blocks: Vec<Option<BlockFeature>>,
    ridge_blocks: usize,
}

impl FingerprintTemplate {
    /// Extract the ridge field of `image`.
    ///
    /// Fails with [`MatchError::NoRidgeArea`] when no block passes the
    /// variance and coherence gates.
    pub fn new(
        image: &FingerprintImage,
        side: Side,
        cfg: &MatcherConfig,
    ) -> Result<Self, MatchError> {
        let gray = image.as_gray();
        let bs = cfg.block_size;
        let cols = (image.width() / bs) as usize;
        let rows = (image.height() / bs) as usize;

        let mut blocks = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                blocks.push(block_feature(gray, col as u32 * bs, row as u32 * bs, cfg));
            }
        }

        let ridge_blocks = blocks.iter().filter(|b| b.is_some()).count();
        if ridge_blocks == 0 {
            return Err(MatchError::NoRidgeArea { side });
        }

        Ok(Self {
            cols,
            rows,
            blocks,
            ridge_blocks,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of blocks classified as ridge area.
    pub fn ridge_blocks(&self) -> usize {
        self.ridge_blocks
    }

    /// Feature at `(col, row)`; `None` for background or out-of-range blocks.
    pub fn block(&self, col: i64, row: i64) -> Option<&BlockFeature> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        self.blocks[row as usize * self.cols + col as usize].as_ref()
    }
}

/// Ridge feature of the block at `(x0, y0)`.
///
/// Statistics are taken over the block widened by half a block on each side,
/// clamped to the image.
fn block_feature(gray: &GrayImage, x0: u32, y0: u32, cfg: &MatcherConfig) -> Option<BlockFeature> {
    let (width, height) = gray.dimensions();
    let bs = cfg.block_size;
    let margin = bs / 2;
    let xs = x0.saturating_sub(margin)..(x0 + bs + margin).min(width);
    let ys = y0.saturating_sub(margin)..(y0 + bs + margin).min(height);

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in ys.clone() {
        for x in xs.clone() {
            let v = f64::from(gray.get_pixel(x, y).0[0]);
            sum += v;
            sum_sq += v * v;
        }
    }

    let n = (xs.len() * ys.len()) as f64;
    let mean = sum / n;
    let variance = sum_sq / n - mean * mean;
    if variance < f64::from(cfg.min_variance) {
        return None;
    }

    let mut gxx = 0.0f64;
    let mut gyy = 0.0f64;
    let mut gxy = 0.0f64;
    let mut samples = 0usize;
    for y in ys.clone() {
        for x in xs.clone() {
            if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
                continue;
            }
            let (gx, gy) = sobel(gray, x, y);
            gxx += gx * gx;
            gyy += gy * gy;
            gxy += gx * gy;
            samples += 1;
        }
    }

    let energy = gxx + gyy;
    let a = gxx - gyy;
    let b = 2.0 * gxy;
    let norm = (a * a + b * b).sqrt();
    if samples == 0 || energy <= f64::EPSILON || norm <= f64::EPSILON {
        return None;
    }

    let coherence = norm / energy;
    if coherence < f64::from(cfg.min_coherence) {
        return None;
    }

    // Ridges run perpendicular to the gradient, which negates the doubled-angle vector.
    Some(BlockFeature {
        cos2: (-a / norm) as f32,
        sin2: (-b / norm) as f32,
        coherence: coherence as f32,
        period: ridge_period(energy / samples as f64, variance),
    })
}

/// Ridge period from mean squared gradient and grey-level variance.
///
/// For a sinusoid of angular frequency `w` the Sobel gradient has RMS
/// `8 sin(w)` times the intensity RMS, so `w = asin(ratio / 8)`.
fn ridge_period(mean_sq_gradient: f64, variance: f64) -> f32 {
    let ratio = (mean_sq_gradient / variance).sqrt() / 8.0;
    let omega = ratio.clamp(0.0, 1.0).asin();
    if omega <= f64::EPSILON {
        return MAX_PERIOD;
    }
    ((2.0 * std::f64::consts::PI / omega) as f32).clamp(MIN_PERIOD, MAX_PERIOD)
}

fn sobel(gray: &GrayImage, x: u32, y: u32) -> (f64, f64) {
    let p = |dx: i32, dy: i32| {
        let px = (x as i32 + dx) as u32;
        let py = (y as i32 + dy) as u32;
        f64::from(gray.get_pixel(px, py).0[0])
    };

    let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
    let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
    (gx, gy)
}
