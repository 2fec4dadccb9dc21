//! Cosmetic beauty filter for output frames.
//!
//! Three fixed stages, each a pure function of the previous stage's output:
//!
//! 1. Edge-preserving bilateral smoothing (skin texture down, edges kept).
//! 2. Linear contrast/brightness: `out = clamp(in * alpha + beta, 0, 255)`.
//! 3. Saturation boost in HSV space, saturation clamped to `[0, 1]`.
//!
//! The pipeline never sees detection state and runs on its own copy of the
//! frame, so it can be disabled or run in parallel without changing what
//! the detector decides.

use handsoff_common::config::BeautyConfig;
use handsoff_pose_model::source::Frame;
use image::Rgb;

/// Stateless `Frame -> Frame` transform.
#[derive(Debug, Clone)]
pub struct BeautyFilterPipeline {
    config: BeautyConfig,
    spatial_kernel: Vec<f64>,
    color_weights: Vec<f64>,
}

impl BeautyFilterPipeline {
    pub fn new(config: BeautyConfig) -> Self {
        let radius = (config.diameter.max(1) / 2) as i64;
        let side = (2 * radius + 1) as usize;

        let space_coeff = -0.5 / (config.sigma_space * config.sigma_space);
        let mut spatial_kernel = Vec::with_capacity(side * side);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let r2 = (dx * dx + dy * dy) as f64;
                // Circular neighbourhood.
                if r2 > (radius * radius) as f64 {
                    spatial_kernel.push(0.0);
                } else {
                    spatial_kernel.push((r2 * space_coeff).exp());
                }
            }
        }

        // Range weights indexed by the L1 color difference (0..=765).
        let color_coeff = -0.5 / (config.sigma_color * config.sigma_color);
        let color_weights = (0..=255 * 3)
            .map(|d| {
                let d = d as f64;
                (d * d * color_coeff).exp()
            })
            .collect();

        Self {
            config,
            spatial_kernel,
            color_weights,
        }
    }

    pub fn config(&self) -> &BeautyConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Apply the pipeline, or return an unmodified copy when disabled.
    pub fn apply(&self, frame: &Frame) -> Frame {
        if !self.config.enabled {
            return frame.clone();
        }
        let mut out = self.bilateral(frame);
        adjust_contrast_brightness(&mut out, self.config.alpha, self.config.beta);
        boost_saturation(&mut out, self.config.saturation);
        out
    }

    /// Stage 1: bilateral filter with replicated borders.
    pub fn bilateral(&self, frame: &Frame) -> Frame {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return frame.clone();
        }
        let radius = (self.config.diameter.max(1) / 2) as i64;
        let side = (2 * radius + 1) as usize;
        let max_x = width as i64 - 1;
        let max_y = height as i64 - 1;

        Frame::from_fn(width, height, |x, y| {
            let center = frame.get_pixel(x, y).0;
            let mut sum = [0.0f64; 3];
            let mut weight_sum = 0.0;

            for (ky, dy) in (-radius..=radius).enumerate() {
                let sy = (y as i64 + dy).clamp(0, max_y) as u32;
                for (kx, dx) in (-radius..=radius).enumerate() {
                    let spatial = self.spatial_kernel[ky * side + kx];
                    if spatial == 0.0 {
                        continue;
                    }
                    let sx = (x as i64 + dx).clamp(0, max_x) as u32;
                    let sample = frame.get_pixel(sx, sy).0;
                    let diff = center
                        .iter()
                        .zip(sample.iter())
                        .map(|(a, b)| (*a as i32 - *b as i32).unsigned_abs() as usize)
                        .sum::<usize>();
                    let w = spatial * self.color_weights[diff];
                    for c in 0..3 {
                        sum[c] += sample[c] as f64 * w;
                    }
                    weight_sum += w;
                }
            }

            Rgb(sum.map(|s| to_channel(s / weight_sum)))
        })
    }
}

/// Stage 2: `out = clamp(in * alpha + beta, 0, 255)`, rounded.
pub fn adjust_contrast_brightness(frame: &mut Frame, alpha: f64, beta: f64) {
    for pixel in frame.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = to_channel(*channel as f64 * alpha + beta);
        }
    }
}

/// Stage 3: scale HSV saturation by `factor`, clamped to the valid range.
pub fn boost_saturation(frame: &mut Frame, factor: f64) {
    for pixel in frame.pixels_mut() {
        let (h, s, v) = rgb_to_hsv(pixel.0);
        pixel.0 = hsv_to_rgb(h, (s * factor).clamp(0.0, 1.0), v);
    }
}

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// RGB bytes to (hue degrees `[0, 360)`, saturation `[0, 1]`, value `[0, 1]`).
pub fn rgb_to_hsv(rgb: [u8; 3]) -> (f64, f64, f64) {
    let [r, g, b] = rgb.map(|c| c as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let hue = if chroma == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / chroma + 2.0)
    } else {
        60.0 * ((r - g) / chroma + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { chroma / max };

    (hue, saturation, max)
}

/// Inverse of [`rgb_to_hsv`].
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [u8; 3] {
    let chroma = value * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    [r, g, b].map(|c| to_channel((c + m) * 255.0))
}
