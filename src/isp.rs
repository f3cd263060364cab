//! Post-reconstruction corrections. Each filter is stateless and returns
//! a new image at the input's bit depth.

use crate::color::ColorImage;
use crate::error::{Result, SimError};
use crate::scene::Scene;
use crate::sensor::optics::reflect_101;

/// Multiply each channel by its gain.
pub fn white_balance(img: &ColorImage, gains: [f64; 3]) -> Result<ColorImage> {
    let mut rgb = img.to_rgb_f64();
    for pixel in rgb.iter_mut() {
        for c in 0..3 {
            pixel[c] *= gains[c];
        }
    }
    rebuild(img, &rgb)
}

/// Stretch each channel so its `percent` low and high tails map to
/// 0 and full scale.
pub fn auto_white_balance(img: &ColorImage, percent: f64) -> Result<ColorImage> {
    let full_scale = img.bit_depth().full_scale();
    let mut rgb = img.to_rgb_f64();
    if rgb.is_empty() {
        return rebuild(img, &rgb);
    }
    let tail = (percent.clamp(0.0, 49.0) / 100.0 * rgb.len() as f64) as usize;

    for c in 0..3 {
        let mut values: Vec<f64> = rgb.iter().map(|p| p[c]).collect();
        values.sort_by(f64::total_cmp);
        let low = values[tail];
        let high = values[values.len() - 1 - tail];
        if high <= low {
            continue;
        }
        let gain = full_scale / (high - low);
        for pixel in rgb.iter_mut() {
            pixel[c] = (pixel[c] - low) * gain;
        }
    }
    rebuild(img, &rgb)
}

/// 3x3 per-channel median.
pub fn denoise(img: &ColorImage) -> Result<ColorImage> {
    let (w, h) = (img.width(), img.height());
    let src = img.to_rgb_f64();
    let mut out = vec![[0.0f64; 3]; w * h];
    let mut window = [0.0f64; 9];

    for row in 0..h {
        for col in 0..w {
            for c in 0..3 {
                let mut n = 0;
                for dy in -1..=1isize {
                    for dx in -1..=1isize {
                        let y = reflect_101(row as isize + dy, h);
                        let x = reflect_101(col as isize + dx, w);
                        window[n] = src[y * w + x][c];
                        n += 1;
                    }
                }
                window.sort_by(f64::total_cmp);
                out[row * w + col][c] = window[4];
            }
        }
    }
    rebuild(img, &out)
}

/// Subtract a constant pedestal from every sample.
pub fn black_level_compensation(img: &ColorImage, black_level: f64) -> Result<ColorImage> {
    let mut rgb = img.to_rgb_f64();
    for pixel in rgb.iter_mut() {
        for v in pixel.iter_mut() {
            *v -= black_level;
        }
    }
    rebuild(img, &rgb)
}

/// Divide by a per-pixel shading gain map. Zero gain yields zero.
pub fn lens_shading_correction(img: &ColorImage, shading: &Scene) -> Result<ColorImage> {
    if shading.width() != img.width() || shading.height() != img.height() {
        return Err(SimError::DimensionMismatch {
            expected_width: img.width(),
            expected_height: img.height(),
            width: shading.width(),
            height: shading.height(),
        });
    }
    let mut rgb = img.to_rgb_f64();
    for (pixel, &gain) in rgb.iter_mut().zip(shading.data()) {
        for v in pixel.iter_mut() {
            *v = if gain == 0.0 { 0.0 } else { *v / gain };
        }
    }
    rebuild(img, &rgb)
}

fn rebuild(img: &ColorImage, rgb: &[[f64; 3]]) -> Result<ColorImage> {
    ColorImage::from_rgb(img.width(), img.height(), img.bit_depth(), rgb)
}
