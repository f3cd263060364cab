use image::{Rgb, RgbImage};

use crate::error::{Result, SimError};
use crate::sensor::BitDepth;
use crate::sensor::adc::PixelBuffer;

/// Interleaved three-channel image `[R, G, B, R, G, B, ...]` stored at the
/// precision of the sensor it was reconstructed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorImage {
    width: usize,
    height: usize,
    bit_depth: BitDepth,
    data: PixelBuffer,
}

impl ColorImage {
    pub(crate) fn new(
        width: usize,
        height: usize,
        bit_depth: BitDepth,
        data: PixelBuffer,
    ) -> Result<Self> {
        if data.len() != 3 * width * height {
            return Err(SimError::InvalidBuffer {
                expected: 3 * width * height,
                got: data.len(),
            });
        }
        debug_assert_eq!(data.storage(), bit_depth.storage());
        Ok(Self {
            width,
            height,
            bit_depth,
            data,
        })
    }

    /// Quantize per-pixel RGB triples into storage for `bit_depth`.
    pub fn from_rgb(width: usize, height: usize, bit_depth: BitDepth, rgb: &[[f64; 3]]) -> Result<Self> {
        if rgb.len() != width * height {
            return Err(SimError::InvalidBuffer {
                expected: width * height,
                got: rgb.len(),
            });
        }
        let flat: Vec<f64> = rgb.iter().flatten().copied().collect();
        Self::new(width, height, bit_depth, PixelBuffer::from_f64(bit_depth, &flat))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn data(&self) -> &PixelBuffer {
        &self.data
    }

    pub fn pixel(&self, row: usize, col: usize) -> [f64; 3] {
        let base = 3 * (row * self.width + col);
        [
            self.data.get(base),
            self.data.get(base + 1),
            self.data.get(base + 2),
        ]
    }

    pub fn to_rgb_f64(&self) -> Vec<[f64; 3]> {
        self.data
            .to_f64()
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect()
    }

    /// Mean over all three channels of one row.
    pub fn row_mean(&self, row: usize) -> f64 {
        let sum: f64 = (0..self.width)
            .flat_map(|col| self.pixel(row, col))
            .sum();
        sum / (3 * self.width).max(1) as f64
    }

    /// 8-bit preview. Deeper images are stretched so their maximum maps
    /// to 255.
    pub fn to_rgb8(&self) -> RgbImage {
        let scale = if self.bit_depth == BitDepth::Eight {
            1.0
        } else {
            let max = self.data.max_value();
            if max > 0.0 { 255.0 / max } else { 0.0 }
        };
        let mut out = RgbImage::new(self.width as u32, self.height as u32);
        for row in 0..self.height {
            for col in 0..self.width {
                let [r, g, b] = self.pixel(row, col);
                let to_u8 = |v: f64| (v * scale).round().clamp(0.0, 255.0) as u8;
                out.put_pixel(col as u32, row as u32, Rgb([to_u8(r), to_u8(g), to_u8(b)]));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizes_to_depth() {
        let img = ColorImage::from_rgb(2, 1, BitDepth::Eight, &[[10.4, 300.0, -2.0], [1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(img.pixel(0, 0), [10.0, 255.0, 0.0]);
        assert_eq!(img.pixel(0, 1), [1.0, 2.0, 3.0]);
        assert_eq!(img.row_mean(0), (10.0 + 255.0 + 1.0 + 2.0 + 3.0) / 6.0);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(ColorImage::from_rgb(2, 2, BitDepth::Sixteen, &[[0.0; 3]; 3]).is_err());
        assert!(ColorImage::new(1, 1, BitDepth::Eight, PixelBuffer::U8(vec![0; 4])).is_err());
    }

    #[test]
    fn preview_stretches_deep_images() {
        let img = ColorImage::from_rgb(1, 2, BitDepth::Sixteen, &[[1000.0, 500.0, 0.0], [0.0; 3]]).unwrap();
        let preview = img.to_rgb8();
        assert_eq!(preview.get_pixel(0, 0).0, [255, 128, 0]);
        assert_eq!(preview.get_pixel(0, 1).0, [0, 0, 0]);
    }
}
