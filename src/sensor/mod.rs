//! Quantized sensor model: capture, optical blur, read noise, color
//! filtering and demosaic reconstruction over a single owned grid.

pub mod adc;
pub mod noise;
pub mod optics;

use std::fmt;

use crate::color::demosaic::{self, DemosaicAlgo, DemosaicPrecision};
use crate::color::{ColorFilterArray, ColorImage, Orientation};
use crate::error::{Result, SimError};
use crate::scene::Scene;

use adc::{PixelBuffer, StorageKind, quantize};
use noise::NoiseSource;
use optics::Kernel;

/// Full-scale code used by every container wider than 8 bits, including
/// the float modes.
pub const WIDE_FULL_SCALE: f64 = 65535.0;

const INTERMEDIATE_FULL_SCALE: f64 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Ten,
    Twelve,
    Fourteen,
    Sixteen,
    Float32,
    Float64,
}

impl BitDepth {
    pub const ALL: &[BitDepth] = &[
        BitDepth::Eight,
        BitDepth::Ten,
        BitDepth::Twelve,
        BitDepth::Fourteen,
        BitDepth::Sixteen,
        BitDepth::Float32,
        BitDepth::Float64,
    ];

    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Ten => 10,
            BitDepth::Twelve => 12,
            BitDepth::Fourteen => 14,
            BitDepth::Sixteen => 16,
            BitDepth::Float32 => 32,
            BitDepth::Float64 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BitDepth::Eight => "8-bit",
            BitDepth::Ten => "10-bit",
            BitDepth::Twelve => "12-bit",
            BitDepth::Fourteen => "14-bit",
            BitDepth::Sixteen => "16-bit",
            BitDepth::Float32 => "32-bit float",
            BitDepth::Float64 => "64-bit float",
        }
    }

    /// 10 to 16 bit depths share one 16-bit container.
    pub fn storage(self) -> StorageKind {
        match self {
            BitDepth::Eight => StorageKind::U8,
            BitDepth::Ten | BitDepth::Twelve | BitDepth::Fourteen | BitDepth::Sixteen => {
                StorageKind::U16
            }
            BitDepth::Float32 => StorageKind::F32,
            BitDepth::Float64 => StorageKind::F64,
        }
    }

    pub fn full_scale(self) -> f64 {
        match self {
            BitDepth::Eight => INTERMEDIATE_FULL_SCALE,
            _ => WIDE_FULL_SCALE,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self.storage(), StorageKind::F32 | StorageKind::F64)
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = SimError;

    fn try_from(bits: u32) -> Result<Self> {
        BitDepth::ALL
            .iter()
            .copied()
            .find(|d| d.bits() == bits)
            .ok_or(SimError::UnsupportedBitDepth(bits))
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Last pipeline stage applied to the grid, in documented order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uninitialized,
    Captured,
    Blurred,
    Noisy,
    Filtered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconstructOptions {
    pub orientation: Orientation,
    pub algo: DemosaicAlgo,
    pub precision: DemosaicPrecision,
}

impl ReconstructOptions {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }
}

/// A `width` x `height` photosite grid at a fixed bit depth.
///
/// Not synchronized: one sensor belongs to one simulation.
#[derive(Debug, Clone)]
pub struct Sensor {
    width: usize,
    height: usize,
    bit_depth: BitDepth,
    grid: PixelBuffer,
    stage: Stage,
    noise: NoiseSource,
}

impl Sensor {
    /// Sensor with an OS-seeded noise generator.
    pub fn new(bit_depth: u32, width: usize, height: usize) -> Result<Self> {
        let depth = BitDepth::try_from(bit_depth)?;
        Ok(Self::with_depth(depth, width, height, NoiseSource::from_os()))
    }

    /// Sensor whose noise is reproducible from `seed`.
    pub fn with_seed(bit_depth: u32, width: usize, height: usize, seed: u64) -> Result<Self> {
        let depth = BitDepth::try_from(bit_depth)?;
        Ok(Self::with_depth(depth, width, height, NoiseSource::seeded(seed)))
    }

    pub fn with_depth(bit_depth: BitDepth, width: usize, height: usize, noise: NoiseSource) -> Self {
        log::debug!(
            "Sensor {width}x{height} at {bit_depth}, noise seed {:?}",
            noise.seed()
        );
        Self {
            width,
            height,
            bit_depth,
            grid: PixelBuffer::zeros(bit_depth, width * height),
            stage: Stage::Uninitialized,
            noise,
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.noise = NoiseSource::seeded(seed);
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

    pub fn full_scale(&self) -> f64 {
        self.bit_depth.full_scale()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn grid(&self) -> &PixelBuffer {
        &self.grid
    }

    pub fn value_at(&self, row: usize, col: usize) -> f64 {
        self.grid.get(row * self.width + col)
    }

    /// Replace the grid with `scene` scaled to full scale and quantized.
    pub fn capture(&mut self, scene: &Scene) -> Result<()> {
        if scene.width() != self.width || scene.height() != self.height {
            return Err(SimError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: scene.width(),
                height: scene.height(),
            });
        }
        let full_scale = self.full_scale();
        let signal: Vec<f64> = scene.data().iter().map(|&v| v * full_scale).collect();
        self.grid.store(&signal, full_scale);
        self.stage = Stage::Captured;
        log::debug!("Captured {}x{} scene", self.width, self.height);
        Ok(())
    }

    /// Convolve the grid with `psf`, reflecting at the borders.
    pub fn blur(&mut self, psf: &Kernel) -> Result<()> {
        self.ensure_captured("blur")?;
        let blurred = optics::convolve(&self.grid.to_f64(), self.width, self.height, psf);
        self.grid.store(&blurred, self.full_scale());
        self.advance(Stage::Blurred, "blur");
        Ok(())
    }

    /// Add zero-mean Gaussian read noise. Results saturate to
    /// `[0, full_scale]` on storage.
    /// A rejected sigma leaves both the grid and the stage untouched.
    pub fn add_noise(&mut self, sigma: f64) -> Result<()> {
        self.ensure_captured("add_noise")?;
        let mut values = self.grid.to_f64();
        self.noise.add_read_noise(&mut values, sigma)?;
        self.grid.store(&values, self.full_scale());
        self.advance(Stage::Noisy, "add_noise");
        Ok(())
    }

    /// Scale each photosite by the weight of the channel covering it.
    ///
    /// The CFA tile repeats periodically, so every photosite has a channel
    /// even when the CFA was built for a different size.
    pub fn apply_filter_array(&mut self, cfa: &ColorFilterArray) -> Result<()> {
        self.ensure_captured("apply_filter_array")?;
        if cfa.width() != self.width || cfa.height() != self.height {
            log::debug!(
                "CFA built for {}x{} applied to {}x{} sensor by periodic tiling",
                cfa.width(),
                cfa.height(),
                self.width,
                self.height
            );
        }
        let mut values = self.grid.to_f64();
        for row in 0..self.height {
            for col in 0..self.width {
                values[row * self.width + col] *= cfa.weight(cfa.channel_at(row, col));
            }
        }
        self.grid.store(&values, self.full_scale());
        self.advance(Stage::Filtered, "apply_filter_array");
        Ok(())
    }

    /// Demosaic the grid into a color image. An unknown orientation name
    /// falls back to the RGGB/RCCB rule with a warning.
    pub fn reconstruct(&self, orientation: &str) -> Result<ColorImage> {
        self.reconstruct_with(&ReconstructOptions::new(Orientation::parse_lenient(orientation)))
    }

    /// Demosaic the grid without modifying it.
    pub fn reconstruct_with(&self, options: &ReconstructOptions) -> Result<ColorImage> {
        self.ensure_captured("reconstruct")?;
        let full_scale = self.full_scale();
        let mosaic = self.grid.to_f64();

        let rgb = match options.precision {
            DemosaicPrecision::Native => demosaic::demosaic(
                &mosaic,
                self.width,
                self.height,
                options.orientation,
                options.algo,
            ),
            DemosaicPrecision::Rescale8 => {
                let down = INTERMEDIATE_FULL_SCALE / full_scale;
                let up = full_scale / INTERMEDIATE_FULL_SCALE;
                let mosaic8: Vec<f64> = mosaic
                    .iter()
                    .map(|&v| quantize(v * down, INTERMEDIATE_FULL_SCALE, true))
                    .collect();
                let mut rgb = demosaic::demosaic(
                    &mosaic8,
                    self.width,
                    self.height,
                    options.orientation,
                    options.algo,
                );
                for px in rgb.iter_mut() {
                    for c in px.iter_mut() {
                        *c = quantize(*c, INTERMEDIATE_FULL_SCALE, true) * up;
                    }
                }
                rgb
            }
        };

        log::debug!(
            "Reconstructed {} with {} ({})",
            options.orientation,
            options.algo.name(),
            options.precision.name()
        );
        ColorImage::from_rgb(self.width, self.height, self.bit_depth, &rgb)
    }

    fn ensure_captured(&self, operation: &'static str) -> Result<()> {
        if self.stage == Stage::Uninitialized {
            return Err(SimError::UninitializedSensor { operation });
        }
        Ok(())
    }

    /// Record a completed stage. Only called once the grid holds its result.
    fn advance(&mut self, next: Stage, operation: &'static str) {
        if next < self.stage {
            log::warn!("{operation} applied after {:?}; stages are out of order", self.stage);
        }
        log::debug!("Sensor stage {:?} -> {next:?}", self.stage);
        self.stage = next;
    }
}
