use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::error::{Result, SimError};

/// Per-sensor random source for read noise.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: StdRng,
    seed: Option<u64>,
}

impl NoiseSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Non-reproducible source seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            seed: None,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Add zero-mean Gaussian noise with standard deviation `sigma`,
    /// one independent draw per sample.
    pub fn add_read_noise(&mut self, grid: &mut [f64], sigma: f64) -> Result<()> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SimError::InvalidNoiseSigma(sigma));
        }
        if sigma == 0.0 {
            return Ok(());
        }
        let dist = Normal::new(0.0, sigma).map_err(|_| SimError::InvalidNoiseSigma(sigma))?;
        for pixel in grid.iter_mut() {
            *pixel += dist.sample(&mut self.rng);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_its_seed() {
        assert_eq!(NoiseSource::seeded(17).seed(), Some(17));
        assert_eq!(NoiseSource::from_os().seed(), None);
    }

    #[test]
    fn zero_sigma_is_identity() {
        let mut noise = NoiseSource::seeded(1);
        let mut grid = vec![1.0, 2.0, 3.0];
        noise.add_read_noise(&mut grid, 0.0).unwrap();
        assert_eq!(grid, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn same_seed_same_noise() {
        let mut a = vec![100.0; 64];
        let mut b = vec![100.0; 64];
        NoiseSource::seeded(42).add_read_noise(&mut a, 5.0).unwrap();
        NoiseSource::seeded(42).add_read_noise(&mut b, 5.0).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().any(|&v| v != 100.0));
    }

    #[test]
    fn noise_statistics() {
        let mut grid = vec![0.0; 20_000];
        NoiseSource::seeded(7).add_read_noise(&mut grid, 2.0).unwrap();
        let n = grid.len() as f64;
        let mean = grid.iter().sum::<f64>() / n;
        let var = grid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.1, "std {}", var.sqrt());
    }

    #[test]
    fn rejects_negative_sigma() {
        let mut grid = vec![0.0; 4];
        let err = NoiseSource::seeded(0).add_read_noise(&mut grid, -1.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidNoiseSigma(_)));
        assert!(NoiseSource::seeded(0).add_read_noise(&mut grid, f64::NAN).is_err());
    }
}
