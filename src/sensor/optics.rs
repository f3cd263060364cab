use crate::error::{Result, SimError};

/// Point spread function applied by [`Sensor::blur`](super::Sensor::blur).
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Kernel {
    /// Row-major kernel; both dimensions must be odd so it has a center tap.
    /// Normalization is the caller's business.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(SimError::InvalidKernel { width, height });
        }
        if data.len() != width * height {
            return Err(SimError::InvalidBuffer {
                expected: width * height,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// The 1x1 delta kernel `[[1]]`.
    pub fn identity() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![1.0],
        }
    }

    /// Separable Gaussian `g * g^T` with `size` taps per side.
    ///
    /// A non-positive `sigma` is derived from the size as
    /// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
    pub fn gaussian(size: usize, sigma: f64) -> Result<Self> {
        if size % 2 == 0 {
            return Err(SimError::InvalidKernel {
                width: size,
                height: size,
            });
        }
        let sigma = if sigma > 0.0 {
            sigma
        } else {
            0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
        };

        let center = (size / 2) as f64;
        let mut taps: Vec<f64> = (0..size)
            .map(|i| {
                let d = i as f64 - center;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f64 = taps.iter().sum();
        for t in taps.iter_mut() {
            *t /= sum;
        }

        let mut data = Vec::with_capacity(size * size);
        for &gy in &taps {
            for &gx in &taps {
                data.push(gy * gx);
            }
        }
        Self::new(size, size, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Reflect an out-of-range index back into `0..n` without repeating the
/// edge sample (`gfedcb|abcdefgh|gfedcba`). Preserves index parity.
pub fn reflect_101(mut i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let last = n as isize - 1;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// 2-D convolution with reflect-101 borders. Output size equals input size.
pub fn convolve(grid: &[f64], width: usize, height: usize, psf: &Kernel) -> Vec<f64> {
    let kw = psf.width as isize;
    let kh = psf.height as isize;
    let (cx, cy) = (kw / 2, kh / 2);
    let mut out = vec![0.0f64; width * height];

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for ky in 0..kh {
                let sy = reflect_101(y as isize + cy - ky, height);
                let row = sy * width;
                for kx in 0..kw {
                    let sx = reflect_101(x as isize + cx - kx, width);
                    acc += psf.data[(ky * kw + kx) as usize] * grid[row + sx];
                }
            }
            out[y * width + x] = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_indices() {
        let mapped: Vec<usize> = (-3..=10).map(|i| reflect_101(i, 8)).collect();
        assert_eq!(mapped, vec![3, 2, 1, 0, 1, 2, 3, 4, 5, 6, 7, 6, 5, 4]);
        assert_eq!(reflect_101(-5, 2), 1);
        assert_eq!(reflect_101(4, 1), 0);
    }

    #[test]
    fn gaussian_is_normalized_and_symmetric() {
        let k = Kernel::gaussian(7, 1.5).unwrap();
        assert!((k.sum() - 1.0).abs() < 1e-12);
        let d = k.data();
        assert_eq!(d[0], d[48]);
        assert_eq!(d[3], d[21]);
        assert!(d[24] > d[23]);
        assert!(Kernel::gaussian(4, 1.0).is_err());
    }

    #[test]
    fn identity_kernel_is_noop() {
        let grid: Vec<f64> = (0..20).map(|v| v as f64).collect();
        assert_eq!(convolve(&grid, 5, 4, &Kernel::identity()), grid);
    }

    #[test]
    fn normalized_blur_preserves_flat_field() {
        let grid = vec![40.0; 9 * 6];
        let out = convolve(&grid, 9, 6, &Kernel::gaussian(5, 0.0).unwrap());
        for v in out {
            assert!((v - 40.0).abs() < 1e-9);
        }
    }

    #[test]
    fn convolution_flips_the_kernel() {
        // Impulse response reproduces the kernel itself.
        let k = Kernel::new(3, 1, vec![0.0, 0.25, 0.75]).unwrap();
        let grid = vec![0.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(convolve(&grid, 5, 1, &k), vec![0.0, 0.0, 0.25, 0.75, 0.0]);
    }

    #[test]
    fn rejects_even_kernels() {
        assert!(matches!(
            Kernel::new(2, 3, vec![0.0; 6]),
            Err(SimError::InvalidKernel { .. })
        ));
        assert!(matches!(
            Kernel::new(3, 3, vec![0.0; 8]),
            Err(SimError::InvalidBuffer { .. })
        ));
    }
}
