use super::bayer::Orientation;
use crate::sensor::optics::reflect_101;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemosaicAlgo {
    #[default]
    Bilinear,
    MalvarHeCutler,
}

impl DemosaicAlgo {
    pub const ALL: &[DemosaicAlgo] = &[DemosaicAlgo::Bilinear, DemosaicAlgo::MalvarHeCutler];

    pub fn name(self) -> &'static str {
        match self {
            DemosaicAlgo::Bilinear => "Bilinear",
            DemosaicAlgo::MalvarHeCutler => "Malvar-He-Cutler",
        }
    }
}

/// Working precision of the interpolation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemosaicPrecision {
    /// Rescale the mosaic to 8-bit codes, interpolate, round to 8-bit and
    /// scale back up to the sensor's full scale.
    #[default]
    Rescale8,
    /// Interpolate directly on the stored samples.
    Native,
}

impl DemosaicPrecision {
    pub const ALL: &[DemosaicPrecision] = &[DemosaicPrecision::Rescale8, DemosaicPrecision::Native];

    pub fn name(self) -> &'static str {
        match self {
            DemosaicPrecision::Rescale8 => "8-bit intermediate",
            DemosaicPrecision::Native => "Native",
        }
    }
}

/// Demosaic a single-channel mosaic (row-major) into interleaved RGB.
pub fn demosaic(
    mosaic: &[f64],
    width: usize,
    height: usize,
    orientation: Orientation,
    algo: DemosaicAlgo,
) -> Vec<[f64; 3]> {
    match algo {
        DemosaicAlgo::Bilinear => demosaic_bilinear(mosaic, width, height, orientation),
        DemosaicAlgo::MalvarHeCutler => demosaic_malvar(mosaic, width, height, orientation),
    }
}

fn demosaic_bilinear(
    mosaic: &[f64],
    width: usize,
    height: usize,
    orientation: Orientation,
) -> Vec<[f64; 3]> {
    let mut result = vec![[0.0f64; 3]; width * height];

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let own = orientation.slot_at(row, col);
            result[idx][own] = mosaic[idx];

            for slot in 0..3usize {
                if slot != own {
                    result[idx][slot] =
                        neighbor_mean(mosaic, width, height, row, col, slot, orientation);
                }
            }
        }
    }
    result
}

/// Mean of the nearest photosites carrying `slot`: the 3x3 window, widened
/// to 5x5 when the image is too narrow for the window to contain one.
fn neighbor_mean(
    mosaic: &[f64],
    width: usize,
    height: usize,
    row: usize,
    col: usize,
    slot: usize,
    orientation: Orientation,
) -> f64 {
    for radius in [1isize, 2] {
        let mut sum = 0.0;
        let mut count = 0usize;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let ny = row as isize + dy;
                let nx = col as isize + dx;
                if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
                    continue;
                }
                let (ny, nx) = (ny as usize, nx as usize);
                if orientation.slot_at(ny, nx) == slot {
                    sum += mosaic[ny * width + nx];
                    count += 1;
                }
            }
        }
        if count > 0 {
            return sum / count as f64;
        }
    }
    0.0
}

/// Malvar-He-Cutler gradient-corrected interpolation (5x5 kernels).
fn demosaic_malvar(
    mosaic: &[f64],
    width: usize,
    height: usize,
    orientation: Orientation,
) -> Vec<[f64; 3]> {
    let mut result = vec![[0.0f64; 3]; width * height];

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let at = |dy: isize, dx: isize| {
                let y = reflect_101(row as isize + dy, height);
                let x = reflect_101(col as isize + dx, width);
                mosaic[y * width + x]
            };
            let own = orientation.slot_at(row, col);
            result[idx][own] = mosaic[idx];

            match own {
                1 => {
                    let horizontal = (4.0 * (at(0, -1) + at(0, 1))
                        - (at(0, -2) + at(0, 2))
                        - (at(-1, -1) + at(-1, 1) + at(1, -1) + at(1, 1))
                        + 0.5 * (at(-2, 0) + at(2, 0))
                        + 5.0 * at(0, 0))
                        / 8.0;
                    let vertical = (4.0 * (at(-1, 0) + at(1, 0))
                        - (at(-2, 0) + at(2, 0))
                        - (at(-1, -1) + at(-1, 1) + at(1, -1) + at(1, 1))
                        + 0.5 * (at(0, -2) + at(0, 2))
                        + 5.0 * at(0, 0))
                        / 8.0;
                    let (r, b) = if orientation.red_on_row(row) {
                        (horizontal, vertical)
                    } else {
                        (vertical, horizontal)
                    };
                    result[idx][0] = r.max(0.0);
                    result[idx][2] = b.max(0.0);
                }
                _ => {
                    let green = (4.0 * at(0, 0)
                        + 2.0 * (at(-1, 0) + at(1, 0) + at(0, -1) + at(0, 1))
                        - (at(-2, 0) + at(2, 0) + at(0, -2) + at(0, 2)))
                        / 8.0;
                    let opposite = (6.0 * at(0, 0)
                        + 2.0 * (at(-1, -1) + at(-1, 1) + at(1, -1) + at(1, 1))
                        - 1.5 * (at(-2, 0) + at(2, 0) + at(0, -2) + at(0, 2)))
                        / 8.0;
                    result[idx][1] = green.max(0.0);
                    result[idx][2 - own] = opposite.max(0.0);
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mosaic_from(width: usize, height: usize, o: Orientation, rgb: [f64; 3]) -> Vec<f64> {
        let mut m = vec![0.0; width * height];
        for row in 0..height {
            for col in 0..width {
                m[row * width + col] = rgb[o.slot_at(row, col)];
            }
        }
        m
    }

    #[test]
    fn flat_color_is_reconstructed() {
        let rgb = [120.0, 60.0, 30.0];
        for &o in Orientation::ALL {
            for &algo in DemosaicAlgo::ALL {
                let m = mosaic_from(8, 6, o, rgb);
                let out = demosaic(&m, 8, 6, o, algo);
                for px in &out {
                    for c in 0..3 {
                        assert!((px[c] - rgb[c]).abs() < 1e-9, "{o} {}: {px:?}", algo.name());
                    }
                }
            }
        }
    }

    #[test]
    fn tiny_images_do_not_panic() {
        for (w, h) in [(1, 1), (1, 3), (2, 1), (3, 3)] {
            let m = vec![10.0; w * h];
            for &algo in DemosaicAlgo::ALL {
                let out = demosaic(&m, w, h, Orientation::Rggb, algo);
                assert_eq!(out.len(), w * h);
            }
        }
    }
}
