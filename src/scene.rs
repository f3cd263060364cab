//! Synthetic illumination maps fed to [`Sensor::capture`](crate::sensor::Sensor::capture).

use std::f64::consts::PI;

use crate::error::{Result, SimError};

/// Row-major grid of illumination samples, nominally in `[0, 1]`.
/// Out-of-range values are left alone; quantization clips them later.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Scene {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
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

    /// Build a scene by evaluating `f(row, col)` at every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn uniform(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
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

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenePattern {
    Gradient,
    Checkerboard { squares_x: usize, squares_y: usize },
    SlantedEdge { angle_deg: f64 },
    RadialLines { count: usize },
}

impl ScenePattern {
    pub const ALL: &[ScenePattern] = &[
        ScenePattern::Gradient,
        ScenePattern::Checkerboard {
            squares_x: 8,
            squares_y: 8,
        },
        ScenePattern::SlantedEdge { angle_deg: 20.0 },
        ScenePattern::RadialLines { count: 16 },
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenePattern::Gradient => "gradient",
            ScenePattern::Checkerboard { .. } => "checkerboard",
            ScenePattern::SlantedEdge { .. } => "slanted-edge",
            ScenePattern::RadialLines { .. } => "radial-lines",
        }
    }

    /// Look up a pattern by name with its default parameters.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn generate(self, width: usize, height: usize) -> Scene {
        match self {
            ScenePattern::Gradient => gradient(width, height),
            ScenePattern::Checkerboard {
                squares_x,
                squares_y,
            } => checkerboard(width, height, squares_x, squares_y),
            ScenePattern::SlantedEdge { angle_deg } => slanted_edge(width, height, angle_deg),
            ScenePattern::RadialLines { count } => radial_lines(width, height, count),
        }
    }
}

/// Vertical ramp: row `i` has intensity `i / height`.
pub fn gradient(width: usize, height: usize) -> Scene {
    Scene::from_fn(width, height, |row, _| row as f64 / height as f64)
}

/// Alternating 0/1 squares, `squares_x` across and `squares_y` down.
pub fn checkerboard(width: usize, height: usize, squares_x: usize, squares_y: usize) -> Scene {
    let cell_w = (width / squares_x.max(1)).max(1);
    let cell_h = (height / squares_y.max(1)).max(1);
    Scene::from_fn(width, height, |row, col| {
        if (row / cell_h + col / cell_w) % 2 == 0 { 1.0 } else { 0.0 }
    })
}

/// Dark/bright half-planes split by a line through the center, tilted
/// `angle_deg` from vertical. Used for edge-spread measurements.
pub fn slanted_edge(width: usize, height: usize, angle_deg: f64) -> Scene {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    Scene::from_fn(width, height, |row, col| {
        let x = col as f64 + 0.5 - cx;
        let y = row as f64 + 0.5 - cy;
        if x * cos - y * sin >= 0.0 { 1.0 } else { 0.0 }
    })
}

/// Siemens star with `count` bright spokes around the center.
pub fn radial_lines(width: usize, height: usize, count: usize) -> Scene {
    let sectors = 2 * count.max(1);
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    Scene::from_fn(width, height, |row, col| {
        let angle = (row as f64 + 0.5 - cy).atan2(col as f64 + 0.5 - cx) + PI;
        let sector = ((angle / (2.0 * PI)) * sectors as f64) as usize % sectors;
        if sector % 2 == 0 { 1.0 } else { 0.0 }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_rows() {
        let s = gradient(3, 4);
        assert_eq!(s.get(0, 2), 0.0);
        assert_eq!(s.get(2, 1), 0.5);
        assert_eq!(s.get(3, 0), 0.75);
    }

    #[test]
    fn checkerboard_alternates() {
        let s = checkerboard(8, 8, 4, 4);
        assert_eq!(s.get(0, 0), 1.0);
        assert_eq!(s.get(0, 2), 0.0);
        assert_eq!(s.get(2, 2), 1.0);
        assert_eq!(s.get(1, 1), 1.0);
    }

    #[test]
    fn slanted_edge_is_binary_and_split() {
        let s = slanted_edge(32, 32, 10.0);
        let bright = s.data().iter().filter(|&&v| v == 1.0).count();
        assert!(s.data().iter().all(|&v| v == 0.0 || v == 1.0));
        assert!((bright as i64 - 512).abs() < 40, "{bright}");
        assert_eq!(s.get(16, 0), 0.0);
        assert_eq!(s.get(16, 31), 1.0);
    }

    #[test]
    fn radial_lines_balanced() {
        let s = radial_lines(64, 64, 8);
        let bright = s.data().iter().filter(|&&v| v == 1.0).count();
        assert!((bright as i64 - 2048).abs() < 100, "{bright}");
    }

    #[test]
    fn new_checks_length() {
        assert!(Scene::new(2, 2, vec![0.0; 3]).is_err());
        assert_eq!(ScenePattern::from_name("radial-lines").unwrap().name(), "radial-lines");
        assert!(ScenePattern::from_name("stripes").is_none());
    }
}
