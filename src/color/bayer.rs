use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

/// 2x2 mosaic layouts the reconstructor knows how to interpolate.
///
/// `Rccb` shares the RGGB rule: clear photosites take the green slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Rggb,
    Rccb,
    Grbg,
    Gbrg,
    Bggr,
}

impl Orientation {
    pub const ALL: &[Orientation] = &[
        Orientation::Rggb,
        Orientation::Rccb,
        Orientation::Grbg,
        Orientation::Gbrg,
        Orientation::Bggr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Rggb => "RGGB",
            Orientation::Rccb => "RCCB",
            Orientation::Grbg => "GRBG",
            Orientation::Gbrg => "GBRG",
            Orientation::Bggr => "BGGR",
        }
    }

    /// Parse an orientation, falling back to the RGGB/RCCB rule with a
    /// warning when the name is not recognized.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: SimError| {
            log::warn!("{e}; reconstructing with the RGGB/RCCB rule, output is degraded-confidence");
            Orientation::Rggb
        })
    }

    /// Output color slot (0=R, 1=G, 2=B) sampled at (row, col).
    pub fn slot_at(self, row: usize, col: usize) -> usize {
        match (self, row % 2, col % 2) {
            (Orientation::Rggb | Orientation::Rccb, 0, 0) => 0,
            (Orientation::Rggb | Orientation::Rccb, 1, 1) => 2,
            (Orientation::Rggb | Orientation::Rccb, _, _) => 1,
            (Orientation::Bggr, 0, 0) => 2,
            (Orientation::Bggr, 1, 1) => 0,
            (Orientation::Bggr, _, _) => 1,
            (Orientation::Grbg, 0, 1) => 0,
            (Orientation::Grbg, 1, 0) => 2,
            (Orientation::Grbg, _, _) => 1,
            (Orientation::Gbrg, 0, 1) => 2,
            (Orientation::Gbrg, 1, 0) => 0,
            (Orientation::Gbrg, _, _) => 1,
        }
    }

    /// True when the row holding `row` carries red samples.
    pub fn red_on_row(self, row: usize) -> bool {
        (0..2).any(|col| self.slot_at(row, col) == 0)
    }
}

impl FromStr for Orientation {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::ALL
            .iter()
            .copied()
            .find(|o| o.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnrecognizedOrientation(s.to_string()))
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_match_names() {
        for &o in Orientation::ALL {
            let name: Vec<char> = o.name().chars().collect();
            for row in 0..2 {
                for col in 0..2 {
                    let expected = match name[row * 2 + col] {
                        'R' => 0,
                        'G' | 'C' => 1,
                        'B' => 2,
                        _ => unreachable!(),
                    };
                    assert_eq!(o.slot_at(row, col), expected, "{o} ({row},{col})");
                    assert_eq!(o.slot_at(row + 2, col + 4), expected);
                }
            }
        }
    }

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!("GBRG".parse::<Orientation>().unwrap(), Orientation::Gbrg);
        assert_eq!("rccb".parse::<Orientation>().unwrap(), Orientation::Rccb);
        assert!(matches!(
            "ZZZZ".parse::<Orientation>(),
            Err(SimError::UnrecognizedOrientation(_))
        ));
        assert_eq!(Orientation::parse_lenient("ZZZZ"), Orientation::Rggb);
    }

    #[test]
    fn red_rows() {
        assert!(Orientation::Rggb.red_on_row(0));
        assert!(!Orientation::Rggb.red_on_row(1));
        assert!(Orientation::Gbrg.red_on_row(1));
    }
}
