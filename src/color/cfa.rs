use std::fmt;

use crate::error::{Result, SimError};

/// Spectral response of a single photosite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
    /// Panchromatic photosite with no color filter.
    Clear,
}

impl Channel {
    pub const ALL: &[Channel] = &[Channel::Red, Channel::Green, Channel::Blue, Channel::Clear];

    pub fn letter(self) -> char {
        match self {
            Channel::Red => 'R',
            Channel::Green => 'G',
            Channel::Blue => 'B',
            Channel::Clear => 'C',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
            Channel::Clear => "Clear",
        }
    }

    pub fn from_letter(letter: char) -> Result<Self> {
        match letter {
            'R' => Ok(Channel::Red),
            'G' => Ok(Channel::Green),
            'B' => Ok(Channel::Blue),
            'C' => Ok(Channel::Clear),
            other => Err(SimError::UnknownChannel(other)),
        }
    }

    /// Default relative sensitivity: luma coefficients, unity for clear.
    pub fn default_weight(self) -> f64 {
        match self {
            Channel::Red => 0.299,
            Channel::Green => 0.587,
            Channel::Blue => 0.114,
            Channel::Clear => 1.0,
        }
    }

    fn slot(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Clear => 3,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Outcome of a batch weight update. Rejected entries were skipped.
#[derive(Debug, Default)]
pub struct WeightUpdateReport {
    pub applied: Vec<(Channel, f64)>,
    pub rejected: Vec<SimError>,
}

impl WeightUpdateReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A 2x2 color filter tile repeated over a `width` x `height` sensor,
/// together with the per-channel sensitivity applied during filtering.
///
/// The tiling is fixed at construction; only the weights can change.
#[derive(Debug, Clone)]
pub struct ColorFilterArray {
    tile: [Channel; 4],
    width: usize,
    height: usize,
    pattern: Vec<Channel>,
    weights: [f64; 4],
}

impl ColorFilterArray {
    /// Build a CFA from a four-letter tile over {R, G, B, C}, read row-major:
    /// `tile[0]` at (0,0), `tile[1]` at (0,1), `tile[2]` at (1,0), `tile[3]` at (1,1).
    pub fn new(tile: &str, width: usize, height: usize) -> Result<Self> {
        let tile = parse_tile(tile)?;

        let mut pattern = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                pattern.push(tile[(row % 2) * 2 + (col % 2)]);
            }
        }

        let mut weights = [0.0; 4];
        for &channel in Channel::ALL {
            weights[channel.slot()] = channel.default_weight();
        }

        log::debug!(
            "CFA {} built for {width}x{height}",
            tile.iter().map(|c| c.letter()).collect::<String>()
        );

        Ok(Self {
            tile,
            width,
            height,
            pattern,
            weights,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile(&self) -> [Channel; 4] {
        self.tile
    }

    pub fn tile_string(&self) -> String {
        self.tile.iter().map(|c| c.letter()).collect()
    }

    /// Per-pixel channel assignment, row-major, `width * height` long.
    pub fn pattern(&self) -> &[Channel] {
        &self.pattern
    }

    /// Channel at any (row, col), following the periodic tile even
    /// outside the derived pattern grid.
    pub fn channel_at(&self, row: usize, col: usize) -> Channel {
        self.tile[(row % 2) * 2 + (col % 2)]
    }

    /// Overwrite a channel's weight. Any value is accepted, including
    /// negative or greater than one.
    pub fn set_weight(&mut self, channel: Channel, weight: f64) {
        self.weights[channel.slot()] = weight;
    }

    pub fn weight(&self, channel: Channel) -> f64 {
        self.weights[channel.slot()]
    }

    /// Look up a weight by its channel letter.
    pub fn weight_of(&self, letter: char) -> Result<f64> {
        Channel::from_letter(letter).map(|channel| self.weight(channel))
    }

    pub fn set_uniform_weight(&mut self, weight: f64) {
        self.weights = [weight; 4];
    }

    /// Apply `Channel:Value` entries such as `"R:0.25"`.
    ///
    /// Each entry stands alone: a malformed one is logged, recorded in the
    /// report and skipped while the rest of the batch is still applied.
    pub fn update_weights<I, S>(&mut self, entries: I) -> WeightUpdateReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = WeightUpdateReport::default();
        for entry in entries {
            match parse_weight_entry(entry.as_ref()) {
                Ok((channel, weight)) => {
                    log::debug!("{} weight set to {weight}", channel.name());
                    self.set_weight(channel, weight);
                    report.applied.push((channel, weight));
                }
                Err(e) => {
                    log::warn!("Skipping color weight: {e}");
                    report.rejected.push(e);
                }
            }
        }
        report
    }
}

fn parse_tile(tile: &str) -> Result<[Channel; 4]> {
    let invalid = |reason: String| SimError::InvalidPattern {
        pattern: tile.to_string(),
        reason,
    };

    let letters: Vec<char> = tile.chars().collect();
    if letters.len() != 4 {
        return Err(invalid(format!(
            "expected 4 characters (2x2 tile), got {}",
            letters.len()
        )));
    }

    let mut channels = [Channel::Green; 4];
    for (slot, &letter) in channels.iter_mut().zip(letters.iter()) {
        *slot = Channel::from_letter(letter)
            .map_err(|_| invalid(format!("'{letter}' is not one of R, G, B, C")))?;
    }
    Ok(channels)
}

fn parse_weight_entry(entry: &str) -> Result<(Channel, f64)> {
    let malformed = |reason: String| SimError::MalformedWeightEntry {
        entry: entry.to_string(),
        reason,
    };

    let mut chars = entry.chars();
    let letter = chars
        .next()
        .ok_or_else(|| malformed("empty entry".into()))?;
    let value = chars
        .as_str()
        .strip_prefix(':')
        .ok_or_else(|| malformed("expected ':' right after the channel letter".into()))?;
    let channel = Channel::from_letter(letter)
        .map_err(|_| malformed(format!("unknown channel '{letter}'")))?;
    let weight: f64 = value
        .trim()
        .parse()
        .map_err(|_| malformed(format!("{value:?} is not a number")))?;
    if !weight.is_finite() {
        return Err(malformed("weight must be finite".into()));
    }
    Ok((channel, weight))
}
