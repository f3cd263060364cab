use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid CFA pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unsupported bit depth: {0} (expected one of 8, 10, 12, 14, 16, 32, 64)")]
    UnsupportedBitDepth(u32),

    #[error("dimension mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    #[error("malformed weight entry {entry:?}: {reason}")]
    MalformedWeightEntry { entry: String, reason: String },

    #[error("unknown color channel: {0:?}")]
    UnknownChannel(char),

    #[error("unrecognized CFA orientation: {0:?}")]
    UnrecognizedOrientation(String),

    #[error("sensor has no captured signal; capture a scene before {operation}")]
    UninitializedSensor { operation: &'static str },

    #[error("invalid PSF kernel {width}x{height}: dimensions must be odd and non-zero")]
    InvalidKernel { width: usize, height: usize },

    #[error("invalid noise sigma: {0}")]
    InvalidNoiseSigma(f64),

    #[error("buffer size mismatch: expected {expected} elements, got {got}")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SimError>;
