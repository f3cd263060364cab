//! Camera front-end simulation - library crate.
//!
//! Models a sensor turning an illumination map into a quantized, noisy,
//! color-filtered raw capture, and the demosaic step that reconstructs a
//! color image from it. Scene generation, post-processing and image export
//! sit around that core.

pub mod color;
pub mod error;
pub mod image_io;
pub mod isp;
pub mod pipeline;
pub mod scene;
pub mod sensor;

pub use color::{Channel, ColorFilterArray, ColorImage, DemosaicAlgo, DemosaicPrecision, Orientation};
pub use error::{Result, SimError};
pub use scene::Scene;
pub use sensor::optics::Kernel;
pub use sensor::{BitDepth, ReconstructOptions, Sensor, Stage};
