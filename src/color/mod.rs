pub mod bayer;
pub mod cfa;
pub mod demosaic;
pub mod rgb;

pub use bayer::Orientation;
pub use cfa::{Channel, ColorFilterArray, WeightUpdateReport};
pub use demosaic::{DemosaicAlgo, DemosaicPrecision};
pub use rgb::ColorImage;
