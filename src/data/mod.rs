pub mod bruker;
pub mod spectrum;

pub use spectrum::{Dimension, IntensityArray, RawSpectrum};
