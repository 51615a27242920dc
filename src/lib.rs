/// Display parameters for processed 1D/2D NMR spectra.
///
/// Given a processed spectrum (read here from Bruker `pdata`), derive the
/// baseline, a robust noise level, the signal amplitude, a sign-aware
/// threshold and a geometric ladder of contour levels, together with the
/// chemical-shift axes needed to place the data.

pub mod analysis;
pub mod data;
pub mod error;
pub mod log;
pub mod render;

pub use analysis::{AnalysisOptions, SignPolicy, SpectrumAnalysis, Statistics};
pub use data::{Dimension, IntensityArray, RawSpectrum};
pub use error::{AnalysisError, ReadError};
pub use render::{ColorMap, PlotRequest};
