/// Error types for spectrum analysis and Bruker data reading

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while deriving spectrum statistics and contour levels.
///
/// None of these are transient: each one reflects unsupported data or a
/// malformed caller input and is surfaced as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("unsupported spectrum rank {rank}: only 1D and 2D spectra can be analysed")]
    UnsupportedRank { rank: usize },

    #[error("dimension metadata mismatch: {dimensions} descriptors for a rank-{rank} array")]
    DimensionMismatch { dimensions: usize, rank: usize },

    #[error("baseline is zero, cannot normalize by |baseline|")]
    DegenerateBaseline,

    #[error("noise estimate is {noise}, signal-to-noise ratio is undefined")]
    DegenerateNoise { noise: f64 },

    #[error("invalid sign '{value}': expected one of positive, negative, both")]
    InvalidSign { value: String },

    #[error(
        "invalid color map '{value}': expected one of red, blue, green, purple, orange, grey, \
         light_red, light_blue, coolwarm, viridis"
    )]
    InvalidColorMap { value: String },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl AnalysisError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        AnalysisError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Failures raised by the Bruker processed-data reader.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("missing file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid parameter {key} in {file}: {reason}")]
    InvalidParameter {
        file: String,
        key: &'static str,
        reason: String,
    },

    #[error("data truncated: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },
}
