use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AnalysisError;

/// Which intensity regions are analysed and drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignPolicy {
    #[default]
    Positive,
    Negative,
    Both,
}

impl SignPolicy {
    pub const ALL: [SignPolicy; 3] = [SignPolicy::Positive, SignPolicy::Negative, SignPolicy::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignPolicy::Positive => "positive",
            SignPolicy::Negative => "negative",
            SignPolicy::Both => "both",
        }
    }

    /// Signal amplitude from the data extrema.
    pub fn signal(&self, min: f64, max: f64) -> f64 {
        match self {
            SignPolicy::Positive => max,
            SignPolicy::Negative => min.abs(),
            SignPolicy::Both => max.abs().max(min.abs()),
        }
    }

    /// First contour as a multiple of the noise level.
    pub fn threshold(&self, min: f64, max: f64, fraction: f64, noise: f64) -> f64 {
        match self {
            SignPolicy::Positive => max * fraction / noise,
            SignPolicy::Negative => (min * fraction).abs() / noise,
            SignPolicy::Both => self.signal(min, max) * fraction / noise,
        }
    }

    /// Arrange an ascending positive ladder for this sign.
    ///
    /// Negative levels are the mirrored ladder in ascending order; `Both`
    /// puts the negative half before the positive half.
    pub fn arrange(&self, ladder: Vec<f64>) -> Vec<f64> {
        match self {
            SignPolicy::Positive => ladder,
            SignPolicy::Negative => mirror(&ladder),
            SignPolicy::Both => {
                let mut levels = mirror(&ladder);
                levels.extend(ladder);
                levels
            }
        }
    }
}

fn mirror(ladder: &[f64]) -> Vec<f64> {
    ladder.iter().rev().map(|v| -v).collect()
}

impl FromStr for SignPolicy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SignPolicy::Positive),
            "negative" => Ok(SignPolicy::Negative),
            "both" => Ok(SignPolicy::Both),
            _ => Err(AnalysisError::InvalidSign {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SignPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
