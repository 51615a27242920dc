use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AnalysisError;

/// Acquisition parameters for one spectral dimension, as delivered by a
/// format reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Nucleus / axis label, e.g. "1H"
    pub label: String,
    pub sweep_width_hz: f64,
    pub observed_freq_mhz: f64,
    /// Offset of the spectral centre from the reference frequency (Hz)
    pub carrier_hz: f64,
}

impl Dimension {
    pub fn new(label: &str, sweep_width_hz: f64, observed_freq_mhz: f64, carrier_hz: f64) -> Self {
        Self {
            label: label.to_string(),
            sweep_width_hz,
            observed_freq_mhz,
            carrier_hz,
        }
    }
}

/// Dense real-valued intensities stored row-major: the last shape entry is
/// the fastest-varying (directly detected) axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityArray {
    shape: Vec<usize>,
    values: Vec<f64>,
}

impl IntensityArray {
    /// Build an array, checking that `values` fills `shape` exactly.
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Result<Self, AnalysisError> {
        let expected: usize = shape.iter().product();
        if shape.is_empty() || expected != values.len() {
            return Err(AnalysisError::invalid(
                "shape",
                format!("{:?} ({} values)", shape, values.len()),
                "shape does not match the number of values",
            ));
        }
        Ok(Self { shape, values })
    }

    pub fn from_1d(values: &[f64]) -> Self {
        Self {
            shape: vec![values.len()],
            values: values.to_vec(),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Row `i` of a 2D array.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if self.rank() != 2 || i >= self.shape[0] {
            return None;
        }
        let ncols = self.shape[1];
        Some(&self.values[i * ncols..(i + 1) * ncols])
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Apply `f` to every value, keeping the shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            shape: self.shape.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// What a format reader hands over: metadata in the format's native
/// outer-to-inner order and the intensity array in the same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpectrum {
    pub source_path: PathBuf,
    pub dimensions: Vec<Dimension>,
    pub data: IntensityArray,
}

impl RawSpectrum {
    pub fn rank(&self) -> usize {
        self.data.rank()
    }

    /// Labels in display order (directly detected dimension first).
    pub fn labels(&self) -> Vec<String> {
        self.dimensions.iter().rev().map(|d| d.label.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_must_match_values() {
        assert!(IntensityArray::new(vec![2, 3], vec![0.0; 6]).is_ok());
        assert!(IntensityArray::new(vec![2, 3], vec![0.0; 5]).is_err());
        assert!(IntensityArray::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_rows_are_row_major() {
        let arr = IntensityArray::new(vec![3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(arr.row(1).unwrap(), &[3.0, 4.0]);
        assert!(arr.row(3).is_none());
        assert!(IntensityArray::from_1d(&[1.0, 2.0]).row(0).is_none());
    }

    #[test]
    fn test_extrema() {
        let arr = IntensityArray::from_1d(&[-7.0, 2.0, 5.0]);
        assert_eq!(arr.max(), 5.0);
        assert_eq!(arr.min(), -7.0);
    }

    #[test]
    fn test_labels_are_reversed() {
        let raw = RawSpectrum {
            source_path: PathBuf::from("hsqc"),
            dimensions: vec![
                Dimension::new("13C", 25000.0, 150.9, 11000.0),
                Dimension::new("1H", 7200.0, 600.1, 2820.0),
            ],
            data: IntensityArray::new(vec![2, 2], vec![0.0; 4]).unwrap(),
        };
        assert_eq!(raw.labels(), vec!["1H".to_string(), "13C".to_string()]);
    }
}
