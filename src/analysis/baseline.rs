/// Baseline estimation and normalization
///
/// Most points of a processed spectrum carry no signal, so the most
/// populated histogram bin sits at the spectrum's zero level even when a
/// few peaks are orders of magnitude larger.

use super::histogram::Histogram;
use crate::data::spectrum::IntensityArray;
use crate::error::AnalysisError;

/// Left edge of the modal histogram bin.
pub fn estimate_baseline(data: &IntensityArray) -> f64 {
    Histogram::compute(data.values()).mode_edge()
}

/// Recentre on `baseline` and rescale by its magnitude:
/// `(v - baseline) / |baseline|`.
pub fn normalize(data: &IntensityArray, baseline: f64) -> Result<IntensityArray, AnalysisError> {
    if baseline == 0.0 || !baseline.is_finite() {
        return Err(AnalysisError::DegenerateBaseline);
    }
    let scale = baseline.abs();
    Ok(data.map(|v| (v - baseline) / scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat level at `level` with small deterministic ripple and a few peaks.
    fn ripple(level: f64, n: usize) -> Vec<f64> {
        let mut values: Vec<f64> = (0..n)
            .map(|i| level + ((i * 7919) % 101) as f64 / 100.0 - 0.5)
            .collect();
        values[n / 2] = level + 5000.0;
        values[n / 3] = level + 2500.0;
        values
    }

    #[test]
    fn test_baseline_is_left_edge_of_mode() {
        let data = IntensityArray::from_1d(&[0.0, 0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(estimate_baseline(&data), 0.0);
    }

    #[test]
    fn test_baseline_near_level() {
        let data = IntensityArray::from_1d(&ripple(200.0, 4096));
        let b = estimate_baseline(&data);
        // bin width is ~20, the ripple spans 1
        assert!((b - 200.0).abs() < 25.0, "baseline {}", b);
    }

    #[test]
    fn test_normalize_recentres() {
        let data = IntensityArray::from_1d(&ripple(200.0, 4096));
        let b = estimate_baseline(&data);
        let norm = normalize(&data, b).unwrap();
        let b2 = estimate_baseline(&norm);
        assert!(b2.abs() < 0.2, "normalized baseline {}", b2);
        assert_eq!(norm.shape(), data.shape());
    }

    #[test]
    fn test_normalize_zero_baseline() {
        let data = IntensityArray::from_1d(&[0.0, 1.0]);
        assert_eq!(normalize(&data, 0.0), Err(AnalysisError::DegenerateBaseline));
    }

    #[test]
    fn test_normalize_formula() {
        let data = IntensityArray::from_1d(&[-4.0, -2.0, 0.0]);
        let norm = normalize(&data, -2.0).unwrap();
        assert_eq!(norm.values(), &[-1.0, 0.0, 1.0]);
    }
}
