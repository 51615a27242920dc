/// Noise estimation
///
/// The noise level is the standard deviation of the quietest tenth of the
/// spectrum, taken as a proxy for signal-free regions. Spectra with large
/// negative peaks (e.g. edited HSQC) put those peaks into that tenth and
/// inflate the estimate; this is a known bias of the heuristic.

use crate::error::AnalysisError;

/// Percentile of the whole array used to select the noise region.
pub const NOISE_PERCENTILE: f64 = 10.0;

/// `p`-th percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + frac * (sorted[upper] - sorted[lower]))
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Standard deviation of the values at or below the 10th percentile.
///
/// Fails with `DegenerateNoise` when that subset is flat.
pub fn estimate_noise(values: &[f64]) -> Result<f64, AnalysisError> {
    let cutoff = percentile(values, NOISE_PERCENTILE)
        .ok_or(AnalysisError::DegenerateNoise { noise: f64::NAN })?;
    let quiet: Vec<f64> = values.iter().copied().filter(|&v| v <= cutoff).collect();
    let noise = std_dev(&quiet).unwrap_or(f64::NAN);
    log::debug!(
        "Noise region: {} of {} points at or below {:.6e}, std {:.6e}",
        quiet.len(),
        values.len(),
        cutoff,
        noise
    );
    if noise == 0.0 || !noise.is_finite() {
        return Err(AnalysisError::DegenerateNoise { noise });
    }
    Ok(noise)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let v: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        assert_eq!(percentile(&v, 10.0), Some(1.0));
        assert_eq!(percentile(&v, 50.0), Some(5.0));
        assert_eq!(percentile(&[4.0, 0.0], 25.0), Some(1.0));
        assert_eq!(percentile(&[], 10.0), None);
    }

    #[test]
    fn test_std_dev() {
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_noise_region_is_degenerate() {
        let v = [0.0, 0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0];
        assert!(matches!(
            estimate_noise(&v),
            Err(AnalysisError::DegenerateNoise { .. })
        ));
    }

    #[test]
    fn test_noise_uses_quiet_tenth() {
        // 0..=99 : 10th percentile is 9.9, quiet subset 0..=9
        let v: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let expected = std_dev(&(0..10).map(|i| i as f64).collect::<Vec<_>>()).unwrap();
        assert!((estimate_noise(&v).unwrap() - expected).abs() < 1e-12);
    }
}
