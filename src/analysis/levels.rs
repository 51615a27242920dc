use super::sign::SignPolicy;
use crate::error::AnalysisError;

/// Default number of contour levels per sign.
pub const DEFAULT_NLEVS: usize = 42;
/// Default ratio between consecutive levels.
pub const DEFAULT_FACTOR: f64 = 1.1;
/// Default first-contour height as a fraction of the signal.
pub const DEFAULT_FRACTION: f64 = 0.01;

/// Height of the first contour above the baseline.
pub fn start_level(baseline: f64, threshold: f64, noise: f64) -> f64 {
    baseline + threshold * noise
}

/// Geometric ladder `start * factor^k`, `k = 0..nlevs`.
pub fn geometric_ladder(start: f64, nlevs: usize, factor: f64) -> Result<Vec<f64>, AnalysisError> {
    if nlevs == 0 {
        return Err(AnalysisError::invalid("nlevs", nlevs, "must be at least 1"));
    }
    if !(factor.is_finite() && factor > 1.0) {
        return Err(AnalysisError::invalid("factor", factor, "must be greater than 1"));
    }
    if !(start.is_finite() && start > 0.0) {
        return Err(AnalysisError::invalid(
            "start_level",
            start,
            "first contour must lie above zero",
        ));
    }
    Ok((0..nlevs).map(|k| start * factor.powi(k as i32)).collect())
}

/// Contour levels for `sign`, ascending in array order.
///
/// `Both` yields `2 * nlevs` values: the mirrored negative ladder then the
/// positive one.
pub fn contour_levels(
    sign: SignPolicy,
    start: f64,
    nlevs: usize,
    factor: f64,
) -> Result<Vec<f64>, AnalysisError> {
    let ladder = geometric_ladder(start, nlevs, factor)?;
    Ok(sign.arrange(ladder))
}
