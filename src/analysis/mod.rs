/// Spectrum analysis: baseline, noise, signal, threshold and contour levels
///
/// A [`SpectrumAnalysis`] is built in one pass (axes, baseline, optional
/// normalization, noise/signal, threshold) and is read-only afterwards.
/// Contour levels are recomputed on every request.

pub mod axis;
pub mod baseline;
pub mod histogram;
pub mod levels;
pub mod noise;
pub mod sign;

use serde::{Deserialize, Serialize};

use crate::data::spectrum::{IntensityArray, RawSpectrum};
use crate::error::AnalysisError;
use crate::log::AnalysisLog;

pub use axis::{Axis, CoordinateGrid, PpmRange};
pub use histogram::Histogram;
pub use sign::SignPolicy;

/// Caller-chosen analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub sign: SignPolicy,
    /// First contour at this fraction of the signal above baseline
    pub fraction: f64,
    /// Explicit threshold (multiples of noise), replacing the derived one
    pub threshold: Option<f64>,
    /// Recentre on the baseline and rescale by its magnitude
    pub normalize: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            sign: SignPolicy::Positive,
            fraction: levels::DEFAULT_FRACTION,
            threshold: None,
            normalize: true,
        }
    }
}

impl AnalysisOptions {
    fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.fraction.is_finite() && self.fraction > 0.0) {
            return Err(AnalysisError::invalid("fraction", self.fraction, "must be positive"));
        }
        if let Some(t) = self.threshold {
            check_threshold(t)?;
        }
        Ok(())
    }
}

fn check_threshold(t: f64) -> Result<(), AnalysisError> {
    if !(t.is_finite() && t > 0.0) {
        return Err(AnalysisError::invalid("threshold", t, "must be positive"));
    }
    Ok(())
}

/// Statistics snapshot of one intensity array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub baseline: f64,
    pub signal: f64,
    pub noise: f64,
    pub snr: f64,
    /// First contour height above baseline, in multiples of `noise`
    pub threshold: f64,
    pub min: f64,
    pub max: f64,
}

impl Statistics {
    /// Derive noise, signal and threshold for `data` with a known baseline.
    pub fn measure(
        data: &IntensityArray,
        baseline: f64,
        options: &AnalysisOptions,
    ) -> Result<Self, AnalysisError> {
        let min = data.min();
        let max = data.max();
        let noise = noise::estimate_noise(data.values())?;
        let signal = options.sign.signal(min, max);
        let snr = signal / noise;
        let threshold = match options.threshold {
            Some(t) => t,
            None => options.sign.threshold(min, max, options.fraction, noise),
        };
        Ok(Self {
            baseline,
            signal,
            noise,
            snr,
            threshold,
            min,
            max,
        })
    }
}

/// Normalize `data` and re-estimate its baseline.
fn normalize_stage(
    data: &IntensityArray,
    old_baseline: f64,
    log: &mut AnalysisLog,
) -> Result<(IntensityArray, f64), AnalysisError> {
    let data = baseline::normalize(data, old_baseline)?;
    let baseline = baseline::estimate_baseline(&data);
    log.add_entry(
        "Normalize",
        &format!(
            "(v - {:.6e}) / {:.6e}; new baseline {:.6e}",
            old_baseline,
            old_baseline.abs(),
            baseline
        ),
    );
    Ok((data, baseline))
}

/// Display-ready statistics and geometry of one 1D or 2D spectrum.
#[derive(Debug, Clone)]
pub struct SpectrumAnalysis {
    data: IntensityArray,
    axes: Vec<Axis>,
    options: AnalysisOptions,
    normalized: bool,
    stats: Statistics,
}

impl SpectrumAnalysis {
    /// Analyse a spectrum handed over by a format reader.
    ///
    /// Fails with `UnsupportedRank` for anything but 1D/2D data.
    pub fn new(
        raw: RawSpectrum,
        options: AnalysisOptions,
        log: &mut AnalysisLog,
    ) -> Result<Self, AnalysisError> {
        options.validate()?;
        let axes = axis::map_axes(&raw.dimensions, raw.data.shape())?;
        let axes_desc: Vec<String> = axes
            .iter()
            .map(|a| format!("{} {} pts {:.3}..{:.3} ppm", a.label, a.point_count, a.ppm.high, a.ppm.low))
            .collect();
        log.add_entry("Axes", &axes_desc.join(", "));

        let data = raw.data;
        if let Some(bad) = data.values().iter().find(|v| !v.is_finite()) {
            return Err(AnalysisError::invalid(
                "data",
                bad,
                "intensities must be finite",
            ));
        }

        let baseline = baseline::estimate_baseline(&data);
        log.add_entry(
            "Baseline",
            &format!("left edge of modal histogram bin: {:.6e}", baseline),
        );

        let (data, baseline) = if options.normalize {
            normalize_stage(&data, baseline, log)?
        } else {
            (data, baseline)
        };
        let normalized = options.normalize;
        Self::measure(data, axes, options, normalized, baseline, log)
    }

    fn measure(
        data: IntensityArray,
        axes: Vec<Axis>,
        options: AnalysisOptions,
        normalized: bool,
        baseline: f64,
        log: &mut AnalysisLog,
    ) -> Result<Self, AnalysisError> {
        let stats = Statistics::measure(&data, baseline, &options)?;
        log.add_entry(
            "Noise/Signal",
            &format!(
                "noise {:.6e}, {} signal {:.6e}, SNR {:.2}",
                stats.noise, options.sign, stats.signal, stats.snr
            ),
        );
        let origin = if options.threshold.is_some() {
            "override"
        } else {
            "derived"
        };
        log.add_entry(
            "Threshold",
            &format!("{:.4} x noise ({})", stats.threshold, origin),
        );
        Ok(Self {
            data,
            axes,
            options,
            normalized,
            stats,
        })
    }

    /// Recentre on the baseline and rescale: `(v - baseline) / |baseline|`.
    ///
    /// Returns a new analysis over the normalized array with every statistic
    /// re-derived. An already normalized analysis is returned unchanged.
    pub fn normalize(self, log: &mut AnalysisLog) -> Result<Self, AnalysisError> {
        if self.normalized {
            log::debug!("Spectrum already normalized");
            return Ok(self);
        }
        let (data, baseline) = normalize_stage(&self.data, self.stats.baseline, log)?;
        let options = AnalysisOptions {
            normalize: true,
            ..self.options
        };
        Self::measure(data, self.axes, options, true, baseline, log)
    }

    /// Replace the threshold with an explicit multiple of the noise.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, AnalysisError> {
        check_threshold(threshold)?;
        self.options.threshold = Some(threshold);
        self.stats.threshold = threshold;
        Ok(self)
    }

    pub fn rank(&self) -> usize {
        self.data.rank()
    }

    pub fn data(&self) -> &IntensityArray {
        &self.data
    }

    /// Axes in display order (directly detected dimension first).
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn labels(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.label.as_str()).collect()
    }

    /// `[high, low]` per axis in display order.
    pub fn ppm_ranges(&self) -> Vec<f64> {
        axis::flat_ppm_ranges(&self.axes)
    }

    pub fn coordinate_grid(&self) -> Result<CoordinateGrid, AnalysisError> {
        CoordinateGrid::from_axes(&self.axes)
    }

    pub fn histogram(&self) -> Histogram {
        Histogram::compute(self.data.values())
    }

    pub fn sign(&self) -> SignPolicy {
        self.options.sign
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn baseline(&self) -> f64 {
        self.stats.baseline
    }

    pub fn signal(&self) -> f64 {
        self.stats.signal
    }

    pub fn noise(&self) -> f64 {
        self.stats.noise
    }

    pub fn snr(&self) -> f64 {
        self.stats.snr
    }

    pub fn threshold(&self) -> f64 {
        self.stats.threshold
    }

    /// `baseline + threshold * noise`
    pub fn start_level(&self) -> f64 {
        levels::start_level(self.stats.baseline, self.stats.threshold, self.stats.noise)
    }

    /// Geometric contour ladder for this analysis' sign policy.
    pub fn contour_levels(&self, nlevs: usize, factor: f64) -> Result<Vec<f64>, AnalysisError> {
        levels::contour_levels(self.options.sign, self.start_level(), nlevs, factor)
    }
}
