/// Renderer hand-off
///
/// Everything a plotting backend needs to draw an analysed spectrum: the
/// coordinate grid, intensities, ppm extent, axis titles, color map and, for
/// 2D spectra, the contour ladder. Drawing itself happens elsewhere.

pub mod colormap;

use egui::Color32;

use crate::analysis::{CoordinateGrid, SignPolicy, SpectrumAnalysis};
use crate::data::spectrum::IntensityArray;
use crate::error::AnalysisError;

pub use colormap::ColorMap;

/// Line width for 1D traces.
pub const TRACE_LINE_WIDTH: f32 = 1.0;
/// Line width for 2D contours.
pub const CONTOUR_LINE_WIDTH: f32 = 0.5;

/// Two-signed spectra always use the diverging map.
pub fn resolve_colormap(sign: SignPolicy, requested: ColorMap) -> ColorMap {
    match sign {
        SignPolicy::Both if !requested.is_diverging() => {
            log::warn!(
                "Color map '{}' ignored: sign=both is drawn with 'coolwarm'",
                requested
            );
            ColorMap::Coolwarm
        }
        _ => requested,
    }
}

#[derive(Debug, Clone)]
pub struct PlotRequest {
    pub grid: CoordinateGrid,
    pub data: IntensityArray,
    /// `[high, low]` per axis, display order
    pub ppm_ranges: Vec<f64>,
    pub x_title: String,
    pub y_title: String,
    pub sign: SignPolicy,
    pub colormap: ColorMap,
    pub line_width: f32,
    /// Contour levels, 2D only
    pub levels: Option<Vec<f64>>,
}

impl PlotRequest {
    /// Bundle `analysis` for drawing. 2D spectra get a fresh contour ladder.
    pub fn build(
        analysis: &SpectrumAnalysis,
        colormap: ColorMap,
        nlevs: usize,
        factor: f64,
    ) -> Result<Self, AnalysisError> {
        let labels = analysis.labels();
        let sign = analysis.sign();
        let colormap = resolve_colormap(sign, colormap);
        let grid = analysis.coordinate_grid()?;

        let (y_title, line_width, levels) = match analysis.rank() {
            1 => ("Intensity (A.U.)".to_string(), TRACE_LINE_WIDTH, None),
            2 => (
                format!("{} ppm", labels[1]),
                CONTOUR_LINE_WIDTH,
                Some(analysis.contour_levels(nlevs, factor)?),
            ),
            rank => return Err(AnalysisError::UnsupportedRank { rank }),
        };

        Ok(Self {
            grid,
            data: analysis.data().clone(),
            ppm_ranges: analysis.ppm_ranges(),
            x_title: format!("{} ppm", labels[0]),
            y_title,
            sign,
            colormap,
            line_width,
            levels,
        })
    }

    /// Color-scale limits `(min * 1.2, max * 0.8)` of the contour ladder.
    pub fn color_limits(&self) -> Option<(f64, f64)> {
        let levels = self.levels.as_ref().filter(|l| !l.is_empty())?;
        let lo = levels.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = levels.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo * 1.2, hi * 0.8))
    }

    /// One color per contour level, placed on the map by `color_limits`.
    pub fn level_colors(&self) -> Vec<Color32> {
        let (Some(levels), Some((vmin, vmax))) = (self.levels.as_ref(), self.color_limits()) else {
            return Vec::new();
        };
        let span = vmax - vmin;
        levels
            .iter()
            .map(|&v| {
                let t = if span != 0.0 { (v - vmin) / span } else { 0.5 };
                self.colormap.color_at(t)
            })
            .collect()
    }
}
