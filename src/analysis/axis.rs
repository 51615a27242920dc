/// Axis mapping: acquisition metadata to chemical-shift (ppm) axes
///
/// Metadata arrives outer-to-inner (slowest dimension first). Display order
/// is the reverse: the directly detected dimension is the first plotted axis.

use serde::{Deserialize, Serialize};

use crate::data::spectrum::Dimension;
use crate::error::AnalysisError;

/// ppm bounds of one axis; `high > low` (ppm increases right-to-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PpmRange {
    pub high: f64,
    pub low: f64,
}

impl PpmRange {
    /// Limits for one dimension, centred on the carrier.
    pub fn from_dimension(dim: &Dimension) -> Result<Self, AnalysisError> {
        if !(dim.sweep_width_hz.is_finite() && dim.sweep_width_hz > 0.0) {
            return Err(AnalysisError::invalid(
                "sweep_width_hz",
                dim.sweep_width_hz,
                "must be positive",
            ));
        }
        if !(dim.observed_freq_mhz.is_finite() && dim.observed_freq_mhz > 0.0) {
            return Err(AnalysisError::invalid(
                "observed_freq_mhz",
                dim.observed_freq_mhz,
                "must be positive",
            ));
        }
        if !dim.carrier_hz.is_finite() {
            return Err(AnalysisError::invalid(
                "carrier_hz",
                dim.carrier_hz,
                "must be finite",
            ));
        }
        let center = dim.carrier_hz / dim.observed_freq_mhz;
        let half_width = dim.sweep_width_hz / dim.observed_freq_mhz / 2.0;
        Ok(Self {
            high: center + half_width,
            low: center - half_width,
        })
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// `n` evenly spaced values from `high` down to `low`, both included.
    pub fn scale(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.high],
            _ => {
                let step = self.width() / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { self.low } else { self.high - i as f64 * step })
                    .collect()
            }
        }
    }
}

/// One display axis: metadata, point count and ppm limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub label: String,
    pub sweep_width_hz: f64,
    pub observed_freq_mhz: f64,
    pub point_count: usize,
    pub ppm: PpmRange,
}

impl Axis {
    pub fn ppm_scale(&self) -> Vec<f64> {
        self.ppm.scale(self.point_count)
    }
}

/// Map native-order metadata and array shape to display-order axes.
pub fn map_axes(dimensions: &[Dimension], shape: &[usize]) -> Result<Vec<Axis>, AnalysisError> {
    let rank = shape.len();
    if !(1..=2).contains(&rank) {
        return Err(AnalysisError::UnsupportedRank { rank });
    }
    if dimensions.len() != rank {
        return Err(AnalysisError::DimensionMismatch {
            dimensions: dimensions.len(),
            rank,
        });
    }

    dimensions
        .iter()
        .zip(shape)
        .rev()
        .map(|(dim, &points)| {
            if points < 2 {
                return Err(AnalysisError::invalid(
                    "point_count",
                    points,
                    "each dimension needs at least two points",
                ));
            }
            let ppm = PpmRange::from_dimension(dim)?;
            log::debug!(
                "Axis {}: {} points, {:.3}..{:.3} ppm",
                dim.label,
                points,
                ppm.high,
                ppm.low
            );
            Ok(Axis {
                label: dim.label.clone(),
                sweep_width_hz: dim.sweep_width_hz,
                observed_freq_mhz: dim.observed_freq_mhz,
                point_count: points,
                ppm,
            })
        })
        .collect()
}

/// Flatten axes into `[high0, low0, high1, low1, ...]`.
pub fn flat_ppm_ranges(axes: &[Axis]) -> Vec<f64> {
    axes.iter().flat_map(|a| [a.ppm.high, a.ppm.low]).collect()
}

/// Plotting coordinates for a spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoordinateGrid {
    /// 1D: one ppm value per point
    Line(Vec<f64>),
    /// 2D meshgrid: `x[row][col]` follows the direct axis, `y[row][col]` the
    /// indirect one
    Mesh { x: Vec<Vec<f64>>, y: Vec<Vec<f64>> },
}

impl CoordinateGrid {
    /// Build the grid for display-order axes.
    pub fn from_axes(axes: &[Axis]) -> Result<Self, AnalysisError> {
        match axes {
            [x] => Ok(CoordinateGrid::Line(x.ppm_scale())),
            [x, y] => {
                let xs = x.ppm_scale();
                let ys = y.ppm_scale();
                let x_mesh = ys.iter().map(|_| xs.clone()).collect();
                let y_mesh = ys.iter().map(|&v| vec![v; xs.len()]).collect();
                Ok(CoordinateGrid::Mesh {
                    x: x_mesh,
                    y: y_mesh,
                })
            }
            _ => Err(AnalysisError::UnsupportedRank { rank: axes.len() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proton() -> Dimension {
        // 6000 Hz at 600 MHz centred on 4.7 ppm
        Dimension::new("1H", 6000.0, 600.0, 2820.0)
    }

    fn carbon() -> Dimension {
        // 30000 Hz at 150 MHz centred on 80 ppm
        Dimension::new("13C", 30000.0, 150.0, 12000.0)
    }

    #[test]
    fn test_ppm_range_formula() {
        let r = PpmRange::from_dimension(&proton()).unwrap();
        assert!((r.high - 9.7).abs() < 1e-12);
        assert!((r.low - -0.3).abs() < 1e-12);
        assert!(r.high > r.low);
    }

    #[test]
    fn test_map_axes_reverses_native_order() {
        let axes = map_axes(&[carbon(), proton()], &[4, 8]).unwrap();
        assert_eq!(axes[0].label, "1H");
        assert_eq!(axes[0].point_count, 8);
        assert_eq!(axes[1].label, "13C");
        assert_eq!(axes[1].point_count, 4);

        let flat = flat_ppm_ranges(&axes);
        assert_eq!(flat.len(), 4);
        assert!((flat[0] - 9.7).abs() < 1e-12);
        assert!((flat[1] - -0.3).abs() < 1e-12);
        assert!((flat[2] - 180.0).abs() < 1e-12);
        assert!((flat[3] - -20.0).abs() < 1e-12);
        for pair in flat.chunks(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_map_axes_rejects_bad_input() {
        assert_eq!(
            map_axes(&[proton(), proton(), proton()], &[2, 2, 2]),
            Err(AnalysisError::UnsupportedRank { rank: 3 })
        );
        assert_eq!(
            map_axes(&[proton()], &[4, 4]),
            Err(AnalysisError::DimensionMismatch {
                dimensions: 1,
                rank: 2
            })
        );
        assert!(map_axes(&[proton()], &[1]).is_err());
        let bad = Dimension::new("1H", 0.0, 600.0, 0.0);
        assert!(map_axes(&[bad], &[16]).is_err());
    }

    #[test]
    fn test_scale_spans_high_to_low() {
        let r = PpmRange { high: 10.0, low: 0.0 };
        assert_eq!(r.scale(5), vec![10.0, 7.5, 5.0, 2.5, 0.0]);
        assert!(r.scale(0).is_empty());
    }

    #[test]
    fn test_mesh_grid_broadcasts() {
        let axes = map_axes(&[carbon(), proton()], &[3, 4]).unwrap();
        match CoordinateGrid::from_axes(&axes).unwrap() {
            CoordinateGrid::Mesh { x, y } => {
                assert_eq!(x.len(), 3);
                assert_eq!(x[0].len(), 4);
                assert_eq!(x[0], x[2]);
                assert!((x[1][0] - 9.7).abs() < 1e-12);
                assert!((y[0][0] - 180.0).abs() < 1e-12);
                assert!((y[2][3] - -20.0).abs() < 1e-12);
                assert!(y[1].iter().all(|&v| (v - 80.0).abs() < 1e-12));
            }
            other => panic!("expected a mesh, got {:?}", other),
        }
    }
}
