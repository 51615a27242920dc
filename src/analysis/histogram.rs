use serde::{Deserialize, Serialize};

/// Fixed number of histogram bins.
pub const BIN_COUNT: usize = 256;

/// Intensity histogram: `counts[i]` values fell in `[edges[i], edges[i + 1])`,
/// the last bin being closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub counts: Vec<u64>,
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Bin `values` into [`BIN_COUNT`] equal-width bins spanning their range.
    ///
    /// A constant input gets the range `[v - 0.5, v + 0.5]`. Non-finite
    /// values are skipped.
    pub fn compute(values: &[f64]) -> Self {
        let (mut lo, mut hi) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() {
            lo = 0.0;
            hi = 1.0;
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / BIN_COUNT as f64;
        let edges: Vec<f64> = (0..=BIN_COUNT)
            .map(|i| if i == BIN_COUNT { hi } else { lo + i as f64 * width })
            .collect();

        let mut counts = vec![0u64; BIN_COUNT];
        for &v in values.iter().filter(|v| v.is_finite()) {
            let bin = (((v - lo) / width) as usize).min(BIN_COUNT - 1);
            counts[bin] += 1;
        }

        Self { counts, edges }
    }

    /// Index of the first bin with the highest count.
    pub fn mode_bin(&self) -> usize {
        let mut best = 0;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > self.counts[best] {
                best = i;
            }
        }
        best
    }

    /// Left edge of the modal bin.
    pub fn mode_edge(&self) -> f64 {
        self.edges[self.mode_bin()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Text rendering for diagnostics: one line per non-empty bin.
    pub fn to_text(&self) -> String {
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();
        for (i, &c) in self.counts.iter().enumerate() {
            if c == 0 {
                continue;
            }
            let bar = ((c as f64 / peak as f64) * 50.0).ceil() as usize;
            out.push_str(&format!(
                "{:>14.6e} .. {:>14.6e} | {:>9} {}\n",
                self.edges[i],
                self.edges[i + 1],
                c,
                "#".repeat(bar)
            ));
        }
        out
    }
}
