/// nmrplot: analyse a processed 1D or 2D Bruker spectrum for plotting.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use nmrplot::analysis::levels::{DEFAULT_FACTOR, DEFAULT_FRACTION, DEFAULT_NLEVS};
use nmrplot::analysis::PpmRange;
use nmrplot::data::bruker;
use nmrplot::log::AnalysisLog;
use nmrplot::{AnalysisError, AnalysisOptions, ColorMap, PlotRequest, SignPolicy, SpectrumAnalysis};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "nmrplot",
    version,
    about = "Derive baseline, noise and contour levels of a 1D or 2D Bruker NMR spectrum"
)]
struct Cli {
    /// Path to the experiment folder (experiment_name/expno)
    path: PathBuf,

    /// Number of processing in the Bruker experiment
    #[arg(short, long, default_value_t = 1)]
    pdata: u32,

    /// How many times the noise level the lowest contour sits above the baseline
    #[arg(short, long)]
    threshold: Option<f64>,

    /// First contour as a fraction of the signal (ignored with --threshold)
    #[arg(long, default_value_t = DEFAULT_FRACTION)]
    fraction: f64,

    /// Color map: viridis, red, blue, green, purple, orange, grey, light_red,
    /// light_blue, coolwarm (always used with sign=both)
    #[arg(short, long, default_value = "viridis")]
    cmap: ColorMap,

    /// Number of contour levels to draw
    #[arg(short, long, default_value_t = DEFAULT_NLEVS)]
    nlevs: usize,

    /// Increment factor between contour levels
    #[arg(short, long, default_value_t = DEFAULT_FACTOR)]
    factor: f64,

    /// Which contours to draw: positive, negative or both
    #[arg(short, long, default_value = "positive")]
    sign: SignPolicy,

    /// Keep raw intensities instead of rescaling to the baseline
    #[arg(long, default_value_t = false)]
    no_normalize: bool,

    /// Print the intensity histogram
    #[arg(long, default_value_t = false)]
    histogram: bool,

    /// Print the analysis log
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    ::log::debug!("nmrplot v{}", env!("CARGO_PKG_VERSION"));

    let raw = bruker::read_processed(&cli.path, cli.pdata)?;
    println!("Loaded {}D spectrum {}", raw.rank(), raw.labels().join(" / "));

    let mut analysis_log = AnalysisLog::new();
    analysis_log.set_source(&raw.source_path.display().to_string());

    let options = AnalysisOptions {
        sign: cli.sign,
        fraction: cli.fraction,
        threshold: cli.threshold,
        normalize: !cli.no_normalize,
    };
    let analysis = match SpectrumAnalysis::new(raw, options, &mut analysis_log) {
        Ok(a) => a,
        Err(AnalysisError::UnsupportedRank { rank }) => {
            ::log::warn!("{}D spectra are not analysed", rank);
            println!("The spectrum is not 1D or 2D");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    print_summary(&analysis);

    if cli.histogram {
        print!("{}", analysis.histogram().to_text());
    }

    let request = PlotRequest::build(&analysis, cli.cmap, cli.nlevs, cli.factor)
        .map_err(|e| explain_levels_error(e, analysis.is_normalized()))?;
    match &request.levels {
        Some(levels) => {
            analysis_log.add_entry(
                "Contour levels",
                &format!(
                    "{} levels, factor {}, start {:.6e}",
                    levels.len(),
                    cli.factor,
                    analysis.start_level()
                ),
            );
            println!("Color map: {}", request.colormap);
            println!("Contour levels ({}):", levels.len());
            for level in levels {
                println!("  {:.6e}", level);
            }
        }
        None => {
            let axis = &analysis.axes()[0];
            print_extent(&axis.label, &axis.ppm);
        }
    }

    match cli.report {
        Some(ReportFormat::Text) => print!("{}", analysis_log.to_text()),
        Some(ReportFormat::Json) => println!("{}", analysis_log.to_json()?),
        None => {}
    }

    Ok(())
}

/// Point at `--no-normalize` when a raw baseline drags the first contour
/// below zero.
fn explain_levels_error(err: AnalysisError, normalized: bool) -> Box<dyn std::error::Error> {
    match err {
        AnalysisError::InvalidParameter {
            name: "start_level", ..
        } if !normalized => format!(
            "{}; the raw baseline is below zero because of --no-normalize, \
             drop that flag or pass a larger --threshold",
            err
        )
        .into(),
        err => err.into(),
    }
}

fn print_summary(analysis: &SpectrumAnalysis) {
    let stats = analysis.statistics();
    println!("Sign:       {}", analysis.sign());
    println!("Normalized: {}", analysis.is_normalized());
    println!("Baseline:   {:.6e}", stats.baseline);
    println!("Noise:      {:.6e}", stats.noise);
    println!("Signal:     {:.6e}", stats.signal);
    println!("SNR:        {:.2}", stats.snr);
    println!("Threshold:  {:.4} x noise", stats.threshold);
    if analysis.rank() == 2 {
        for axis in analysis.axes() {
            print_extent(&axis.label, &axis.ppm);
        }
    }
}

fn print_extent(label: &str, ppm: &PpmRange) {
    println!("{} ppm:     {:.3} .. {:.3}", label, ppm.high, ppm.low);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negative_start() -> AnalysisError {
        AnalysisError::InvalidParameter {
            name: "start_level",
            value: "-480".to_string(),
            reason: "first contour must lie above zero",
        }
    }

    #[test]
    fn test_negative_start_mentions_no_normalize() {
        let msg = explain_levels_error(negative_start(), false).to_string();
        assert!(msg.contains("--no-normalize"), "{}", msg);
        assert!(msg.contains("-480"));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let msg = explain_levels_error(negative_start(), true).to_string();
        assert!(!msg.contains("--no-normalize"));
        let factor = AnalysisError::InvalidParameter {
            name: "factor",
            value: "1".to_string(),
            reason: "must be greater than 1",
        };
        assert_eq!(explain_levels_error(factor.clone(), false).to_string(), factor.to_string());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["nmrplot", "exp/1"]).unwrap();
        assert_eq!(cli.pdata, 1);
        assert_eq!(cli.nlevs, DEFAULT_NLEVS);
        assert_eq!(cli.sign, SignPolicy::Positive);
        assert_eq!(cli.cmap, ColorMap::Viridis);
        assert!(!cli.no_normalize);
    }
}
