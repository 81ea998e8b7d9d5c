use super::CliError;
use super::helpers::{
    ArtifactPaths, BatchDiscovery, DEFAULT_INPUT_PATTERN, DEFAULT_REPORT_NAME, ensure_output_dir,
};
use super::reader::read_spectrum;
use super::report::{
    BatchReport, FileReport, SkippedReport, TransitionReport, render_fit_summary,
    render_tauc_table, render_transformed_table, write_json_report, write_text_artifact,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tauc_core::common::config::{PipelineConfig, SmoothingParams, load_pipeline_config};
use tauc_core::common::constants::{DEFAULT_DERIVATIVE_ORDER, DEFAULT_DERIVATIVE_WINDOW};
use tauc_core::domain::{Spectrum, TaucError, TaucSeries, TransitionKind};
use tauc_core::modules::BandGapEstimator;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TransitionSelection {
    Direct,
    Indirect,
    Both,
}

impl TransitionSelection {
    /// Accepts transition names and their Tauc exponents (`2`, `0.5`), plus `both`.
    fn parse(token: &str) -> Result<Self, String> {
        if token.trim().eq_ignore_ascii_case("both") {
            return Ok(Self::Both);
        }
        match TransitionKind::from_token(token) {
            Some(TransitionKind::Direct) => Ok(Self::Direct),
            Some(TransitionKind::Indirect) => Ok(Self::Indirect),
            None => Err(format!(
                "unknown transition '{}'; expected direct (2), indirect (0.5), or both",
                token
            )),
        }
    }

    fn kinds(self) -> Vec<TransitionKind> {
        match self {
            Self::Direct => vec![TransitionKind::Direct],
            Self::Indirect => vec![TransitionKind::Indirect],
            Self::Both => TransitionKind::ALL.to_vec(),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub(super) struct PipelineFlags {
    /// JSON pipeline configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transitions to estimate
    #[arg(long, value_parser = TransitionSelection::parse, default_value = "both")]
    transition: TransitionSelection,

    /// Treat the second column as diffuse reflectance (%) and apply Kubelka-Munk
    #[arg(long)]
    reflectance: bool,

    /// Multiply absorbance by this coefficient before the Tauc transform
    #[arg(long, value_name = "COEFFICIENT")]
    normalize: Option<f64>,

    /// Convert decadic absorbance to natural-log absorption (x 2.303)
    #[arg(long)]
    decadic: bool,

    /// Savitzky-Golay window for the Tauc curve
    #[arg(long)]
    smoothing_window: Option<usize>,

    /// Savitzky-Golay polynomial order for the Tauc curve
    #[arg(long)]
    smoothing_order: Option<usize>,

    /// Savitzky-Golay window for the derivative
    #[arg(long, conflicts_with = "no_derivative_smoothing")]
    derivative_window: Option<usize>,

    /// Savitzky-Golay polynomial order for the derivative
    #[arg(long, conflicts_with = "no_derivative_smoothing")]
    derivative_order: Option<usize>,

    /// Locate the edge on the raw derivative
    #[arg(long)]
    no_derivative_smoothing: bool,

    /// Regression half-window radius in points
    #[arg(long)]
    half_window: Option<usize>,

    /// Points before the peak where the extrapolated line ends
    #[arg(long)]
    extrapolation_margin: Option<usize>,
}

impl PipelineFlags {
    fn resolve(&self) -> Result<(PipelineConfig, Vec<TransitionKind>), CliError> {
        let mut config = match &self.config {
            Some(path) => load_pipeline_config(path).map_err(CliError::Compute)?,
            None => PipelineConfig::default(),
        };

        let transform = &mut config.transform;
        transform.reflectance |= self.reflectance;
        transform.decadic_to_natural |= self.decadic;
        if self.normalize.is_some() {
            transform.normalization = self.normalize;
        }

        let estimator = &mut config.estimator;
        if let Some(window) = self.smoothing_window {
            estimator.smoothing.window = window;
        }
        if let Some(order) = self.smoothing_order {
            estimator.smoothing.order = order;
        }
        if self.no_derivative_smoothing {
            estimator.derivative_smoothing = None;
        } else if self.derivative_window.is_some() || self.derivative_order.is_some() {
            let base = estimator.derivative_smoothing.unwrap_or(SmoothingParams::new(
                DEFAULT_DERIVATIVE_WINDOW,
                DEFAULT_DERIVATIVE_ORDER,
            ));
            estimator.derivative_smoothing = Some(SmoothingParams::new(
                self.derivative_window.unwrap_or(base.window),
                self.derivative_order.unwrap_or(base.order),
            ));
        }
        if let Some(radius) = self.half_window {
            estimator.half_window = radius;
        }
        if let Some(margin) = self.extrapolation_margin {
            estimator.extrapolation_margin = margin;
        }

        config.validate().map_err(CliError::Compute)?;
        Ok((config, self.transition.kinds()))
    }
}

#[derive(clap::Args, Debug)]
pub(super) struct ProcessArgs {
    /// Directory containing spectrum files
    #[arg(default_value = ".")]
    input_dir: PathBuf,

    /// File name glob selecting spectra inside the directory
    #[arg(long, default_value = DEFAULT_INPUT_PATTERN)]
    pattern: String,

    /// Directory for generated artifacts (default: next to each input)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON report path (default: <output dir>/bandgap-report.json)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Reprocess inputs whose outputs already exist
    #[arg(long)]
    force: bool,

    /// Worker threads (default: one per core)
    #[arg(long)]
    jobs: Option<usize>,

    #[command(flatten)]
    pipeline: PipelineFlags,
}

#[derive(clap::Args, Debug)]
pub(super) struct EstimateArgs {
    /// Spectrum file
    input: PathBuf,

    /// Write tables and fit summaries into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    pipeline: PipelineFlags,
}

pub(super) fn run_process_command(args: ProcessArgs) -> Result<i32, CliError> {
    let (config, kinds) = args.pipeline.resolve()?;
    let estimator = BandGapEstimator::new(config).map_err(CliError::Compute)?;

    let discovery = BatchDiscovery::new(&args.pattern, args.output_dir.as_deref(), args.force)?;
    let discovered = discovery.discover(&args.input_dir)?;
    for skipped in &discovered.skipped {
        info!(input = %skipped.path.display(), reason = skipped.reason, "skipping input");
    }
    if let Some(output_dir) = &args.output_dir {
        ensure_output_dir(output_dir).map_err(CliError::Compute)?;
    }

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        if jobs == 0 {
            return Err(CliError::Usage(
                "Invalid job count '0'; expected a positive integer.".to_string(),
            ));
        }
        pool = pool.num_threads(jobs);
    }
    let pool = pool
        .build()
        .map_err(|source| CliError::Internal(anyhow::Error::new(source)))?;

    let output_dir = args.output_dir.as_deref();
    let files: Vec<FileReport> = pool.install(|| {
        discovered
            .pending
            .par_iter()
            .map(|path| process_file(&estimator, path, &kinds, output_dir))
            .collect()
    });

    for file in &files {
        print_file_summary(file);
    }

    let skipped = discovered
        .skipped
        .into_iter()
        .map(|skip| SkippedReport {
            input: skip.path,
            reason: skip.reason,
        })
        .collect();
    let report = BatchReport::new(&args.input_dir, files, skipped);
    let report_path = args.report.unwrap_or_else(|| {
        output_dir
            .unwrap_or(args.input_dir.as_path())
            .join(DEFAULT_REPORT_NAME)
    });
    write_json_report(&report_path, &report).map_err(CliError::Compute)?;

    println!(
        "Processed {} file(s): {} succeeded, {} failed, {} skipped.",
        report.summary.processed,
        report.summary.succeeded,
        report.summary.failed,
        report.summary.skipped
    );
    println!("JSON report: {}", report_path.display());

    if report.passed() { Ok(0) } else { Ok(1) }
}

pub(super) fn run_estimate_command(args: EstimateArgs) -> Result<i32, CliError> {
    let (config, kinds) = args.pipeline.resolve()?;
    let estimator = BandGapEstimator::new(config).map_err(CliError::Compute)?;

    // A single unreadable input is fatal rather than a report entry.
    let spectrum = read_spectrum(&args.input).map_err(CliError::Compute)?;
    let report = match &args.output_dir {
        Some(output_dir) => {
            ensure_output_dir(output_dir).map_err(CliError::Compute)?;
            process_spectrum(&estimator, &args.input, &spectrum, &kinds, Some(output_dir))
        }
        None => estimate_spectrum(&estimator, &args.input, &spectrum, &kinds),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|source| CliError::Internal(anyhow::Error::new(source)))?;
        println!("{}", json);
    } else {
        print_file_summary(&report);
    }

    if report.is_success() { Ok(0) } else { Ok(1) }
}

fn process_file(
    estimator: &BandGapEstimator,
    path: &Path,
    kinds: &[TransitionKind],
    output_dir: Option<&Path>,
) -> FileReport {
    info!(input = %path.display(), "processing spectrum");
    match read_spectrum(path) {
        Ok(spectrum) => process_spectrum(estimator, path, &spectrum, kinds, output_dir),
        Err(error) => file_failure(FileReport::new(path), &error),
    }
}

/// Estimate every requested transition and write all artifacts for one input.
fn process_spectrum(
    estimator: &BandGapEstimator,
    path: &Path,
    spectrum: &Spectrum,
    kinds: &[TransitionKind],
    output_dir: Option<&Path>,
) -> FileReport {
    let mut report = FileReport::new(path);
    let artifacts = ArtifactPaths::for_input(path, output_dir);
    let prepared = match estimator.transform().prepare(spectrum) {
        Ok(prepared) => prepared,
        Err(error) => return file_failure(report, &error),
    };

    // The table always carries the direct column; indirect only when requested.
    let mut series: Vec<TaucSeries> = Vec::with_capacity(TransitionKind::ALL.len());
    for kind in TransitionKind::ALL {
        let requested = kinds.contains(&kind);
        if kind == TransitionKind::Indirect && !requested {
            continue;
        }
        match estimator.transform().tauc_from_prepared(&prepared, kind) {
            Ok(transition) => series.push(transition),
            Err(error) => {
                warn!(input = %path.display(), transition = %kind, "{}", error.diagnostic_line());
                if requested {
                    report.transitions.push(TransitionReport::failed(kind, &error));
                }
            }
        }
    }

    if let Err(error) = ensure_output_dir(artifacts.output_dir()) {
        return file_failure(report, &error);
    }
    let columns: Vec<&TaucSeries> = series.iter().collect();
    let table = render_transformed_table(&prepared, &columns);
    if let Err(error) = write_text_artifact(&artifacts.table, &table) {
        return file_failure(report, &error);
    }
    report.outputs.push(artifacts.table.clone());

    for transition in series
        .into_iter()
        .filter(|transition| kinds.contains(&transition.kind))
    {
        let kind = transition.kind;
        match estimator.analyze_series(transition) {
            Ok(analysis) => {
                let tauc_path = artifacts.tauc(kind);
                let fit_path = artifacts.fit(kind);
                let written = write_text_artifact(&tauc_path, &render_tauc_table(&analysis))
                    .and_then(|()| {
                        write_text_artifact(&fit_path, &render_fit_summary(&analysis))
                    });
                if let Err(error) = written {
                    return file_failure(report, &error);
                }
                report.outputs.extend([tauc_path, fit_path]);
                report.transitions.push(TransitionReport::succeeded(
                    &analysis.result,
                    analysis.extrapolation.as_ref().ok().map(|range| range.x),
                ));
            }
            Err(error) => {
                warn!(input = %path.display(), transition = %kind, "{}", error.diagnostic_line());
                report.transitions.push(TransitionReport::failed(kind, &error));
            }
        }
    }

    report.transitions.sort_by_key(|transition| transition.transition);
    report
}

/// Estimate without writing artifacts.
fn estimate_spectrum(
    estimator: &BandGapEstimator,
    path: &Path,
    spectrum: &Spectrum,
    kinds: &[TransitionKind],
) -> FileReport {
    let mut report = FileReport::new(path);
    let prepared = match estimator.transform().prepare(spectrum) {
        Ok(prepared) => prepared,
        Err(error) => return file_failure(report, &error),
    };

    for &kind in kinds {
        let transition = match estimator.analyze_prepared(&prepared, kind) {
            Ok(analysis) => TransitionReport::succeeded(
                &analysis.result,
                analysis.extrapolation.as_ref().ok().map(|range| range.x),
            ),
            Err(error) => {
                warn!(input = %path.display(), transition = %kind, "{}", error.diagnostic_line());
                TransitionReport::failed(kind, &error)
            }
        };
        report.transitions.push(transition);
    }
    report
}

fn file_failure(report: FileReport, error: &TaucError) -> FileReport {
    warn!(input = %report.input.display(), "{}", error.diagnostic_line());
    report.with_error(error)
}

fn print_file_summary(report: &FileReport) {
    let name = report.input.display();
    if let Some(error) = &report.error {
        println!("{}: ERROR: [{}] {}", name, error.placeholder, error.message);
        return;
    }
    for transition in &report.transitions {
        match (&transition.band_gap_ev, &transition.error) {
            (Some(energy), _) => println!(
                "{}: {} band gap = {:.2} eV",
                name, transition.transition, energy
            ),
            (None, Some(error)) => println!(
                "{}: {} ERROR: [{}] {}",
                name, transition.transition, error.placeholder, error.message
            ),
            (None, None) => {}
        }
    }
}
