//! Plot-ready text tables, fit summaries, and the JSON batch report.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tauc_core::domain::{
    BandGapResult, RegressionFit, TaucError, TaucSeries, TransitionAnalysis, TransitionKind,
};
use tauc_core::modules::transform::PreparedSpectrum;

pub(super) fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

pub(super) fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub(super) fn write_text_artifact(path: &Path, content: &str) -> Result<(), TaucError> {
    fs::write(path, normalize_text_artifact(content)).map_err(|source| {
        TaucError::io_system(
            "IO.ARTIFACT_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}

/// Transformed spectrum as CSV: wavelength, processed absorbance, energy, and
/// one column per Tauc series in the given order (direct first, then indirect).
pub(super) fn render_transformed_table(
    prepared: &PreparedSpectrum,
    series: &[&TaucSeries],
) -> String {
    let mut header = vec!["Wavelength (nm)", "Absorbance", "Energy (eV)"];
    header.extend(series.iter().map(|series| series.kind.label()));

    let mut lines = Vec::with_capacity(prepared.len() + 1);
    lines.push(header.join(","));
    for index in 0..prepared.len() {
        let mut row = vec![
            prepared.wavelength_nm[index].to_string(),
            prepared.absorbance[index].to_string(),
            prepared.energy_ev[index].to_string(),
        ];
        row.extend(series.iter().map(|series| series.tauc[index].to_string()));
        lines.push(row.join(","));
    }
    lines.join("\n")
}

pub(super) fn render_tauc_table(analysis: &TransitionAnalysis) -> String {
    let mut lines = Vec::with_capacity(analysis.series.len() + 1);
    lines.push(format!(
        "Energy (eV),{},Smoothed",
        analysis.series.kind.label()
    ));
    for ((energy, tauc), smoothed) in analysis.series.points().zip(&analysis.smoothed) {
        lines.push(format!("{energy},{tauc},{smoothed}"));
    }
    lines.join("\n")
}

pub(super) fn render_fit_summary(analysis: &TransitionAnalysis) -> String {
    let result = &analysis.result;
    let fit = &result.fit;
    let mut lines = vec![
        format!("transition      {}", result.transition_kind),
        format!("exponent        {}", analysis.series.exponent),
        format!("band_gap_ev     {}", format_fixed_f64(result.energy_ev, 14, 6)),
        format!("slope           {}", format_fixed_f64(fit.slope, 14, 6)),
        format!("intercept       {}", format_fixed_f64(fit.intercept, 14, 6)),
        format!("rvalue          {}", format_fixed_f64(fit.rvalue, 14, 6)),
        format!("pvalue          {:>14.6e}", fit.pvalue),
        format!("stderr          {}", format_fixed_f64(fit.stderr, 14, 6)),
        format!("intercept_stderr{}", format_fixed_f64(fit.intercept_stderr, 14, 6)),
        format!("peak_index      {:>14}", result.peak_index),
        format!(
            "window          {:>14}",
            format!("{}..{}", result.window_start, result.window_end)
        ),
    ];
    match &analysis.extrapolation {
        Ok(range) => {
            for (label, (x, y)) in ["line_start", "line_end"].iter().zip(range.line(fit)) {
                lines.push(format!(
                    "{:<16}{}{}",
                    label,
                    format_fixed_f64(x, 14, 6),
                    format_fixed_f64(y, 14, 6)
                ));
            }
        }
        Err(error) => lines.push(format!("line            unavailable: {error}")),
    }
    lines.join("\n")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ErrorReport {
    pub(super) placeholder: &'static str,
    pub(super) category: &'static str,
    pub(super) exit_code: i32,
    pub(super) message: String,
}

impl From<&TaucError> for ErrorReport {
    fn from(error: &TaucError) -> Self {
        Self {
            placeholder: error.placeholder(),
            category: error.category().as_str(),
            exit_code: error.exit_code(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TransitionReport {
    pub(super) transition: TransitionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) band_gap_ev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) fit: Option<RegressionFit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) peak_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) window: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) extrapolation: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) error: Option<ErrorReport>,
}

impl TransitionReport {
    pub(super) fn succeeded(result: &BandGapResult, extrapolation: Option<[f64; 2]>) -> Self {
        Self {
            transition: result.transition_kind,
            band_gap_ev: Some(result.energy_ev),
            fit: Some(result.fit),
            peak_index: Some(result.peak_index),
            window: Some([result.window_start, result.window_end]),
            extrapolation,
            error: None,
        }
    }

    pub(super) fn failed(transition: TransitionKind, error: &TaucError) -> Self {
        Self {
            transition,
            band_gap_ev: None,
            fit: None,
            peak_index: None,
            window: None,
            extrapolation: None,
            error: Some(error.into()),
        }
    }

    pub(super) fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FileReport {
    pub(super) input: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(super) outputs: Vec<PathBuf>,
    pub(super) transitions: Vec<TransitionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) error: Option<ErrorReport>,
}

impl FileReport {
    pub(super) fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            outputs: Vec::new(),
            transitions: Vec::new(),
            error: None,
        }
    }

    pub(super) fn with_error(mut self, error: &TaucError) -> Self {
        self.error = Some(error.into());
        self
    }

    pub(super) fn is_success(&self) -> bool {
        self.error.is_none() && self.transitions.iter().all(TransitionReport::is_success)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SkippedReport {
    pub(super) input: PathBuf,
    pub(super) reason: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BatchSummary {
    pub(super) processed: usize,
    pub(super) succeeded: usize,
    pub(super) failed: usize,
    pub(super) skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BatchReport {
    pub(super) input_directory: PathBuf,
    pub(super) summary: BatchSummary,
    pub(super) files: Vec<FileReport>,
    pub(super) skipped: Vec<SkippedReport>,
}

impl BatchReport {
    pub(super) fn new(
        input_directory: &Path,
        files: Vec<FileReport>,
        skipped: Vec<SkippedReport>,
    ) -> Self {
        let succeeded = files.iter().filter(|file| file.is_success()).count();
        Self {
            input_directory: input_directory.to_path_buf(),
            summary: BatchSummary {
                processed: files.len(),
                succeeded,
                failed: files.len() - succeeded,
                skipped: skipped.len(),
            },
            files,
            skipped,
        }
    }

    pub(super) fn passed(&self) -> bool {
        self.summary.failed == 0
    }
}

pub(super) fn write_json_report<T: Serialize>(path: &Path, report: &T) -> Result<(), TaucError> {
    let json = serde_json::to_string_pretty(report).map_err(|source| {
        TaucError::io_system(
            "IO.REPORT_SERIALIZE",
            format!("failed to serialize report: {}", source),
        )
    })?;
    write_text_artifact(path, &json)
}
