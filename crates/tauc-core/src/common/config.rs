//! Pipeline configuration.
//!
//! Every literal the analysis depends on (filter windows, regression radius,
//! exponents, optional Kubelka-Munk and normalization) is an explicit,
//! overridable parameter here. Configurations deserialize from camelCase JSON
//! with every field optional.

use super::constants::{
    DECADIC_TO_NATURAL, DEFAULT_DEGENERATE_SLOPE_TOLERANCE, DEFAULT_DERIVATIVE_ORDER,
    DEFAULT_DERIVATIVE_WINDOW, DEFAULT_EXTRAPOLATION_MARGIN, DEFAULT_HALF_WINDOW,
    DEFAULT_ROUND_DECIMALS, DEFAULT_SMOOTHING_ORDER, DEFAULT_SMOOTHING_WINDOW,
    DIRECT_TAUC_EXPONENT, INDIRECT_TAUC_EXPONENT, MAX_ROUND_DECIMALS,
};
use crate::domain::{TaucError, TaucResult, TransitionKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothingParams {
    pub window: usize,
    pub order: usize,
}

impl SmoothingParams {
    pub const fn new(window: usize, order: usize) -> Self {
        Self { window, order }
    }

    pub fn validate(&self) -> TaucResult<()> {
        if self.window == 0 || self.window % 2 == 0 {
            return Err(TaucError::invalid_parameter(
                "smoothing window",
                self.window as f64,
                "window length must be a positive odd number",
            ));
        }
        if self.order >= self.window {
            return Err(TaucError::invalid_parameter(
                "smoothing order",
                self.order as f64,
                "polynomial order must be less than the window length",
            ));
        }
        Ok(())
    }
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW, DEFAULT_SMOOTHING_ORDER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaucExponents {
    pub direct: f64,
    pub indirect: f64,
}

impl TaucExponents {
    pub fn exponent_for(&self, kind: TransitionKind) -> f64 {
        match kind {
            TransitionKind::Direct => self.direct,
            TransitionKind::Indirect => self.indirect,
        }
    }
}

impl Default for TaucExponents {
    fn default() -> Self {
        Self {
            direct: DIRECT_TAUC_EXPONENT,
            indirect: INDIRECT_TAUC_EXPONENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformConfig {
    /// Input column holds diffuse reflectance in percent; apply Kubelka-Munk.
    pub reflectance: bool,
    pub normalization: Option<f64>,
    pub decadic_to_natural: bool,
    pub exponents: TaucExponents,
}

impl TransformConfig {
    /// Combined absorbance multiplier, or `None` when no scaling applies.
    pub fn absorbance_scale(&self) -> Option<f64> {
        match (self.normalization, self.decadic_to_natural) {
            (None, false) => None,
            (normalization, decadic) => {
                let base = normalization.unwrap_or(1.0);
                Some(if decadic {
                    base * DECADIC_TO_NATURAL
                } else {
                    base
                })
            }
        }
    }

    pub fn validate(&self) -> TaucResult<()> {
        if let Some(scale) = self.normalization {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(TaucError::invalid_parameter(
                    "normalization",
                    scale,
                    "normalization coefficient must be finite and > 0",
                ));
            }
        }
        for (name, exponent) in [
            ("direct exponent", self.exponents.direct),
            ("indirect exponent", self.exponents.indirect),
        ] {
            if !exponent.is_finite() || exponent <= 0.0 {
                return Err(TaucError::invalid_parameter(
                    name,
                    exponent,
                    "Tauc exponent must be finite and > 0",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimatorConfig {
    pub smoothing: SmoothingParams,
    pub derivative_smoothing: Option<SmoothingParams>,
    pub half_window: usize,
    pub extrapolation_margin: usize,
    pub degenerate_slope_tolerance: f64,
    pub round_decimals: u32,
}

impl EstimatorConfig {
    pub fn validate(&self) -> TaucResult<()> {
        self.smoothing.validate()?;
        if let Some(params) = self.derivative_smoothing {
            params.validate()?;
        }
        if self.half_window == 0 {
            return Err(TaucError::invalid_parameter(
                "half window",
                0.0,
                "regression half-window radius must be at least 1",
            ));
        }
        if !self.degenerate_slope_tolerance.is_finite() || self.degenerate_slope_tolerance < 0.0 {
            return Err(TaucError::invalid_parameter(
                "degenerate slope tolerance",
                self.degenerate_slope_tolerance,
                "tolerance must be finite and >= 0",
            ));
        }
        if self.round_decimals > MAX_ROUND_DECIMALS {
            return Err(TaucError::invalid_parameter(
                "round decimals",
                f64::from(self.round_decimals),
                "band gap rounding must use at most 15 decimal places",
            ));
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingParams::default(),
            derivative_smoothing: Some(SmoothingParams::new(
                DEFAULT_DERIVATIVE_WINDOW,
                DEFAULT_DERIVATIVE_ORDER,
            )),
            half_window: DEFAULT_HALF_WINDOW,
            extrapolation_margin: DEFAULT_EXTRAPOLATION_MARGIN,
            degenerate_slope_tolerance: DEFAULT_DEGENERATE_SLOPE_TOLERANCE,
            round_decimals: DEFAULT_ROUND_DECIMALS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub transform: TransformConfig,
    pub estimator: EstimatorConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> TaucResult<()> {
        self.transform.validate()?;
        self.estimator.validate()
    }
}

pub fn parse_pipeline_config(source: &str) -> TaucResult<PipelineConfig> {
    let config = serde_json::from_str::<PipelineConfig>(source).map_err(|error| {
        TaucError::input_validation(
            "INPUT.CONFIG_PARSE",
            format!("failed to parse pipeline configuration: {}", error),
        )
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_pipeline_config(path: &Path) -> TaucResult<PipelineConfig> {
    let source = fs::read_to_string(path).map_err(|source| {
        TaucError::io_system(
            "IO.CONFIG_READ",
            format!(
                "failed to read pipeline configuration '{}': {}",
                path.display(),
                source
            ),
        )
    })?;
    parse_pipeline_config(&source)
}
