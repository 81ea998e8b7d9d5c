//! Band-gap estimation by tangent extrapolation of a Tauc curve.
//!
//! The Tauc series is smoothed, its steepest rise is located from the
//! (smoothed) forward derivative, and a straight line is fitted to the smoothed
//! curve against raw photon energy in a fixed window around that point. The
//! band gap is the line's energy-axis intercept.

use super::extrapolation::extrapolation_range;
use super::traits::TransitionAnalyzer;
use super::transform::{PreparedSpectrum, SpectrumTransform};
use crate::common::config::{EstimatorConfig, PipelineConfig, TransformConfig};
use crate::domain::{
    BandGapResult, RegressionFit, Spectrum, TaucError, TaucResult, TaucSeries,
    TransitionAnalysis, TransitionKind,
};
use crate::numerics::{DerivativeLocator, LocalRegressor, Smoother, round_to_decimals};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct BandGapEstimator {
    transform: SpectrumTransform,
    config: EstimatorConfig,
    smoother: Smoother,
    locator: DerivativeLocator,
    regressor: LocalRegressor,
}

impl BandGapEstimator {
    pub fn new(config: PipelineConfig) -> TaucResult<Self> {
        Self::with_configs(config.transform, config.estimator)
    }

    pub fn with_configs(transform: TransformConfig, config: EstimatorConfig) -> TaucResult<Self> {
        config.validate()?;
        Ok(Self {
            transform: SpectrumTransform::new(transform)?,
            smoother: Smoother::new(config.smoothing)?,
            locator: DerivativeLocator::new(config.derivative_smoothing)?,
            regressor: LocalRegressor::new(config.half_window)?,
            config,
        })
    }

    pub fn transform(&self) -> &SpectrumTransform {
        &self.transform
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Analyze one transition of an already prepared spectrum, so several
    /// transitions can share a single Kubelka-Munk / scaling pass.
    pub fn analyze_prepared(
        &self,
        prepared: &PreparedSpectrum,
        kind: TransitionKind,
    ) -> TaucResult<TransitionAnalysis> {
        let series = self.transform.tauc_from_prepared(prepared, kind)?;
        self.analyze_series(series)
    }

    pub fn analyze_series(&self, series: TaucSeries) -> TaucResult<TransitionAnalysis> {
        let tolerance = self.config.degenerate_slope_tolerance;
        let smoothed = self.smoother.smooth(&series.tauc)?;
        ensure_varying(&smoothed, tolerance)?;

        let peak_index = self.locator.locate(&series.energy_ev, &smoothed)?;
        let (window_start, window_end) = self.regressor.window(peak_index, smoothed.len())?;
        let fit = self
            .regressor
            .fit(&series.energy_ev, &smoothed, peak_index)?;
        ensure_non_degenerate(
            &fit,
            &series.energy_ev[window_start..window_end],
            &smoothed[window_start..window_end],
            tolerance,
        )?;

        let energy_ev = round_to_decimals(fit.x_intercept(), self.config.round_decimals);
        let extrapolation = extrapolation_range(
            energy_ev,
            &series.energy_ev,
            peak_index,
            self.config.extrapolation_margin,
        );
        debug!(
            transition = %series.kind,
            peak_index,
            window_start,
            window_end,
            slope = fit.slope,
            intercept = fit.intercept,
            energy_ev,
            "band gap estimated"
        );

        Ok(TransitionAnalysis {
            result: BandGapResult {
                transition_kind: series.kind,
                energy_ev,
                fit,
                window_start,
                window_end,
                peak_index,
            },
            series,
            smoothed,
            extrapolation,
        })
    }
}

impl TransitionAnalyzer for BandGapEstimator {
    fn analyze(&self, spectrum: &Spectrum, kind: TransitionKind) -> TaucResult<TransitionAnalysis> {
        let series = self.transform.tauc_series(spectrum, kind)?;
        self.analyze_series(series)
    }
}

// A flat curve has an arbitrary derivative peak; reject it before localisation.
fn ensure_varying(values: &[f64], tolerance: f64) -> TaucResult<()> {
    let (min, max, scale) = values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64),
        |(min, max, scale), &value| (min.min(value), max.max(value), scale.max(value.abs())),
    );
    if max - min <= tolerance * scale {
        debug!(min, max, "Tauc curve is flat");
        return Err(TaucError::DegenerateFit { slope: 0.0 });
    }
    Ok(())
}

/// The slope is degenerate when the rise it predicts across the window is
/// negligible against the window's own magnitude.
fn ensure_non_degenerate(
    fit: &RegressionFit,
    x: &[f64],
    y: &[f64],
    tolerance: f64,
) -> TaucResult<()> {
    let span = x.iter().fold(f64::NEG_INFINITY, |acc, &value| acc.max(value))
        - x.iter().fold(f64::INFINITY, |acc, &value| acc.min(value));
    let scale = y.iter().fold(0.0_f64, |acc, &value| acc.max(value.abs()));
    let slope = fit.slope;
    if slope == 0.0
        || !slope.is_finite()
        || slope.abs() * span <= tolerance * scale
        || !fit.x_intercept().is_finite()
    {
        return Err(TaucError::DegenerateFit { slope });
    }
    Ok(())
}
