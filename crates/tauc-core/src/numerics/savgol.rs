//! Savitzky-Golay smoothing with polynomial-fit boundary handling.
//!
//! Interior samples are convolved with the least-squares smoothing kernel of a
//! degree-`order` polynomial over `window` points. The first and last
//! `window / 2` samples are replaced by evaluating a single polynomial fit to the
//! first (last) `window` samples, so output length always equals input length
//! and polynomials up to degree `order` pass through unchanged.

use super::linalg::{
    DenseMatrix, LuError, evaluate_polynomial, lu_solve, monomials, polynomial_least_squares,
};
use crate::common::config::SmoothingParams;
use crate::domain::{TaucError, TaucResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Smoother {
    params: SmoothingParams,
    coefficients: Vec<f64>,
}

impl Smoother {
    pub fn new(params: SmoothingParams) -> TaucResult<Self> {
        params.validate()?;
        let coefficients =
            smoothing_coefficients(params).map_err(|error| fit_failure(params, error))?;
        Ok(Self {
            params,
            coefficients,
        })
    }

    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    /// Convolution kernel, indexed from offset `-window/2` to `+window/2`.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn smooth(&self, values: &[f64]) -> TaucResult<Vec<f64>> {
        let window = self.params.window;
        if values.len() < window {
            return Err(TaucError::insufficient_data(
                "smoothing",
                window,
                values.len(),
            ));
        }

        let half = window / 2;
        let len = values.len();
        let mut output = vec![0.0; len];

        for center in half..(len - half) {
            let segment = &values[center - half..=center + half];
            output[center] = segment
                .iter()
                .zip(&self.coefficients)
                .map(|(value, coefficient)| value * coefficient)
                .sum();
        }

        if half > 0 {
            self.fit_edge(values, 0, 0..half, &mut output)?;
            self.fit_edge(values, len - window, (len - half)..len, &mut output)?;
        }

        Ok(output)
    }

    fn fit_edge(
        &self,
        values: &[f64],
        window_start: usize,
        targets: std::ops::Range<usize>,
        output: &mut [f64],
    ) -> TaucResult<()> {
        let window = self.params.window;
        let half = (window / 2) as f64;
        let abscissa: Vec<f64> = (0..window)
            .map(|offset| scaled_offset(offset as f64 - half, half))
            .collect();
        let segment = &values[window_start..window_start + window];
        let coefficients = polynomial_least_squares(&abscissa, segment, self.params.order)
            .map_err(|error| fit_failure(self.params, error))?;

        for target in targets {
            let offset = (target - window_start) as f64 - half;
            output[target] = evaluate_polynomial(&coefficients, scaled_offset(offset, half));
        }
        Ok(())
    }
}

/// Smooth `values` with a freshly built filter.
pub fn savgol_smooth(values: &[f64], params: SmoothingParams) -> TaucResult<Vec<f64>> {
    Smoother::new(params)?.smooth(values)
}

/// Row of `(A^T A)^-1 A^T` that evaluates the local fit at the window center.
fn smoothing_coefficients(params: SmoothingParams) -> Result<Vec<f64>, LuError> {
    let half = params.window / 2;
    let terms = params.order + 1;
    let offsets: Vec<f64> = (0..params.window)
        .map(|index| scaled_offset(index as f64 - half as f64, half as f64))
        .collect();

    let mut normal = DenseMatrix::zeros(terms, terms);
    for &t in &offsets {
        let powers = monomials(t, 2 * params.order);
        for row in 0..terms {
            for col in 0..terms {
                normal[(row, col)] += powers[row + col];
            }
        }
    }

    let mut unit = vec![0.0; terms];
    unit[0] = 1.0;
    let weights = lu_solve(&normal, &unit)?;

    Ok(offsets
        .iter()
        .map(|&t| evaluate_polynomial(&weights, t))
        .collect())
}

// Offsets are mapped onto [-1, 1] to keep the normal equations well conditioned.
fn scaled_offset(offset: f64, half: f64) -> f64 {
    if half > 0.0 { offset / half } else { 0.0 }
}

fn fit_failure(params: SmoothingParams, error: LuError) -> TaucError {
    TaucError::invalid_parameter(
        "smoothing window",
        params.window as f64,
        match error {
            LuError::SingularMatrix { .. } => "local polynomial fit is singular",
            _ => "local polynomial fit failed",
        },
    )
}
