use super::stable_sum;
use crate::domain::{RegressionFit, TaucError, TaucResult};
use statrs::distribution::{ContinuousCDF, StudentsT};

// Guards the t statistic against division by zero when |r| == 1.
const TINY: f64 = 1.0e-20;

/// Ordinary least-squares line through a window `[m - r, m + r)` around a
/// located index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalRegressor {
    half_window: usize,
}

impl LocalRegressor {
    pub fn new(half_window: usize) -> TaucResult<Self> {
        if half_window == 0 {
            return Err(TaucError::invalid_parameter(
                "half window",
                0.0,
                "regression half-window radius must be at least 1",
            ));
        }
        Ok(Self { half_window })
    }

    pub fn half_window(&self) -> usize {
        self.half_window
    }

    /// Bounds of the regression window around `center`, rejecting windows that
    /// would run past either end of data of length `len`.
    pub fn window(&self, center: usize, len: usize) -> TaucResult<(usize, usize)> {
        let radius = self.half_window;
        if center < radius || center + radius > len {
            return Err(TaucError::WindowOutOfBounds {
                index: center,
                before: radius,
                after: radius,
                len,
            });
        }
        Ok((center - radius, center + radius))
    }

    pub fn fit(&self, x: &[f64], y: &[f64], center: usize) -> TaucResult<RegressionFit> {
        if x.len() != y.len() {
            return Err(TaucError::input_validation(
                "INPUT.REGRESSION_SHAPE",
                format!(
                    "regression input length mismatch: x={}, y={}",
                    x.len(),
                    y.len()
                ),
            ));
        }
        let (start, end) = self.window(center, x.len())?;
        linear_regression(&x[start..end], &y[start..end]).map_err(|error| match error {
            TaucError::Domain {
                quantity,
                index,
                value,
                reason,
            } => TaucError::domain(quantity, start + index, value, reason),
            other => other,
        })
    }
}

/// Least-squares line `y = slope * x + intercept` with correlation coefficient,
/// two-sided p-value for a zero-slope null hypothesis (Student t, `n - 2` dof),
/// and the standard errors of slope and intercept.
pub fn linear_regression(x: &[f64], y: &[f64]) -> TaucResult<RegressionFit> {
    let n = x.len();
    if n != y.len() {
        return Err(TaucError::input_validation(
            "INPUT.REGRESSION_SHAPE",
            format!("regression input length mismatch: x={}, y={}", n, y.len()),
        ));
    }
    if n < 2 {
        return Err(TaucError::insufficient_data("linear regression", 2, n));
    }

    let count = n as f64;
    let x_mean = stable_sum(x) / count;
    let y_mean = stable_sum(y) / count;

    let x_dev: Vec<f64> = x.iter().map(|value| value - x_mean).collect();
    let y_dev: Vec<f64> = y.iter().map(|value| value - y_mean).collect();
    let ssxm = stable_sum(&x_dev.iter().map(|dx| dx * dx).collect::<Vec<_>>()) / count;
    let ssym = stable_sum(&y_dev.iter().map(|dy| dy * dy).collect::<Vec<_>>()) / count;
    let ssxym = stable_sum(
        &x_dev
            .iter()
            .zip(&y_dev)
            .map(|(dx, dy)| dx * dy)
            .collect::<Vec<_>>(),
    ) / count;

    if ssxm == 0.0 {
        return Err(TaucError::domain(
            "regression abscissa",
            0,
            x[0],
            "all x values in the regression window are identical",
        ));
    }

    let rvalue = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };
    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;

    let (pvalue, stderr) = if n == 2 {
        let pvalue = if y[0] == y[1] { 1.0 } else { 0.0 };
        (pvalue, 0.0)
    } else {
        let dof = (n - 2) as f64;
        let t = rvalue * (dof / ((1.0 - rvalue) * (1.0 + rvalue) + TINY)).sqrt();
        let pvalue = two_sided_p_value(t, dof);
        let stderr = ((1.0 - rvalue * rvalue) * ssym / ssxm / dof).max(0.0).sqrt();
        (pvalue, stderr)
    };
    let x_sq_mean = stable_sum(&x.iter().map(|value| value * value).collect::<Vec<_>>()) / count;
    let intercept_stderr = stderr * x_sq_mean.sqrt();

    Ok(RegressionFit {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderr,
        intercept_stderr,
    })
}

fn two_sided_p_value(t: f64, dof: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(distribution) => (2.0 * distribution.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}
