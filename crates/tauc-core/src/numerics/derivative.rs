use super::savgol::Smoother;
use crate::common::config::SmoothingParams;
use crate::domain::{TaucError, TaucResult};

/// Locates the steepest rise of a curve: forward-difference derivative,
/// optionally smoothed, then the index of its global maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeLocator {
    smoother: Option<Smoother>,
}

impl DerivativeLocator {
    pub fn new(smoothing: Option<SmoothingParams>) -> TaucResult<Self> {
        let smoother = smoothing.map(Smoother::new).transpose()?;
        Ok(Self { smoother })
    }

    pub fn unsmoothed() -> Self {
        Self { smoother: None }
    }

    pub fn smoothing(&self) -> Option<SmoothingParams> {
        self.smoother.as_ref().map(Smoother::params)
    }

    /// Derivative series (length `L - 1`) after the optional smoothing pass.
    pub fn derivative(&self, x: &[f64], y: &[f64]) -> TaucResult<Vec<f64>> {
        let derivative = forward_derivative(x, y)?;
        match &self.smoother {
            Some(smoother) => {
                let window = smoother.params().window;
                if derivative.len() < window {
                    return Err(TaucError::insufficient_data(
                        "derivative smoothing",
                        window,
                        derivative.len(),
                    ));
                }
                smoother.smooth(&derivative)
            }
            None => Ok(derivative),
        }
    }

    pub fn locate(&self, x: &[f64], y: &[f64]) -> TaucResult<usize> {
        let derivative = self.derivative(x, y)?;
        argmax_first(&derivative).ok_or_else(|| {
            TaucError::insufficient_data("derivative peak search", 2, x.len())
        })
    }
}

/// `dy/dx[k] = (y[k+1] - y[k]) / (x[k+1] - x[k])` for `k` in `0..L-1`.
pub fn forward_derivative(x: &[f64], y: &[f64]) -> TaucResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(TaucError::input_validation(
            "INPUT.DERIVATIVE_SHAPE",
            format!(
                "derivative input length mismatch: x={}, y={}",
                x.len(),
                y.len()
            ),
        ));
    }
    if x.len() < 2 {
        return Err(TaucError::insufficient_data("derivative", 2, x.len()));
    }

    x.windows(2)
        .zip(y.windows(2))
        .enumerate()
        .map(|(index, (dx, dy))| {
            let step = dx[1] - dx[0];
            if step == 0.0 {
                return Err(TaucError::domain(
                    "derivative abscissa step",
                    index,
                    step,
                    "consecutive x values must differ",
                ));
            }
            Ok((dy[1] - dy[0]) / step)
        })
        .collect()
}

/// Index of the largest value; ties resolve to the lowest index.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
