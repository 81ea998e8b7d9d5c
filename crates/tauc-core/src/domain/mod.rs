pub mod errors;

pub use errors::{TaucError, TaucErrorCategory, TaucResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Validated UV-Vis spectrum: wavelengths in nm, strictly increasing and positive,
/// paired with finite absorbance (or reflectance %) readings.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelength_nm: Vec<f64>,
    absorbance: Vec<f64>,
}

impl Spectrum {
    pub fn new(wavelength_nm: Vec<f64>, absorbance: Vec<f64>) -> TaucResult<Self> {
        if wavelength_nm.len() != absorbance.len() {
            return Err(TaucError::input_validation(
                "INPUT.SPECTRUM_SHAPE",
                format!(
                    "spectrum column length mismatch: wavelength={}, absorbance={}",
                    wavelength_nm.len(),
                    absorbance.len()
                ),
            ));
        }
        if wavelength_nm.is_empty() {
            return Err(TaucError::input_validation(
                "INPUT.SPECTRUM_SHAPE",
                "spectrum contains no data points",
            ));
        }

        for (index, &wavelength) in wavelength_nm.iter().enumerate() {
            if !wavelength.is_finite() || wavelength <= 0.0 {
                return Err(TaucError::domain(
                    "wavelength_nm",
                    index,
                    wavelength,
                    "wavelength must be finite and > 0",
                ));
            }
            if index > 0 && wavelength <= wavelength_nm[index - 1] {
                return Err(TaucError::domain(
                    "wavelength_nm",
                    index,
                    wavelength,
                    "wavelength must be strictly increasing",
                ));
            }
        }

        if let Some((index, &value)) = absorbance
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(TaucError::domain(
                "absorbance",
                index,
                value,
                "absorbance must be finite",
            ));
        }

        Ok(Self {
            wavelength_nm,
            absorbance,
        })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> TaucResult<Self> {
        let (wavelength_nm, absorbance) = pairs.iter().copied().unzip();
        Self::new(wavelength_nm, absorbance)
    }

    pub fn wavelength_nm(&self) -> &[f64] {
        &self.wavelength_nm
    }

    pub fn absorbance(&self) -> &[f64] {
        &self.absorbance
    }

    pub fn len(&self) -> usize {
        self.wavelength_nm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength_nm.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Direct,
    Indirect,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 2] = [TransitionKind::Direct, TransitionKind::Indirect];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
        }
    }

    /// Column label used for exported tables and console output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Direct => "Direct transition",
            Self::Indirect => "Indirect transition",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "direct" | "2" => Some(Self::Direct),
            "indirect" | "0.5" => Some(Self::Indirect),
            _ => None,
        }
    }
}

impl Display for TransitionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Tauc-transformed series, index-aligned with the spectrum it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TaucSeries {
    pub kind: TransitionKind,
    pub exponent: f64,
    pub energy_ev: Vec<f64>,
    pub tauc: Vec<f64>,
}

impl TaucSeries {
    pub fn len(&self) -> usize {
        self.energy_ev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy_ev.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energy_ev.iter().copied().zip(self.tauc.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    pub rvalue: f64,
    pub pvalue: f64,
    pub stderr: f64,
    pub intercept_stderr: f64,
}

impl RegressionFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn x_intercept(&self) -> f64 {
        -self.intercept / self.slope
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandGapResult {
    pub transition_kind: TransitionKind,
    pub energy_ev: f64,
    pub fit: RegressionFit,
    pub window_start: usize,
    pub window_end: usize,
    pub peak_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtrapolationRange {
    pub x: [f64; 2],
}

impl ExtrapolationRange {
    /// Regression line evaluated at both ends of the range.
    pub fn line(&self, fit: &RegressionFit) -> [(f64, f64); 2] {
        [
            (self.x[0], fit.evaluate(self.x[0])),
            (self.x[1], fit.evaluate(self.x[1])),
        ]
    }
}

/// Everything a plotting or export collaborator needs for one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionAnalysis {
    pub result: BandGapResult,
    pub series: TaucSeries,
    pub smoothed: Vec<f64>,
    pub extrapolation: Result<ExtrapolationRange, TaucError>,
}

#[cfg(test)]
mod tests {
    use super::{RegressionFit, Spectrum, TaucError, TransitionKind};

    #[test]
    fn spectrum_rejects_non_positive_wavelength() {
        let error = Spectrum::new(vec![0.0, 1.0], vec![0.1, 0.2]).expect_err("zero wavelength");
        assert!(matches!(
            error,
            TaucError::Domain {
                quantity: "wavelength_nm",
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn spectrum_rejects_non_increasing_wavelength() {
        let error = Spectrum::from_pairs(&[(300.0, 0.1), (310.0, 0.2), (310.0, 0.3)])
            .expect_err("duplicate wavelength");
        assert!(matches!(error, TaucError::Domain { index: 2, .. }));
    }

    #[test]
    fn spectrum_rejects_column_mismatch_and_nan() {
        let mismatch = Spectrum::new(vec![300.0, 310.0], vec![0.1]).expect_err("mismatch");
        assert_eq!(mismatch.placeholder(), "INPUT.SPECTRUM_SHAPE");

        let nan = Spectrum::new(vec![300.0, 310.0], vec![0.1, f64::NAN]).expect_err("nan");
        assert!(matches!(
            nan,
            TaucError::Domain {
                quantity: "absorbance",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn transition_tokens_accept_names_and_exponents() {
        assert_eq!(TransitionKind::from_token("Direct"), Some(TransitionKind::Direct));
        assert_eq!(TransitionKind::from_token("0.5"), Some(TransitionKind::Indirect));
        assert_eq!(TransitionKind::from_token("forbidden"), None);
        assert_eq!(TransitionKind::Indirect.label(), "Indirect transition");
    }

    #[test]
    fn regression_fit_crosses_zero_at_x_intercept() {
        let fit = RegressionFit {
            slope: 2.0,
            intercept: -6.0,
            rvalue: 1.0,
            pvalue: 0.0,
            stderr: 0.0,
            intercept_stderr: 0.0,
        };
        assert_eq!(fit.x_intercept(), 3.0);
        assert_eq!(fit.evaluate(fit.x_intercept()), 0.0);
    }
}
