pub mod derivative;
pub mod linalg;
pub mod regression;
pub mod savgol;

pub use derivative::{DerivativeLocator, argmax_first, forward_derivative};
pub use linalg::{
    DenseMatrix, LuDecomposition, LuError, evaluate_polynomial, lu_factorize, lu_solve,
    polynomial_least_squares,
};
pub use regression::{LocalRegressor, linear_regression};
pub use savgol::{Smoother, savgol_smooth};

/// Compensated (Kahan) summation.
pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        let corrected = value - correction;
        let next = sum + corrected;
        correction = (next - sum) - corrected;
        sum = next;
    }

    sum
}

/// Round half away from zero to `decimals` places.
///
/// Precisions whose scale factor overflows leave the value untouched.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let Ok(exponent) = i32::try_from(decimals) else {
        return value;
    };
    let scale = 10_f64.powi(exponent);
    if !scale.is_finite() {
        return value;
    }
    (value * scale).round() / scale
}
