//! Physical constants and pipeline defaults shared by the transform and
//! estimator stages.

/// `h * c / e` in eV*nm, the conventional spectroscopy value.
pub const PHOTON_ENERGY_EV_NM: f64 = 1240.0;
/// ln(10) as tabulated for decadic-to-natural absorbance conversion.
pub const DECADIC_TO_NATURAL: f64 = 2.303;

pub const DIRECT_TAUC_EXPONENT: f64 = 2.0;
pub const INDIRECT_TAUC_EXPONENT: f64 = 0.5;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 51;
pub const DEFAULT_SMOOTHING_ORDER: usize = 3;
pub const DEFAULT_DERIVATIVE_WINDOW: usize = 101;
pub const DEFAULT_DERIVATIVE_ORDER: usize = 3;
pub const DEFAULT_HALF_WINDOW: usize = 10;
pub const DEFAULT_EXTRAPOLATION_MARGIN: usize = 60;
pub const DEFAULT_DEGENERATE_SLOPE_TOLERANCE: f64 = 1.0e-9;
pub const DEFAULT_ROUND_DECIMALS: u32 = 2;
/// Past this, `10^decimals` no longer scales an f64 energy exactly.
pub const MAX_ROUND_DECIMALS: u32 = 15;
