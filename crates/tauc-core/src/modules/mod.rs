pub mod estimator;
pub mod extrapolation;
pub mod traits;
pub mod transform;

pub use estimator::BandGapEstimator;
pub use extrapolation::extrapolation_range;
pub use traits::{BandGapEstimate, TransitionAnalyzer};
pub use transform::{
    PreparedSpectrum, SpectrumTransform, energy_axis, kubelka_munk, kubelka_munk_series,
    photon_energy_ev, tauc_values, wavelength_nm_from_energy,
};
