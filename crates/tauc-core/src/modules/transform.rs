//! Wavelength -> photon energy conversion, Kubelka-Munk remission, and the Tauc
//! transformation for direct and indirect allowed transitions.

use crate::common::config::TransformConfig;
use crate::common::constants::PHOTON_ENERGY_EV_NM;
use crate::domain::{Spectrum, TaucError, TaucResult, TaucSeries, TransitionKind};

/// Spectrum columns after reflectance conversion and scaling, with the photon
/// energy of every point.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSpectrum {
    pub wavelength_nm: Vec<f64>,
    pub absorbance: Vec<f64>,
    pub energy_ev: Vec<f64>,
}

impl PreparedSpectrum {
    pub fn len(&self) -> usize {
        self.energy_ev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy_ev.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectrumTransform {
    config: TransformConfig,
}

impl SpectrumTransform {
    pub fn new(config: TransformConfig) -> TaucResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn exponent_for(&self, kind: TransitionKind) -> f64 {
        self.config.exponents.exponent_for(kind)
    }

    pub fn prepare(&self, spectrum: &Spectrum) -> TaucResult<PreparedSpectrum> {
        let mut absorbance = if self.config.reflectance {
            kubelka_munk_series(spectrum.absorbance())?
        } else {
            spectrum.absorbance().to_vec()
        };
        if let Some(scale) = self.config.absorbance_scale() {
            absorbance.iter_mut().for_each(|value| *value *= scale);
        }
        let energy_ev = energy_axis(spectrum.wavelength_nm())?;

        Ok(PreparedSpectrum {
            wavelength_nm: spectrum.wavelength_nm().to_vec(),
            absorbance,
            energy_ev,
        })
    }

    pub fn tauc_series(&self, spectrum: &Spectrum, kind: TransitionKind) -> TaucResult<TaucSeries> {
        let prepared = self.prepare(spectrum)?;
        self.tauc_from_prepared(&prepared, kind)
    }

    pub fn tauc_from_prepared(
        &self,
        prepared: &PreparedSpectrum,
        kind: TransitionKind,
    ) -> TaucResult<TaucSeries> {
        let exponent = self.exponent_for(kind);
        let tauc = tauc_values(&prepared.absorbance, &prepared.energy_ev, exponent)?;
        Ok(TaucSeries {
            kind,
            exponent,
            energy_ev: prepared.energy_ev.clone(),
            tauc,
        })
    }
}

pub fn photon_energy_ev(wavelength_nm: f64) -> f64 {
    PHOTON_ENERGY_EV_NM / wavelength_nm
}

pub fn wavelength_nm_from_energy(energy_ev: f64) -> f64 {
    PHOTON_ENERGY_EV_NM / energy_ev
}

pub fn energy_axis(wavelength_nm: &[f64]) -> TaucResult<Vec<f64>> {
    wavelength_nm
        .iter()
        .enumerate()
        .map(|(index, &wavelength)| {
            if wavelength > 0.0 {
                Ok(photon_energy_ev(wavelength))
            } else {
                Err(TaucError::domain(
                    "wavelength_nm",
                    index,
                    wavelength,
                    "wavelength must be > 0 for energy conversion",
                ))
            }
        })
        .collect()
}

/// Kubelka-Munk remission `F(R) = (1 - R)^2 / (2R)` for reflectance given in percent.
pub fn kubelka_munk(reflectance_percent: f64) -> Option<f64> {
    let reflectance = reflectance_percent / 100.0;
    (reflectance != 0.0).then(|| (1.0 - reflectance).powi(2) / (2.0 * reflectance))
}

pub fn kubelka_munk_series(reflectance_percent: &[f64]) -> TaucResult<Vec<f64>> {
    reflectance_percent
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            kubelka_munk(value).ok_or_else(|| {
                TaucError::domain(
                    "reflectance",
                    index,
                    value,
                    "Kubelka-Munk transform is undefined at zero reflectance",
                )
            })
        })
        .collect()
}

/// `(absorbance * energy)^exponent` point by point. A fractional exponent of a
/// negative product has no real value and is rejected.
pub fn tauc_values(absorbance: &[f64], energy_ev: &[f64], exponent: f64) -> TaucResult<Vec<f64>> {
    if absorbance.len() != energy_ev.len() {
        return Err(TaucError::input_validation(
            "INPUT.TAUC_SHAPE",
            format!(
                "Tauc input length mismatch: absorbance={}, energy={}",
                absorbance.len(),
                energy_ev.len()
            ),
        ));
    }

    let integral_exponent = exponent.fract() == 0.0;
    absorbance
        .iter()
        .zip(energy_ev)
        .enumerate()
        .map(|(index, (&value, &energy))| {
            let product = value * energy;
            if product < 0.0 && !integral_exponent {
                return Err(TaucError::domain(
                    "absorbance x energy",
                    index,
                    product,
                    "fractional Tauc exponent of a negative value has no real result",
                ));
            }
            Ok(product.powf(exponent))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        SpectrumTransform, energy_axis, kubelka_munk, photon_energy_ev, tauc_values,
        wavelength_nm_from_energy,
    };
    use crate::common::config::{TaucExponents, TransformConfig};
    use crate::domain::{Spectrum, TaucError, TransitionKind};

    fn spectrum(pairs: &[(f64, f64)]) -> Spectrum {
        Spectrum::from_pairs(pairs).expect("spectrum should validate")
    }

    #[test]
    fn energy_conversion_round_trips() {
        for wavelength in [200.0, 250.5, 413.3, 620.0, 1240.0, 2500.0] {
            let energy = photon_energy_ev(wavelength);
            assert_eq!(energy, 1240.0 / wavelength);
            let back = wavelength_nm_from_energy(energy);
            assert!(
                (back - wavelength).abs() <= 4.0 * f64::EPSILON * wavelength,
                "{wavelength} -> {back}"
            );
        }
        assert_eq!(photon_energy_ev(620.0), 2.0);
    }

    #[test]
    fn energy_axis_rejects_non_positive_wavelength() {
        let error = energy_axis(&[300.0, -5.0]).expect_err("negative wavelength");
        assert!(matches!(error, TaucError::Domain { index: 1, .. }));
    }

    #[test]
    fn direct_values_are_non_negative_even_for_negative_absorbance() {
        let values = tauc_values(&[-0.2, 0.0, 0.3], &[2.0, 3.0, 4.0], 2.0).expect("direct");
        assert!(values.iter().all(|value| *value >= 0.0));
        assert!((values[0] - 0.16).abs() < 1.0e-12);
        assert!((values[2] - 1.44).abs() < 1.0e-12);
    }

    #[test]
    fn indirect_values_reject_negative_products() {
        let error = tauc_values(&[0.1, -0.01], &[3.0, 3.1], 0.5).expect_err("negative product");
        assert!(matches!(
            error,
            TaucError::Domain {
                quantity: "absorbance x energy",
                index: 1,
                ..
            }
        ));

        let values = tauc_values(&[0.25, 1.0], &[4.0, 4.0], 0.5).expect("indirect");
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn kubelka_munk_matches_closed_form_and_rejects_zero() {
        assert_eq!(kubelka_munk(50.0), Some(0.25));
        assert_eq!(kubelka_munk(100.0), Some(0.0));
        assert_eq!(kubelka_munk(0.0), None);

        let transform = SpectrumTransform::new(TransformConfig {
            reflectance: true,
            ..TransformConfig::default()
        })
        .expect("transform");
        let error = transform
            .prepare(&spectrum(&[(300.0, 40.0), (310.0, 0.0)]))
            .expect_err("zero reflectance");
        assert!(matches!(
            error,
            TaucError::Domain {
                quantity: "reflectance",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn reflectance_conversion_precedes_normalization() {
        let transform = SpectrumTransform::new(TransformConfig {
            reflectance: true,
            normalization: Some(4.0),
            ..TransformConfig::default()
        })
        .expect("transform");
        let prepared = transform
            .prepare(&spectrum(&[(310.0, 50.0), (620.0, 100.0)]))
            .expect("prepare");

        assert_eq!(prepared.absorbance, vec![1.0, 0.0]);
        assert_eq!(prepared.energy_ev, vec![4.0, 2.0]);
        assert_eq!(prepared.len(), 2);
    }

    #[test]
    fn series_stays_index_aligned_with_spectrum() {
        let transform = SpectrumTransform::default();
        let input = spectrum(&[(310.0, 0.5), (413.0, 0.25), (620.0, 0.1)]);
        let series = transform
            .tauc_series(&input, TransitionKind::Direct)
            .expect("direct series");

        assert_eq!(series.len(), input.len());
        assert_eq!(series.exponent, 2.0);
        for ((energy, tauc), (wavelength, absorbance)) in series
            .points()
            .zip(input.wavelength_nm().iter().zip(input.absorbance()))
        {
            assert_eq!(energy, 1240.0 / wavelength);
            assert!((tauc - (absorbance * energy).powi(2)).abs() < 1.0e-12);
        }
    }

    #[test]
    fn exponent_mapping_is_configurable() {
        let transform = SpectrumTransform::new(TransformConfig {
            exponents: TaucExponents {
                direct: 2.0,
                indirect: 2.0 / 3.0,
            },
            ..TransformConfig::default()
        })
        .expect("transform");
        let series = transform
            .tauc_series(&spectrum(&[(310.0, 2.0)]), TransitionKind::Indirect)
            .expect("series");
        assert!((series.tauc[0] - 4.0).abs() < 1.0e-12);
        assert_eq!(series.kind, TransitionKind::Indirect);
    }

    #[test]
    fn invalid_normalization_is_rejected() {
        let error = SpectrumTransform::new(TransformConfig {
            normalization: Some(0.0),
            ..TransformConfig::default()
        })
        .expect_err("zero normalization");
        assert_eq!(error.placeholder(), "INPUT.PARAMETER");
    }
}
