use serde::Deserialize;
use std::path::PathBuf;
use tauc_core::{
    BandGapEstimate, BandGapEstimator, PipelineConfig, Spectrum, TaucError, TransitionAnalyzer,
    TransitionKind,
};

#[derive(Debug, Deserialize)]
struct BandGapFixtures {
    cases: Vec<BandGapCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BandGapCase {
    id: String,
    transition: TransitionKind,
    edge_center_ev: f64,
    edge_width_ev: f64,
    points: usize,
    wavelength_range_nm: [f64; 2],
    ripple: f64,
    expected_peak_index: usize,
    expected_band_gap_ev: f64,
    abs_tol: f64,
}

impl BandGapCase {
    /// Absorbance whose Tauc curve is a logistic edge, optionally with a
    /// multiplicative ripple.
    fn spectrum(&self) -> Spectrum {
        let [start, end] = self.wavelength_range_nm;
        let exponent = match self.transition {
            TransitionKind::Direct => 2.0,
            TransitionKind::Indirect => 0.5,
        };
        let wavelength: Vec<f64> = (0..self.points)
            .map(|k| start + (end - start) * k as f64 / (self.points - 1) as f64)
            .collect();
        let absorbance = wavelength
            .iter()
            .enumerate()
            .map(|(k, nm)| {
                let energy = 1240.0 / nm;
                let edge =
                    1.0 / (1.0 + (-(energy - self.edge_center_ev) / self.edge_width_ev).exp());
                let tauc = edge * (1.0 + self.ripple * (1.3 * k as f64).sin());
                tauc.powf(1.0 / exponent) / energy
            })
            .collect();
        Spectrum::new(wavelength, absorbance).expect("fixture spectrum should validate")
    }
}

fn fixtures() -> BandGapFixtures {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("band_gap_cases.json");
    let source = std::fs::read_to_string(&path).expect("fixture file should be readable");
    serde_json::from_str(&source).expect("fixture file should parse")
}

#[test]
fn synthetic_edges_match_reference_estimates() {
    let estimator = BandGapEstimator::new(PipelineConfig::default()).expect("estimator");

    for case in fixtures().cases {
        let analysis = estimator
            .analyze(&case.spectrum(), case.transition)
            .unwrap_or_else(|error| panic!("case '{}' failed: {}", case.id, error));
        let result = analysis.result;

        assert_eq!(result.transition_kind, case.transition, "case '{}'", case.id);
        assert!(
            result.peak_index.abs_diff(case.expected_peak_index) <= 1,
            "case '{}': peak index {} vs {}",
            case.id,
            result.peak_index,
            case.expected_peak_index
        );
        assert!(
            (result.energy_ev - case.expected_band_gap_ev).abs() <= case.abs_tol,
            "case '{}': band gap {} vs {}",
            case.id,
            result.energy_ev,
            case.expected_band_gap_ev
        );
        assert!(
            (result.energy_ev - (case.edge_center_ev - 2.0 * case.edge_width_ev)).abs() <= 0.05,
            "case '{}': band gap {} far from tangent intercept",
            case.id,
            result.energy_ev
        );
        assert!(analysis.extrapolation.is_ok(), "case '{}'", case.id);
    }
}

#[test]
fn both_transitions_are_estimated_independently() {
    let estimator = BandGapEstimator::new(PipelineConfig::default()).expect("estimator");
    let cases = fixtures().cases;
    let direct = cases
        .iter()
        .find(|case| case.id == "sigmoid-direct-3.5")
        .expect("direct case should exist");

    let outcomes = estimator.estimate_all(&direct.spectrum(), &TransitionKind::ALL);
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].0, TransitionKind::Direct);
    let direct_gap = outcomes[0].1.as_ref().expect("direct estimate").energy_ev;
    assert!((direct_gap - 2.98).abs() <= 0.011);
    assert_eq!(outcomes[1].0, TransitionKind::Indirect);
    assert!(outcomes[1].1.is_ok());
}

#[test]
fn estimates_are_bitwise_reproducible() {
    let estimator = BandGapEstimator::new(PipelineConfig::default()).expect("estimator");
    for case in fixtures().cases {
        let spectrum = case.spectrum();
        let first = estimator
            .estimate(&spectrum, case.transition)
            .expect("first estimate");
        let second = estimator
            .estimate(&spectrum, case.transition)
            .expect("second estimate");
        assert_eq!(first.energy_ev.to_bits(), second.energy_ev.to_bits());
        assert_eq!(first.fit.intercept.to_bits(), second.fit.intercept.to_bits());
        assert_eq!(first.peak_index, second.peak_index);
    }
}

#[test]
fn fifty_point_spectrum_is_insufficient() {
    let wavelength: Vec<f64> = (0..50).map(|k| 300.0 + 2.0 * k as f64).collect();
    let absorbance: Vec<f64> = (0..50).map(|k| 1.0 - 0.01 * k as f64).collect();
    let spectrum = Spectrum::new(wavelength, absorbance).expect("spectrum");
    let estimator = BandGapEstimator::new(PipelineConfig::default()).expect("estimator");

    for kind in TransitionKind::ALL {
        let error = estimator
            .estimate(&spectrum, kind)
            .expect_err("50 points should be insufficient");
        assert!(matches!(error, TaucError::InsufficientData { .. }));
        assert_eq!(error.exit_code(), 2);
    }
}

#[test]
fn negative_absorbance_fails_only_the_indirect_transition() {
    let cases = fixtures().cases;
    let case = cases
        .iter()
        .find(|case| case.id == "sigmoid-direct-3.5")
        .expect("direct case should exist");
    let spectrum = case.spectrum();
    let mut absorbance = spectrum.absorbance().to_vec();
    absorbance[250] = -0.01;
    let shifted =
        Spectrum::new(spectrum.wavelength_nm().to_vec(), absorbance).expect("spectrum");
    let estimator = BandGapEstimator::new(PipelineConfig::default()).expect("estimator");

    let outcomes = estimator.estimate_all(&shifted, &TransitionKind::ALL);
    assert!(outcomes[0].1.is_ok());
    assert!(matches!(
        outcomes[1].1,
        Err(TaucError::Domain { index: 250, .. })
    ));
}
