//! Optical band-gap estimation from UV-Vis absorbance spectra via Tauc plots.

pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;

pub use common::config::{
    EstimatorConfig, PipelineConfig, SmoothingParams, TaucExponents, TransformConfig,
    load_pipeline_config, parse_pipeline_config,
};
pub use domain::{
    BandGapResult, ExtrapolationRange, RegressionFit, Spectrum, TaucError, TaucErrorCategory,
    TaucResult, TaucSeries, TransitionAnalysis, TransitionKind,
};
pub use modules::{BandGapEstimate, BandGapEstimator, SpectrumTransform, TransitionAnalyzer};
