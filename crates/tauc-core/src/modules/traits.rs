use crate::domain::{BandGapResult, Spectrum, TaucResult, TransitionAnalysis, TransitionKind};

pub trait TransitionAnalyzer {
    fn analyze(&self, spectrum: &Spectrum, kind: TransitionKind) -> TaucResult<TransitionAnalysis>;
}

pub trait BandGapEstimate {
    fn estimate(&self, spectrum: &Spectrum, kind: TransitionKind) -> TaucResult<BandGapResult>;

    /// One outcome per requested transition, in request order. A failure for
    /// one kind never hides the others.
    fn estimate_all(
        &self,
        spectrum: &Spectrum,
        kinds: &[TransitionKind],
    ) -> Vec<(TransitionKind, TaucResult<BandGapResult>)> {
        kinds
            .iter()
            .map(|&kind| (kind, self.estimate(spectrum, kind)))
            .collect()
    }
}

impl<T> BandGapEstimate for T
where
    T: TransitionAnalyzer,
{
    fn estimate(&self, spectrum: &Spectrum, kind: TransitionKind) -> TaucResult<BandGapResult> {
        self.analyze(spectrum, kind).map(|analysis| analysis.result)
    }
}
