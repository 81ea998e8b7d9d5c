use crate::domain::{ExtrapolationRange, TaucError, TaucResult};

/// Two-point x-range for drawing the tangent line: from the band gap to the
/// energy `margin` samples before the located peak.
pub fn extrapolation_range(
    band_gap_ev: f64,
    energy_ev: &[f64],
    peak_index: usize,
    margin: usize,
) -> TaucResult<ExtrapolationRange> {
    if peak_index < margin || peak_index >= energy_ev.len() {
        return Err(TaucError::WindowOutOfBounds {
            index: peak_index,
            before: margin,
            after: 0,
            len: energy_ev.len(),
        });
    }
    Ok(ExtrapolationRange {
        x: [band_gap_ev, energy_ev[peak_index - margin]],
    })
}
