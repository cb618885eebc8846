use crate::types::{LaneLine, SegmentCandidate};

/// Length-weighted mean of slope and intercept.
///
/// Longer segments dominate the fit. Returns `None` for an empty group or
/// when the total weight is not a positive finite number.
pub fn fit_weighted_line(candidates: &[SegmentCandidate]) -> Option<LaneLine> {
    if candidates.is_empty() {
        return None;
    }

    let weight: f64 = candidates.iter().map(|c| c.length).sum();
    if !(weight > 0.0 && weight.is_finite()) {
        return None;
    }

    // Normalised weights, so a lone candidate (w = 1) reproduces its line exactly.
    let (slope, intercept) = candidates.iter().fold((0.0_f64, 0.0_f64), |(s, i), c| {
        let w = c.length / weight;
        (s + w * c.slope, i + w * c.intercept)
    });

    Some(LaneLine::new(slope, intercept))
}
