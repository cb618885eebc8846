use crate::types::{RawSegment, SegmentCandidate, Side};
use tracing::trace;

/// Segments of one frame split by slope sign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedSegments {
    pub left: Vec<SegmentCandidate>,
    pub right: Vec<SegmentCandidate>,
    /// Vertical segments dropped before classification.
    pub skipped_vertical: usize,
}

impl ClassifiedSegments {
    pub fn side(&self, side: Side) -> &[SegmentCandidate] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Slope, intercept and length of a segment, or `None` if it is vertical.
pub fn segment_candidate(segment: &RawSegment) -> Option<SegmentCandidate> {
    if segment.is_vertical() {
        return None;
    }
    let dx = segment.x2 as f64 - segment.x1 as f64;
    let dy = segment.y2 as f64 - segment.y1 as f64;
    let slope = dy / dx;
    let intercept = segment.y1 as f64 - slope * segment.x1 as f64;

    Some(SegmentCandidate {
        slope,
        intercept,
        length: segment.length(),
    })
}

pub fn classify_segments(segments: &[RawSegment]) -> ClassifiedSegments {
    let mut classified = ClassifiedSegments::default();

    for segment in segments {
        let Some(candidate) = segment_candidate(segment) else {
            trace!("Skipping vertical segment {:?}", segment);
            classified.skipped_vertical += 1;
            continue;
        };

        match Side::from_slope(candidate.slope) {
            Side::Left => classified.left.push(candidate),
            Side::Right => classified.right.push(candidate),
        }
    }

    classified
}
