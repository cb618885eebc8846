// src/lanes/mod.rs
//
// Per-frame lane reconstruction from Hough segments.
//
//   RawSegment[] → classifier → (left, right) candidates
//                → fitter     → Option<LaneLine> per side
//                → projector  → Option<LaneBoundary> per side

mod classifier;
mod fitter;
mod projector;
mod reconstructor;

pub use classifier::{classify_segments, segment_candidate, ClassifiedSegments};
pub use fitter::fit_weighted_line;
pub use projector::{project_boundary, project_optional};
pub use reconstructor::{FrameReconstruction, LaneReconstructor};
