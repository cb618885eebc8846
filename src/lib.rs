//! Lane boundary detection for road video.
//!
//! The geometric core (`lanes`, `batch`) turns Hough segments into at most two
//! lane boundaries per frame and has no video dependency. The OpenCV frame
//! pipeline and video I/O are behind the `video` feature.

pub mod batch;
pub mod config;
pub mod error;
pub mod lanes;
pub mod pipeline;
pub mod types;

#[cfg(feature = "video")]
pub mod frame_pipeline;
#[cfg(feature = "video")]
pub mod video_processor;

pub use batch::{reconstruct_batch, reconstruct_batch_detailed};
pub use error::LaneError;
pub use lanes::{FrameReconstruction, LaneReconstructor};
pub use types::{
    Config, FrameLanes, FrameSize, LaneBoundary, LaneLine, PixelPoint, ProjectionConfig,
    RawSegment, Rounding, SegmentCandidate, Side,
};
