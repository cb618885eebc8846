// src/batch.rs
//
// Frames are independent, so a batch of them is an order-preserving
// parallel map over the reconstructor.

use crate::error::LaneError;
use crate::lanes::{FrameReconstruction, LaneReconstructor};
use crate::types::{FrameLanes, FrameSize, RawSegment};
use rayon::prelude::*;

/// Reconstruct every frame of a batch in parallel. Output order matches input.
pub fn reconstruct_batch<S>(
    reconstructor: &LaneReconstructor,
    frames: &[S],
    width: i32,
    height: i32,
) -> Result<Vec<FrameLanes>, LaneError>
where
    S: AsRef<[RawSegment]> + Sync,
{
    let size = FrameSize::new(width, height)?;
    Ok(reconstruct_batch_detailed(reconstructor, frames, size)
        .into_iter()
        .map(|r| r.lanes)
        .collect())
}

pub fn reconstruct_batch_detailed<S>(
    reconstructor: &LaneReconstructor,
    frames: &[S],
    size: FrameSize,
) -> Vec<FrameReconstruction>
where
    S: AsRef<[RawSegment]> + Sync,
{
    frames
        .par_iter()
        .map(|segments| reconstructor.reconstruct_detailed(segments.as_ref(), size))
        .collect()
}
