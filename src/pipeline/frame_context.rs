// src/pipeline/frame_context.rs
//
// What was detected on one frame, in the shape written to the frame log.

use crate::lanes::FrameReconstruction;
use crate::types::FrameLanes;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct FrameContext {
    pub frame_id: u64,
    pub timestamp_ms: f64,
    pub segment_count: usize,
    #[serde(flatten)]
    pub reconstruction: FrameReconstruction,
}

impl FrameContext {
    /// `frame_id` is 1-based; the first frame sits at 0 ms.
    pub fn new(
        frame_id: u64,
        fps: f64,
        segment_count: usize,
        reconstruction: FrameReconstruction,
    ) -> Self {
        let timestamp_ms = if fps > 0.0 {
            frame_id.saturating_sub(1) as f64 / fps * 1000.0
        } else {
            0.0
        };
        Self {
            frame_id,
            timestamp_ms,
            segment_count,
            reconstruction,
        }
    }

    pub fn lanes(&self) -> &FrameLanes {
        &self.reconstruction.lanes
    }

    /// One JSON object per line.
    pub fn write_jsonl<W: Write>(&self, out: &mut W) -> Result<()> {
        serde_json::to_writer(&mut *out, self)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::LaneReconstructor;
    use crate::types::{FrameSize, RawSegment};

    #[test]
    fn test_timestamp_from_fps() {
        let ctx = FrameContext::new(1, 30.0, 0, FrameReconstruction::default());
        assert_eq!(ctx.timestamp_ms, 0.0);

        let ctx = FrameContext::new(31, 30.0, 0, FrameReconstruction::default());
        assert!((ctx.timestamp_ms - 1000.0).abs() < 1e-9);

        let ctx = FrameContext::new(30, 0.0, 0, FrameReconstruction::default());
        assert_eq!(ctx.timestamp_ms, 0.0);
    }

    #[test]
    fn test_jsonl_line() {
        let segments = [RawSegment::new(10, 90, 50, 10)];
        let size = FrameSize::new(120, 100).unwrap();
        let result = LaneReconstructor::default().reconstruct_detailed(&segments, size);
        let ctx = FrameContext::new(7, 25.0, segments.len(), result);

        let mut buf = Vec::new();
        ctx.write_jsonl(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["frame_id"], 7);
        assert_eq!(value["segment_count"], 1);
        assert_eq!(value["left_candidates"], 1);
        assert_eq!(value["lanes"]["left"]["near"]["x"], 5);
        assert!(value["lanes"]["right"].is_null());
    }
}
