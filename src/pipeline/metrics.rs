// src/pipeline/metrics.rs
//
// Per-video counters. Updated from rayon workers, so everything is atomic.

use crate::lanes::FrameReconstruction;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub frames_with_both_lanes: Arc<AtomicU64>,
    pub frames_with_one_lane: Arc<AtomicU64>,
    pub frames_without_lanes: Arc<AtomicU64>,
    pub segments_detected: Arc<AtomicU64>,
    pub vertical_segments_skipped: Arc<AtomicU64>,
    pub degenerate_lines: Arc<AtomicU64>,
    pub frame_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_with_both_lanes: Arc::new(AtomicU64::new(0)),
            frames_with_one_lane: Arc::new(AtomicU64::new(0)),
            frames_without_lanes: Arc::new(AtomicU64::new(0)),
            segments_detected: Arc::new(AtomicU64::new(0)),
            vertical_segments_skipped: Arc::new(AtomicU64::new(0)),
            degenerate_lines: Arc::new(AtomicU64::new(0)),
            frame_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_frame(&self, segments: usize, result: &FrameReconstruction, elapsed_us: u64) {
        self.inc(&self.total_frames);
        match result.lanes.count() {
            2 => self.inc(&self.frames_with_both_lanes),
            1 => self.inc(&self.frames_with_one_lane),
            _ => self.inc(&self.frames_without_lanes),
        }
        self.add(&self.segments_detected, segments as u64);
        self.add(&self.vertical_segments_skipped, result.skipped_vertical as u64);
        self.add(&self.degenerate_lines, result.degenerate_lines as u64);
        self.add(&self.frame_time_us, elapsed_us);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let total_frames = self.total_frames.load(Ordering::Relaxed);
        let frame_time_us = self.frame_time_us.load(Ordering::Relaxed);
        MetricsSummary {
            total_frames,
            fps: self.fps(),
            frames_with_both_lanes: self.frames_with_both_lanes.load(Ordering::Relaxed),
            frames_with_one_lane: self.frames_with_one_lane.load(Ordering::Relaxed),
            frames_without_lanes: self.frames_without_lanes.load(Ordering::Relaxed),
            segments_detected: self.segments_detected.load(Ordering::Relaxed),
            vertical_segments_skipped: self.vertical_segments_skipped.load(Ordering::Relaxed),
            degenerate_lines: self.degenerate_lines.load(Ordering::Relaxed),
            avg_frame_us: frame_time_us.checked_div(total_frames).unwrap_or(0),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub frames_with_both_lanes: u64,
    pub frames_with_one_lane: u64,
    pub frames_without_lanes: u64,
    pub segments_detected: u64,
    pub vertical_segments_skipped: u64,
    pub degenerate_lines: u64,
    pub avg_frame_us: u64,
    pub elapsed_secs: f64,
}

impl MetricsSummary {
    /// Share of frames where at least one boundary was drawn, in percent.
    pub fn detection_rate(&self) -> f64 {
        let detected = self.frames_with_both_lanes + self.frames_with_one_lane;
        100.0 * detected as f64 / self.total_frames.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::LaneReconstructor;
    use crate::types::{FrameSize, RawSegment};
    use rayon::prelude::*;

    #[test]
    fn test_record_frame_buckets() {
        let metrics = PipelineMetrics::new();
        let reconstructor = LaneReconstructor::default();
        let size = FrameSize::new(640, 480).unwrap();

        let both = [
            RawSegment::new(10, 90, 50, 10),
            RawSegment::new(60, 10, 100, 90),
        ];
        let vertical = [RawSegment::new(5, 0, 5, 50)];
        let flat = [RawSegment::new(0, 50, 40, 50)];

        for segments in [&both[..], &vertical[..], &flat[..], &[][..]] {
            let result = reconstructor.reconstruct_detailed(segments, size);
            metrics.record_frame(segments.len(), &result, 10);
        }

        let summary = metrics.summary();
        assert_eq!(summary.total_frames, 4);
        assert_eq!(summary.frames_with_both_lanes, 1);
        assert_eq!(summary.frames_with_one_lane, 0);
        assert_eq!(summary.frames_without_lanes, 3);
        assert_eq!(summary.segments_detected, 4);
        assert_eq!(summary.vertical_segments_skipped, 1);
        assert_eq!(summary.degenerate_lines, 1);
        assert_eq!(summary.avg_frame_us, 10);
        assert!((summary.detection_rate() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_counters_shared_across_threads() {
        let metrics = PipelineMetrics::new();
        (0..1000).into_par_iter().for_each(|_| {
            metrics.inc(&metrics.total_frames);
        });
        assert_eq!(metrics.summary().total_frames, 1000);
    }

    #[test]
    fn test_empty_summary() {
        let summary = PipelineMetrics::new().summary();
        assert_eq!(summary.avg_frame_us, 0);
        assert_eq!(summary.detection_rate(), 0.0);
    }
}
