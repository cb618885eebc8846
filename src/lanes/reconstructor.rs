use super::classifier::classify_segments;
use super::fitter::fit_weighted_line;
use super::projector::project_optional;
use crate::error::LaneError;
use crate::types::{
    FrameLanes, FrameSize, LaneBoundary, LaneLine, ProjectionConfig, RawSegment, Side,
};
use serde::Serialize;
use tracing::{debug, trace};

/// Everything reconstruction learned about one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameReconstruction {
    pub lanes: FrameLanes,
    pub left_line: Option<LaneLine>,
    pub right_line: Option<LaneLine>,
    pub left_candidates: usize,
    pub right_candidates: usize,
    pub skipped_vertical: usize,
    /// Sides whose fitted line was horizontal and could not be projected.
    pub degenerate_lines: usize,
}

/// Turns one frame's Hough segments into at most two lane boundaries.
///
/// Holds only immutable projection settings, so one instance can be shared
/// across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaneReconstructor {
    projection: ProjectionConfig,
}

impl LaneReconstructor {
    pub fn new(projection: ProjectionConfig) -> Self {
        Self { projection }
    }

    pub fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }

    /// Rows the boundaries span: bottom of the frame up to `far_ratio` of it.
    pub fn boundary_rows(&self, size: FrameSize) -> (f64, f64) {
        let y_near = size.height() as f64;
        (y_near, y_near * self.projection.far_ratio)
    }

    pub fn reconstruct(
        &self,
        segments: &[RawSegment],
        width: i32,
        height: i32,
    ) -> Result<FrameLanes, LaneError> {
        let size = FrameSize::new(width, height)?;
        Ok(self.reconstruct_detailed(segments, size).lanes)
    }

    pub fn reconstruct_detailed(
        &self,
        segments: &[RawSegment],
        size: FrameSize,
    ) -> FrameReconstruction {
        if segments.is_empty() {
            trace!("No segments this frame");
            return FrameReconstruction::default();
        }

        let classified = classify_segments(segments);
        let left_line = fit_weighted_line(&classified.left);
        let right_line = fit_weighted_line(&classified.right);

        let (y_near, y_far) = self.boundary_rows(size);
        let rounding = self.projection.rounding;
        let mut degenerate_lines = 0;
        let mut project = |side: Side, line: Option<LaneLine>| -> Option<LaneBoundary> {
            project_optional(line.as_ref(), y_near, y_far, rounding).unwrap_or_else(|e| {
                debug!("Dropping {} boundary: {}", side.as_str(), e);
                degenerate_lines += 1;
                None
            })
        };

        let lanes = FrameLanes {
            left: project(Side::Left, left_line),
            right: project(Side::Right, right_line),
        };

        FrameReconstruction {
            lanes,
            left_line,
            right_line,
            left_candidates: classified.left.len(),
            right_candidates: classified.right.len(),
            skipped_vertical: classified.skipped_vertical,
            degenerate_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PixelPoint, Rounding};

    fn reconstructor() -> LaneReconstructor {
        LaneReconstructor::new(ProjectionConfig::default())
    }

    #[test]
    fn test_empty_batch_gives_no_lanes() {
        let lanes = reconstructor().reconstruct(&[], 640, 480).unwrap();
        assert_eq!(lanes, FrameLanes::none());
        assert!(lanes.is_empty());
    }

    #[test]
    fn test_two_sided_scenario() {
        let segments = [
            RawSegment::new(10, 90, 50, 10),
            RawSegment::new(60, 10, 100, 90),
        ];
        let size = FrameSize::new(120, 100).unwrap();
        let result = reconstructor().reconstruct_detailed(&segments, size);

        assert_eq!(result.left_candidates, 1);
        assert_eq!(result.right_candidates, 1);
        assert_eq!(result.left_line, Some(LaneLine::new(-2.0, 110.0)));
        assert_eq!(result.right_line, Some(LaneLine::new(2.0, -110.0)));

        // y_near = 100, y_far = 60
        let left = result.lanes.left.unwrap();
        assert_eq!(left.near, PixelPoint::new(5, 100));
        assert_eq!(left.far, PixelPoint::new(25, 60));

        let right = result.lanes.right.unwrap();
        assert_eq!(right.near, PixelPoint::new(105, 100));
        assert_eq!(right.far, PixelPoint::new(85, 60));

        assert_eq!(result.lanes.count(), 2);
    }

    #[test]
    fn test_all_vertical_gives_no_lanes() {
        let segments = [
            RawSegment::new(100, 0, 100, 200),
            RawSegment::new(300, 50, 300, 120),
        ];
        let size = FrameSize::new(640, 480).unwrap();
        let result = reconstructor().reconstruct_detailed(&segments, size);
        assert_eq!(result.lanes, FrameLanes::none());
        assert_eq!(result.skipped_vertical, 2);
        assert_eq!(result.degenerate_lines, 0);
    }

    #[test]
    fn test_horizontal_segment_drops_right_side() {
        let segments = [RawSegment::new(0, 50, 40, 50)];
        let size = FrameSize::new(640, 480).unwrap();
        let result = reconstructor().reconstruct_detailed(&segments, size);

        assert_eq!(result.right_line, Some(LaneLine::new(0.0, 50.0)));
        assert_eq!(result.lanes.right, None);
        assert_eq!(result.lanes.left, None);
        assert_eq!(result.degenerate_lines, 1);
    }

    #[test]
    fn test_one_side_only() {
        let segments = [RawSegment::new(10, 90, 50, 10)];
        let lanes = reconstructor().reconstruct(&segments, 120, 100).unwrap();
        assert!(lanes.left.is_some());
        assert!(lanes.right.is_none());
        assert_eq!(lanes.count(), 1);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let segments = [RawSegment::new(10, 90, 50, 10)];
        let err = reconstructor().reconstruct(&segments, 0, 100).unwrap_err();
        assert_eq!(
            err,
            LaneError::InvalidFrameDimensions {
                width: 0,
                height: 100
            }
        );
        assert!(reconstructor().reconstruct(&[], 640, -1).is_err());
    }

    #[test]
    fn test_truncating_single_segment_is_pixel_exact() {
        let projection = ProjectionConfig {
            far_ratio: 0.6,
            rounding: Rounding::Truncate,
        };
        // y = -2x + 110: x = 5 at y = 100
        let segments = [RawSegment::new(10, 90, 50, 10)];
        let lanes = LaneReconstructor::new(projection)
            .reconstruct(&segments, 120, 100)
            .unwrap();
        let left = lanes.left.unwrap();
        assert_eq!(left.near, PixelPoint::new(5, 100));
        assert_eq!(left.far, PixelPoint::new(25, 60));
    }

    #[test]
    fn test_truncating_reconstructor() {
        let projection = ProjectionConfig {
            far_ratio: 0.6,
            rounding: Rounding::Truncate,
        };
        // slope -3, through (0, 301): x = (301 - y) / 3
        let segments = [RawSegment::new(0, 301, 100, 1)];
        let lanes = LaneReconstructor::new(projection)
            .reconstruct(&segments, 200, 101)
            .unwrap();
        let left = lanes.left.unwrap();
        // (301 - 101) / 3 = 66.67, (301 - 60.6) / 3 = 80.13
        assert_eq!(left.near, PixelPoint::new(66, 101));
        assert_eq!(left.far, PixelPoint::new(80, 60));
    }
}
