use crate::error::LaneError;
use crate::types::{LaneBoundary, LaneLine, PixelPoint, Rounding};

fn to_pixel(value: f64, rounding: Rounding) -> i32 {
    // `as` saturates, so near-flat lines land far off canvas instead of wrapping.
    rounding.apply(value) as i32
}

/// Back-project `line` onto the rows `y_near` and `y_far`.
///
/// Fails with [`LaneError::DegenerateLine`] when the line is horizontal.
/// Coordinates outside the frame are returned as is.
pub fn project_boundary(
    line: &LaneLine,
    y_near: f64,
    y_far: f64,
    rounding: Rounding,
) -> Result<LaneBoundary, LaneError> {
    let degenerate = LaneError::DegenerateLine { slope: line.slope };
    let x_near = line.x_at(y_near).ok_or(degenerate)?;
    let x_far = line.x_at(y_far).ok_or(degenerate)?;

    if !x_near.is_finite() || !x_far.is_finite() {
        return Err(degenerate);
    }

    Ok(LaneBoundary {
        near: PixelPoint::new(to_pixel(x_near, rounding), to_pixel(y_near, rounding)),
        far: PixelPoint::new(to_pixel(x_far, rounding), to_pixel(y_far, rounding)),
    })
}

/// Absent line maps to absent boundary.
pub fn project_optional(
    line: Option<&LaneLine>,
    y_near: f64,
    y_far: f64,
    rounding: Rounding,
) -> Result<Option<LaneBoundary>, LaneError> {
    line.map(|l| project_boundary(l, y_near, y_far, rounding))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_line_nearest() {
        let line = LaneLine::new(2.0, 3.0);
        let boundary = project_boundary(&line, 100.0, 10.0, Rounding::Nearest).unwrap();
        assert_eq!(boundary.near, PixelPoint::new(49, 100));
        assert_eq!(boundary.far, PixelPoint::new(4, 10));
    }

    #[test]
    fn test_known_line_truncate() {
        let line = LaneLine::new(2.0, 3.0);
        let boundary = project_boundary(&line, 100.0, 10.0, Rounding::Truncate).unwrap();
        assert_eq!(boundary.near, PixelPoint::new(48, 100));
        assert_eq!(boundary.far, PixelPoint::new(3, 10));
    }

    #[test]
    fn test_negative_coordinates_round_symmetrically() {
        // x = (0 - 5) / 2 = -2.5
        let line = LaneLine::new(2.0, 5.0);
        let nearest = project_boundary(&line, 0.0, 0.0, Rounding::Nearest).unwrap();
        let truncate = project_boundary(&line, 0.0, 0.0, Rounding::Truncate).unwrap();
        assert_eq!(nearest.near.x, -3);
        assert_eq!(truncate.near.x, -2);
    }

    #[test]
    fn test_fractional_far_row() {
        // 0.6 * 541 = 324.6
        let line = LaneLine::new(-1.0, 800.0);
        let nearest = project_boundary(&line, 541.0, 324.6, Rounding::Nearest).unwrap();
        assert_eq!(nearest.far.y, 325);
        let truncate = project_boundary(&line, 541.0, 324.6, Rounding::Truncate).unwrap();
        assert_eq!(truncate.far.y, 324);
    }

    #[test]
    fn test_horizontal_line_is_degenerate() {
        let line = LaneLine::new(0.0, 50.0);
        let err = project_boundary(&line, 100.0, 60.0, Rounding::Nearest).unwrap_err();
        assert_eq!(err, LaneError::DegenerateLine { slope: 0.0 });
    }

    #[test]
    fn test_near_flat_line_passes_through_off_canvas() {
        let line = LaneLine::new(1e-6, 0.0);
        let boundary = project_boundary(&line, 720.0, 432.0, Rounding::Nearest).unwrap();
        assert_eq!(boundary.near.x, 720_000_000);
        assert_eq!(boundary.far.x, 432_000_000);
    }

    #[test]
    fn test_extreme_line_saturates() {
        let line = LaneLine::new(1e-300, 0.0);
        let boundary = project_boundary(&line, 720.0, 432.0, Rounding::Nearest).unwrap();
        assert_eq!(boundary.near.x, i32::MAX);
    }

    #[test]
    fn test_absent_line_gives_absent_boundary() {
        assert_eq!(
            project_optional(None, 100.0, 60.0, Rounding::Nearest),
            Ok(None)
        );
    }
}
