use std::fmt;

/// Failures of the geometric core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneError {
    /// Fitted line has zero (or non-finite) slope and cannot be back-projected.
    DegenerateLine { slope: f64 },
    /// Frame width or height is not positive.
    InvalidFrameDimensions { width: i32, height: i32 },
}

impl fmt::Display for LaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateLine { slope } => {
                write!(f, "degenerate lane line (slope {slope}) cannot be projected")
            }
            Self::InvalidFrameDimensions { width, height } => {
                write!(f, "invalid frame dimensions {width}x{height}")
            }
        }
    }
}

impl std::error::Error for LaneError {}
