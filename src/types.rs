use crate::error::LaneError;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub video: VideoConfig,
    pub preprocessing: PreprocessingConfig,
    pub region: RegionConfig,
    pub hough: HoughConfig,
    pub projection: ProjectionConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub fourcc: String,
    /// Frames decoded before each parallel reconstruction pass.
    pub batch_size: usize,
    pub progress_interval: u64,
    pub save_frame_log: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_dir: "videos".to_string(),
            output_dir: "output".to_string(),
            fourcc: "mp4v".to_string(),
            batch_size: 32,
            progress_interval: 100,
            save_frame_log: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Gaussian kernel side, must be odd.
    pub blur_kernel: i32,
    pub canny_low: f64,
    pub canny_high: f64,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

/// Region-of-interest polygon, vertices as (x, y) fractions of (cols, rows).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub vertices: Vec<[f32; 2]>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            vertices: vec![[0.1, 0.95], [0.4, 0.6], [0.6, 0.6], [0.9, 0.95]],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    pub rho: f64,
    pub theta_deg: f64,
    pub threshold: i32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta_deg: 1.0,
            threshold: 20,
            min_line_length: 20.0,
            max_line_gap: 500.0,
        }
    }
}

impl HoughConfig {
    pub fn theta_rad(&self) -> f64 {
        self.theta_deg.to_radians()
    }
}

/// How back-projected coordinates become integer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Half away from zero.
    #[default]
    Nearest,
    /// Toward zero, like an integer cast.
    Truncate,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Nearest => value.round(),
            Rounding::Truncate => value.trunc(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Far end of each boundary as a fraction of frame height.
    pub far_ratio: f64,
    pub rounding: Rounding,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            far_ratio: 0.6,
            rounding: Rounding::Nearest,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGB
    pub color: [u8; 3],
    pub thickness: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: [255, 0, 0],
            thickness: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Validated frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    width: i32,
    height: i32,
}

impl FrameSize {
    pub fn new(width: i32, height: i32) -> Result<Self, LaneError> {
        if width <= 0 || height <= 0 {
            return Err(LaneError::InvalidFrameDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

/// Line segment straight from the Hough detector, pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RawSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }

    pub fn length(&self) -> f64 {
        let dx = self.x2 as f64 - self.x1 as f64;
        let dy = self.y2 as f64 - self.y1 as f64;
        dx.hypot(dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Image y grows downward, so the left boundary leans with negative slope.
    pub fn from_slope(slope: f64) -> Self {
        if slope < 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

/// Slope-intercept form of one non-vertical segment, weighted by its length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentCandidate {
    pub slope: f64,
    pub intercept: f64,
    pub length: f64,
}

/// Fitted line y = slope * x + intercept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneLine {
    pub slope: f64,
    pub intercept: f64,
}

impl LaneLine {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// x at a given y. `None` when the line is horizontal.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        if self.slope == 0.0 || !self.slope.is_finite() {
            return None;
        }
        Some((y - self.intercept) / self.slope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Drawable lane boundary: `near` on the bottom row, `far` up the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneBoundary {
    pub near: PixelPoint,
    pub far: PixelPoint,
}

/// Both boundaries for one frame; either may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameLanes {
    pub left: Option<LaneBoundary>,
    pub right: Option<LaneBoundary>,
}

impl FrameLanes {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaneBoundary> {
        self.left.iter().chain(self.right.iter())
    }
}
