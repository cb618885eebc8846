// src/frame_pipeline.rs
//
// Image side of lane finding:
//
//   BGR frame → gray → gaussian blur → canny → ROI polygon mask
//             → HoughLinesP → RawSegment[] → LaneReconstructor
//             → boundaries drawn on a black canvas → added onto the frame

use crate::lanes::{FrameReconstruction, LaneReconstructor};
use crate::types::{
    Config, FrameLanes, FrameSize, HoughConfig, PreprocessingConfig, RawSegment, RegionConfig,
    RenderConfig,
};
use anyhow::Result;
use opencv::{
    core::{self, Mat, Vector},
    imgproc,
    prelude::*,
};
use std::time::Instant;
use tracing::trace;

pub struct ProcessedFrame {
    pub annotated: Mat,
    pub segment_count: usize,
    pub reconstruction: FrameReconstruction,
    pub elapsed_us: u64,
}

/// Per-frame processing; immutable, shared by all rayon workers.
pub struct FramePipeline {
    preprocessing: PreprocessingConfig,
    region: RegionConfig,
    hough: HoughConfig,
    render: RenderConfig,
    reconstructor: LaneReconstructor,
}

impl FramePipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            preprocessing: config.preprocessing.clone(),
            region: config.region.clone(),
            hough: config.hough.clone(),
            render: config.render.clone(),
            reconstructor: LaneReconstructor::new(config.projection),
        }
    }

    pub fn process(&self, frame: &Mat) -> Result<ProcessedFrame> {
        let start = Instant::now();
        let size = FrameSize::new(frame.cols(), frame.rows())?;

        let segments = self.detect_segments(frame)?;
        let reconstruction = self.reconstructor.reconstruct_detailed(&segments, size);
        let annotated = draw_lanes(frame, &reconstruction.lanes, &self.render)?;

        trace!(
            "segments={} left={} right={}",
            segments.len(),
            reconstruction.left_candidates,
            reconstruction.right_candidates
        );

        Ok(ProcessedFrame {
            annotated,
            segment_count: segments.len(),
            reconstruction,
            elapsed_us: start.elapsed().as_micros() as u64,
        })
    }

    pub fn detect_segments(&self, frame: &Mat) -> Result<Vec<RawSegment>> {
        let edges = edge_image(frame, &self.preprocessing)?;
        let masked = select_region(&edges, &self.region)?;
        hough_segments(&masked, &self.hough)
    }
}

pub fn edge_image(frame: &Mat, config: &PreprocessingConfig) -> Result<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

    let mut blurred = Mat::default();
    let k = config.blur_kernel;
    imgproc::gaussian_blur(
        &gray,
        &mut blurred,
        core::Size::new(k, k),
        0.0,
        0.0,
        core::BORDER_DEFAULT,
    )?;

    let mut edges = Mat::default();
    imgproc::canny(
        &blurred,
        &mut edges,
        config.canny_low,
        config.canny_high,
        3,
        false,
    )?;
    Ok(edges)
}

/// ROI vertices scaled to the image, truncated to whole pixels.
pub fn region_polygon(region: &RegionConfig, cols: i32, rows: i32) -> Vector<core::Point> {
    region
        .vertices
        .iter()
        .map(|[fx, fy]| core::Point::new((cols as f32 * fx) as i32, (rows as f32 * fy) as i32))
        .collect()
}

/// Zero everything outside the ROI polygon.
pub fn select_region(image: &Mat, region: &RegionConfig) -> Result<Mat> {
    let mut mask = Mat::new_size_with_default(image.size()?, image.typ(), core::Scalar::all(0.0))?;

    let mut polygons = Vector::<Vector<core::Point>>::new();
    polygons.push(region_polygon(region, image.cols(), image.rows()));
    imgproc::fill_poly(
        &mut mask,
        &polygons,
        core::Scalar::all(255.0),
        imgproc::LINE_8,
        0,
        core::Point::new(0, 0),
    )?;

    let mut masked = Mat::default();
    core::bitwise_and(image, &mask, &mut masked, &core::no_array())?;
    Ok(masked)
}

pub fn hough_segments(edges: &Mat, config: &HoughConfig) -> Result<Vec<RawSegment>> {
    let mut lines = Vector::<core::Vec4i>::new();
    imgproc::hough_lines_p(
        edges,
        &mut lines,
        config.rho,
        config.theta_rad(),
        config.threshold,
        config.min_line_length,
        config.max_line_gap,
    )?;

    Ok(lines
        .iter()
        .map(|l| RawSegment::new(l[0], l[1], l[2], l[3]))
        .collect())
}

/// Draw the present boundaries and add them onto the frame at full weight.
/// Points far outside the canvas are clipped by OpenCV.
pub fn draw_lanes(frame: &Mat, lanes: &FrameLanes, render: &RenderConfig) -> Result<Mat> {
    let mut line_image =
        Mat::new_size_with_default(frame.size()?, frame.typ(), core::Scalar::all(0.0))?;

    let [r, g, b] = render.color;
    let color = core::Scalar::new(b as f64, g as f64, r as f64, 0.0);

    for boundary in lanes.iter() {
        imgproc::line(
            &mut line_image,
            core::Point::new(boundary.near.x, boundary.near.y),
            core::Point::new(boundary.far.x, boundary.far.y),
            color,
            render.thickness,
            imgproc::LINE_8,
            0,
        )?;
    }

    let mut blended = Mat::default();
    core::add_weighted(frame, 1.0, &line_image, 1.0, 0.0, &mut blended, -1)?;
    Ok(blended)
}
