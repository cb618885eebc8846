// src/video_processor.rs

use crate::types::Config;
use anyhow::{bail, Context, Result};
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst, VideoWriter},
};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

pub struct VideoProcessor {
    config: Config,
}

impl VideoProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn find_video_files(&self) -> Result<Vec<PathBuf>> {
        let mut videos: Vec<PathBuf> = WalkDir::new(&self.config.video.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_video_file(p))
            .collect();
        videos.sort();

        info!("Found {} video files", videos.len());
        Ok(videos)
    }

    /// `<output_dir>/<stem>_lanes.mp4`
    pub fn default_output_path(&self, input_path: &Path) -> Result<PathBuf> {
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("No usable file name in {}", input_path.display()))?;
        Ok(PathBuf::from(&self.config.video.output_dir).join(format!("{}_lanes.mp4", stem)))
    }

    pub fn open_video(&self, path: &Path) -> Result<VideoReader> {
        info!("Opening video: {}", path.display());

        let path_str = path
            .to_str()
            .with_context(|| format!("Non UTF-8 path {}", path.display()))?;
        let cap = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;

        if !cap.is_opened()? {
            bail!("Failed to open video file {}", path.display());
        }

        let fps = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FPS)?;
        let total_frames = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_COUNT)? as i32;
        let width = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_HEIGHT)? as i32;

        info!(
            "Video properties: {}x{} @ {:.1} FPS, {} frames",
            width, height, fps, total_frames
        );

        Ok(VideoReader {
            cap,
            fps,
            total_frames,
            current_frame: 0,
            width,
            height,
        })
    }

    /// Video-only writer; audio from the source is not carried over.
    pub fn create_writer(
        &self,
        output_path: &Path,
        width: i32,
        height: i32,
        fps: f64,
    ) -> Result<VideoWriter> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Output video: {}", output_path.display());

        let code: Vec<char> = self.config.video.fourcc.chars().collect();
        let &[a, b, c, d] = code.as_slice() else {
            bail!("fourcc must be 4 characters, got {:?}", self.config.video.fourcc);
        };
        let fourcc = VideoWriter::fourcc(a, b, c, d)?;

        let path_str = output_path
            .to_str()
            .with_context(|| format!("Non UTF-8 path {}", output_path.display()))?;
        let writer = VideoWriter::new(
            path_str,
            fourcc,
            fps,
            core::Size::new(width, height),
            true,
        )?;

        if !writer.is_opened()? {
            bail!("Failed to open video writer {}", output_path.display());
        }

        Ok(writer)
    }
}

pub struct VideoReader {
    pub cap: VideoCapture,
    pub fps: f64,
    pub total_frames: i32,
    pub current_frame: i32,
    pub width: i32,
    pub height: i32,
}

impl VideoReader {
    /// Next BGR frame, `None` at end of stream.
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut mat = Mat::default();

        if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
            return Ok(None);
        }

        self.current_frame += 1;
        Ok(Some(mat))
    }

    /// Up to `max` frames; empty once the stream is exhausted.
    pub fn read_batch(&mut self, max: usize) -> Result<Vec<Mat>> {
        let mut frames = Vec::with_capacity(max);
        while frames.len() < max {
            match self.read_frame()? {
                Some(frame) => frames.push(frame),
                None => break,
            }
        }
        Ok(frames)
    }

    pub fn progress(&self) -> f32 {
        if self.total_frames <= 0 {
            return 0.0;
        }
        (self.current_frame as f32 / self.total_frames as f32) * 100.0
    }
}
