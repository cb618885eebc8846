// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use lane_finder::frame_pipeline::{FramePipeline, ProcessedFrame};
use lane_finder::pipeline::{FrameContext, MetricsSummary, PipelineMetrics};
use lane_finder::types::Config;
use lane_finder::video_processor::VideoProcessor;
use opencv::{prelude::*, videoio::VideoWriterTrait};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lane_finder")]
#[command(about = "Detect and draw lane boundaries in road videos")]
#[command(version)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, env = "LANE_FINDER_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Frames decoded per parallel batch (overrides video.batch_size).
    #[arg(long)]
    batch_size: Option<usize>,

    /// Single input video. Without it every video under video.input_dir is processed.
    input: Option<PathBuf>,

    /// Output path for the single input video.
    #[arg(requires = "input")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(batch_size) = cli.batch_size {
        config.video.batch_size = batch_size;
        config.validate()?;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lane_finder={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Lane finder starting");
    info!(
        "Canny {:.0}/{:.0}, Hough threshold={} min_len={:.0} max_gap={:.0}, far_ratio={:.2}, rounding={:?}",
        config.preprocessing.canny_low,
        config.preprocessing.canny_high,
        config.hough.threshold,
        config.hough.min_line_length,
        config.hough.max_line_gap,
        config.projection.far_ratio,
        config.projection.rounding
    );

    let video_processor = VideoProcessor::new(config.clone());
    let pipeline = FramePipeline::new(&config);

    let jobs: Vec<(PathBuf, PathBuf)> = match cli.input {
        Some(input) => {
            let output = match cli.output {
                Some(output) => output,
                None => video_processor.default_output_path(&input)?,
            };
            vec![(input, output)]
        }
        None => {
            let mut jobs = Vec::new();
            for input in video_processor.find_video_files()? {
                let output = video_processor.default_output_path(&input)?;
                jobs.push((input, output));
            }
            jobs
        }
    };

    if jobs.is_empty() {
        error!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    let total = jobs.len();
    let mut failures = 0;
    for (idx, (input, output)) in jobs.iter().enumerate() {
        info!("Processing video {}/{}: {}", idx + 1, total, input.display());

        match process_video(input, output, &video_processor, &pipeline, &config) {
            Ok(stats) => log_summary(&stats),
            Err(e) => {
                failures += 1;
                error!("Failed to process {}: {:#}", input.display(), e);
            }
        }
    }

    if failures > 0 {
        warn!("{} of {} video(s) failed", failures, total);
    }

    Ok(())
}

fn process_video(
    input: &Path,
    output: &Path,
    video_processor: &VideoProcessor,
    pipeline: &FramePipeline,
    config: &Config,
) -> Result<MetricsSummary> {
    let mut reader = video_processor.open_video(input)?;
    let mut writer =
        video_processor.create_writer(output, reader.width, reader.height, reader.fps)?;

    let mut frame_log = if config.video.save_frame_log {
        let path = output.with_extension("jsonl");
        info!("Frame log: {}", path.display());
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Some(BufWriter::new(file))
    } else {
        None
    };

    let metrics = PipelineMetrics::new();
    let mut frame_id: u64 = 0;

    loop {
        let batch = reader.read_batch(config.video.batch_size)?;
        if batch.is_empty() {
            break;
        }

        let batch_start = Instant::now();
        let processed: Vec<ProcessedFrame> = batch
            .into_par_iter()
            .map(|frame| pipeline.process(&frame))
            .collect::<Result<_>>()?;
        debug!(
            "Batch of {} frames in {:.1} ms",
            processed.len(),
            batch_start.elapsed().as_secs_f64() * 1000.0
        );

        for frame in processed {
            frame_id += 1;
            metrics.record_frame(frame.segment_count, &frame.reconstruction, frame.elapsed_us);

            if let Some(log) = frame_log.as_mut() {
                FrameContext::new(frame_id, reader.fps, frame.segment_count, frame.reconstruction)
                    .write_jsonl(log)?;
            }

            VideoWriterTrait::write(&mut writer, &frame.annotated)?;

            if frame_id % config.video.progress_interval.max(1) == 0 {
                info!(
                    "Frame {} ({:.1}%) | {:.1} FPS",
                    frame_id,
                    reader.progress(),
                    metrics.fps()
                );
            }
        }
    }

    writer.release()?;
    if let Some(mut log) = frame_log {
        log.flush()?;
    }

    let summary = metrics.summary();
    let summary_path = summary_path(output);
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    info!("Summary written to {}", summary_path.display());

    Ok(summary)
}

/// `<dir>/<stem>_summary.json` next to the output video.
fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lanes".to_string());
    output.with_file_name(format!("{}_summary.json", stem))
}

fn log_summary(stats: &MetricsSummary) {
    info!("Video processed");
    info!("  Total frames: {}", stats.total_frames);
    info!(
        "  Frames with lanes: {:.1}% (both: {}, one: {}, none: {})",
        stats.detection_rate(),
        stats.frames_with_both_lanes,
        stats.frames_with_one_lane,
        stats.frames_without_lanes
    );
    info!(
        "  Segments: {} ({} vertical skipped)",
        stats.segments_detected, stats.vertical_segments_skipped
    );
    if stats.degenerate_lines > 0 {
        warn!("  Horizontal fits dropped: {}", stats.degenerate_lines);
    }
    info!(
        "  Processing speed: {:.1} FPS ({} us/frame)",
        stats.fps, stats.avg_frame_us
    );
}
