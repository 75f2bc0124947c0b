use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, OutputMode},
    error::{Result, VideoError},
    region::{FrameRepair, Rect, RepairEngine},
    video::{
        check_ffmpeg_available, FfmpegDecoder, FfmpegEncoder, FrameSink, FrameSource,
        SnapshotWriter,
    },
};

/// Frames between progress log lines
const PROGRESS_EVERY: u64 = 500;

/// Drives frames from a source through the repair stage into the output
///
/// Frames are processed strictly one at a time: decode, repair, write, and
/// only then request the next one. No state is carried between frames.
pub struct RepairPipeline {
    config: Config,
    repair: Box<dyn FrameRepair>,
}

impl RepairPipeline {
    /// Create a pipeline with the given configuration and repair stage
    pub fn new(config: Config, repair: Box<dyn FrameRepair>) -> Self {
        Self { config, repair }
    }

    /// Validate `config` and build the directional repair engine from it
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let engine = RepairEngine::from_config(&config.region)?;
        info!(
            "Defective rectangle ({}, {})-({}, {}), reference ({}, {}), {:?} reads, {:?} below rule",
            engine.rect().x0,
            engine.rect().y0,
            engine.rect().x1,
            engine.rect().y1,
            engine.reference().x,
            engine.reference().y,
            engine.read_mode(),
            engine.below_rule()
        );
        Ok(Self::new(config, Box::new(engine)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run against the configured input with ffmpeg as decoder and encoder
    pub async fn run(&self) -> Result<ProcessingReport> {
        if !check_ffmpeg_available() {
            return Err(VideoError::ToolMissing { tool: "ffmpeg".to_string() }.into());
        }

        let input = &self.config.video.input;
        let mut decoder = FfmpegDecoder::open(input).await?;
        let metadata = decoder.metadata().clone();

        Rect::new(self.config.region.from, self.config.region.to)?
            .check_fits(metadata.width, metadata.height)?;

        let params = &self.config.video.params;
        if let Some(fps) = metadata.fps {
            if (fps - params.fps).abs() > 0.01 {
                warn!("Input is {:.3} fps but output is set to {} fps", fps, params.fps);
            }
        }

        match self.config.output.mode {
            OutputMode::Snapshots => {
                let writer = SnapshotWriter::create(&self.config.output.directory)?;
                self.run_snapshots(&mut decoder, &writer).await
            }
            OutputMode::Video => {
                std::fs::create_dir_all(&self.config.output.directory)?;

                let audio_from = if self.config.output.with_audio {
                    if !metadata.has_audio {
                        warn!("Audio passthrough requested but {} has no audio stream", input.display());
                    }
                    Some(input.as_path())
                } else {
                    None
                };

                let output_path = self.config.output.video_path();
                let mut encoder = FfmpegEncoder::spawn(
                    &output_path,
                    (metadata.width, metadata.height),
                    params,
                    audio_from,
                )?;

                let report = self.run_video(&mut decoder, &mut encoder).await?;

                let encoded = encoder.output_info()?;
                info!(
                    "Output saved: {} ({} frames, {:.1} MB)",
                    encoded.path.display(),
                    encoded.frame_count,
                    encoded.file_size as f64 / 1024.0 / 1024.0
                );
                Ok(report)
            }
        }
    }

    /// Repair every frame from `source` and write it to `sink`, in order
    pub async fn run_video<S, K>(&self, source: &mut S, sink: &mut K) -> Result<ProcessingReport>
    where
        S: FrameSource,
        K: FrameSink,
    {
        let started = Instant::now();
        let mut report = ProcessingReport::default();
        info!("Repairing video with {} repair", self.repair.name());

        while let Some(mut frame) = source.next_frame().await? {
            report.frames_read += 1;

            report.pixels_written += self.repair.repair(&mut frame)?;
            report.frames_repaired += 1;

            sink.write_frame(&frame).await?;
            report.frames_written += 1;

            if report.frames_read % PROGRESS_EVERY == 0 {
                info!("Processed {} frames", report.frames_read);
            }
        }

        sink.finish().await?;
        report.elapsed = started.elapsed();

        info!(
            "Video done: {} frames read, {} written in {:.1}s",
            report.frames_read,
            report.frames_written,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Save before/after stills for every `snapshot_interval`-th frame
    ///
    /// Frames are numbered from 1. Frames in between are decoded and dropped
    /// without being repaired.
    pub async fn run_snapshots<S>(&self, source: &mut S, writer: &SnapshotWriter) -> Result<ProcessingReport>
    where
        S: FrameSource,
    {
        let started = Instant::now();
        let interval = self.config.output.snapshot_interval;
        let mut report = ProcessingReport::default();
        info!("Saving comparison snapshots every {} frames", interval);

        while let Some(original) = source.next_frame().await? {
            report.frames_read += 1;
            let index = report.frames_read;

            if index % interval != 0 {
                continue;
            }

            let mut repaired = original.clone();
            report.pixels_written += self.repair.repair(&mut repaired)?;
            report.frames_repaired += 1;

            writer.save_pair(index, &original, &repaired)?;
            report.snapshots_saved += 1;
            debug!("Snapshot pair saved for frame {}", index);
        }

        report.elapsed = started.elapsed();
        info!(
            "Snapshots done: {} frames read, {} pairs saved",
            report.frames_read, report.snapshots_saved
        );
        Ok(report)
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingReport {
    pub frames_read: u64,
    pub frames_repaired: u64,
    pub frames_written: u64,
    pub snapshots_saved: u64,
    pub pixels_written: usize,
    pub elapsed: Duration,
}

impl ProcessingReport {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }
}
