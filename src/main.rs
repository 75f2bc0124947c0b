use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pixel_mender::{
    config::{parse_corner, Config, OutputMode},
    pipeline::RepairPipeline,
    region::{BelowRule, ReadMode},
};

#[derive(Parser)]
#[command(
    name = "pixel-mender",
    version,
    about = "Repair a fixed rectangle of dead pixels in a video",
    long_about = "Pixel-Mender fills a known defective rectangle in every frame of a video with copies of the valid pixels around it, and writes a repaired video or before/after snapshots."
)]
struct Cli {
    /// Input video file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Top-left corner of the defective rectangle, as X,Y
    #[arg(long, value_parser = parse_corner)]
    from: Option<(u32, u32)>,

    /// Bottom-right corner of the defective rectangle, as X,Y
    #[arg(long, value_parser = parse_corner)]
    to: Option<(u32, u32)>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Save before/after stills every 100 frames instead of writing a video
    #[arg(long)]
    snapshots: bool,

    /// Copy the input's audio track into the output video
    #[arg(long)]
    audio: bool,

    /// Output frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Reproduce the original below-rule behaviour (pixels under the reference are left as-is)
    #[arg(long)]
    legacy_below: bool,

    /// Read source pixels from an untouched copy of each frame instead of cascading
    #[arg(long)]
    snapshot_read: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Command-line flags take precedence over the configuration file
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.video.input = input.clone();
        }
        if let Some(from) = self.from {
            config.region.from = from;
        }
        if let Some(to) = self.to {
            config.region.to = to;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(fps) = self.fps {
            config.video.params.fps = fps;
        }
        if self.snapshots {
            config.output.mode = OutputMode::Snapshots;
        }
        if self.audio {
            config.output.with_audio = true;
        }
        if self.legacy_below {
            config.region.below_rule = BelowRule::Legacy;
        }
        if self.snapshot_read {
            config.region.read_mode = ReadMode::Snapshot;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting Pixel-Mender v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    cli.apply_overrides(&mut config);

    if let Some(path) = &cli.write_config {
        config.validate()?;
        config.save_to_file(path)?;
        info!("Configuration written to {:?}", path);
        return Ok(());
    }

    info!("Input: {:?}", config.video.input);
    info!("Output: {:?} ({:?} mode)", config.output.directory, config.output.mode);

    let pipeline = RepairPipeline::from_config(config)?;
    let report = pipeline
        .run()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    info!(
        "Frames read: {}, repaired: {}, written: {}, snapshot pairs: {}",
        report.frames_read, report.frames_repaired, report.frames_written, report.snapshots_saved
    );
    println!("Processed in {} min.", started.elapsed().as_secs_f64() / 60.0);
    Ok(())
}
