// Repair a single still image, handy for trying out a rectangle before a full video run

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use pixel_mender::{
    config::{parse_corner, Config},
    region::{BelowRule, ReadMode, Rect, RepairEngine},
    video::Frame,
};

#[derive(Parser)]
#[command(name = "repair-image", version, about = "Repair the defective rectangle in one still image")]
struct Cli {
    /// Image to repair (PNG or JPEG)
    input: PathBuf,

    /// Where to write the repaired image
    output: PathBuf,

    /// Top-left corner, as X,Y (defaults to the configuration)
    #[arg(long, value_parser = parse_corner)]
    from: Option<(u32, u32)>,

    /// Bottom-right corner, as X,Y (defaults to the configuration)
    #[arg(long, value_parser = parse_corner)]
    to: Option<(u32, u32)>,

    /// Use the original below-rule behaviour
    #[arg(long)]
    legacy_below: bool,

    /// Read from an untouched copy instead of cascading
    #[arg(long)]
    snapshot_read: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    let region = match &cli.config {
        Some(path) => Config::from_file(path)?.region,
        None => Config::default().region,
    };

    let rect = Rect::new(cli.from.unwrap_or(region.from), cli.to.unwrap_or(region.to))?;
    let below_rule = if cli.legacy_below { BelowRule::Legacy } else { region.below_rule };
    let read_mode = if cli.snapshot_read { ReadMode::Snapshot } else { region.read_mode };

    let engine = RepairEngine::new(rect, below_rule, read_mode)?;

    let mut frame = Frame::open(&cli.input)?;
    let written = engine.repair_frame(&mut frame)?;
    frame.save(&cli.output)?;

    info!(
        "Repaired {} pixels in {:?}, saved to {:?}",
        written, cli.input, cli.output
    );
    Ok(())
}
