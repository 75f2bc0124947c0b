//! # Pixel-Mender
//!
//! Repair a fixed rectangle of dead pixels in a video by copying values from
//! the valid pixels around it, frame by frame.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixel_mender::{config::Config, pipeline::RepairPipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.video.input = "holiday.mp4".into();
//! config.region.from = (948, 230);
//! config.region.to = (954, 235);
//!
//! let pipeline = RepairPipeline::from_config(config)?;
//! let report = pipeline.run().await?;
//! println!("Repaired {} frames", report.frames_repaired);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`region`] - The defective rectangle and the directional repair rule
//! - [`video`] - ffmpeg-backed frame source/sink and snapshot output
//! - [`pipeline`] - Runs frames from source through repair to output
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{PixelMenderError, Result},
    pipeline::{ProcessingReport, RepairPipeline},
    region::{FrameRepair, RepairEngine},
};
