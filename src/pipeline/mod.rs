//! # Repair Pipeline
//!
//! Connects a frame source, the repair stage and an output for one run.

pub mod runner;

pub use runner::{ProcessingReport, RepairPipeline};
