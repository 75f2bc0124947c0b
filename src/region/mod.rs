//! # Region Repair
//!
//! Replaces the pixels of a fixed defective rectangle with copies of nearby
//! valid pixels.
//!
//! Every interior pixel is classified against the rectangle's reference point
//! (its midpoint, rounded up) and copies from exactly one neighbour:
//!
//! - **Above** the reference: the pixel one row up
//! - **Left** of the reference: the pixel one column left
//! - **Right** of the reference: the rectangle's right edge, same row
//! - **Below** the reference: the rectangle's bottom edge, same column
//! - **Center**: the rectangle's bottom-right corner
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pixel_mender::region::{BelowRule, ReadMode, Rect, RepairEngine};
//! use pixel_mender::video::Frame;
//!
//! # fn main() -> pixel_mender::Result<()> {
//! let rect = Rect::new((948, 230), (954, 235))?;
//! let engine = RepairEngine::new(rect, BelowRule::Corrected, ReadMode::Cascade)?;
//!
//! let mut frame = Frame::open("still.png")?;
//! engine.repair_frame(&mut frame)?;
//! # Ok(())
//! # }
//! ```

pub mod direction;
pub mod engine;
pub mod rect;
pub mod traits;

pub use direction::{BelowRule, Direction};
pub use engine::{CopyStep, ReadMode, RepairEngine};
pub use rect::{Point, Rect};
pub use traits::FrameRepair;
