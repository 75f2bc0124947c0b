use crate::{error::Result, video::types::Frame};

/// A stage that repairs frames in place
///
/// The pipeline only talks to this trait, so alternative repair strategies
/// can be dropped in without touching the I/O plumbing.
pub trait FrameRepair: Send + Sync {
    /// Returns the name used in log output
    fn name(&self) -> &str;

    /// Repair `frame` in place and return the number of pixels written
    ///
    /// Pixels outside the repaired region must be left untouched.
    fn repair(&self, frame: &mut Frame) -> Result<usize>;
}
