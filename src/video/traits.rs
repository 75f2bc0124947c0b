use crate::{error::Result, video::types::Frame};

/// Ordered supplier of decoded frames
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// The next frame, or `None` once the stream has ended
    async fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Consumer of repaired frames, in order
#[allow(async_fn_in_trait)]
pub trait FrameSink {
    async fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and close the output; no frames may be written afterwards
    async fn finish(&mut self) -> Result<()>;
}
