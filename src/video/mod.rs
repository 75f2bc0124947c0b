//! # Video I/O
//!
//! Frame source and sink around the external `ffmpeg`/`ffprobe` tools, plus
//! the JPEG snapshot writer used in comparison mode.

pub mod decoder;
pub mod encoder;
pub mod snapshot;
pub mod traits;
pub mod types;

pub use decoder::{probe, FfmpegDecoder, RawFrameReader, VideoMetadata};
pub use encoder::{check_ffmpeg_available, EncodedVideo, FfmpegEncoder};
pub use snapshot::SnapshotWriter;
pub use traits::{FrameSink, FrameSource};
pub use types::{Frame, VideoParams};
