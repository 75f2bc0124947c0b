use thiserror::Error;

/// Main error type for the pixel-mender library
#[derive(Error, Debug)]
pub enum PixelMenderError {
    #[error("Region error: {0}")]
    Region(#[from] RegionError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors about the defective rectangle and the frames it is applied to
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegionError {
    #[error("Invalid rectangle ({x0}, {y0})-({x1}, {y1}): corners are inverted")]
    InvalidRectangle { x0: u32, y0: u32, x1: u32, y1: u32 },

    #[error("Rectangle ({x0}, {y0}) touches row or column 0; there is no pixel above or left of it to copy from")]
    TouchesOrigin { x0: u32, y0: u32 },

    #[error("Rectangle edge ({x1}, {y1}) is outside the {width}x{height} frame")]
    OutOfBounds { x1: u32, y1: u32, width: u32, height: u32 },
}

/// Video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load video file: {path}")]
    LoadFailed { path: String },

    #[error("FFmpeg not found: {tool}")]
    ToolMissing { tool: String },

    #[error("Video probe failed: {reason}")]
    ProbeFailed { reason: String },

    #[error("Video decoding failed: {reason}")]
    DecodingFailed { reason: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Frame read failed at frame {index}: {reason}")]
    FrameReadFailure { index: u64, reason: String },

    #[error("Frame size mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PixelMenderError
pub type Result<T> = std::result::Result<T, PixelMenderError>;

impl PixelMenderError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::LoadFailed { path }) => {
                format!("Could not open video '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Video(VideoError::ToolMissing { tool }) => {
                format!("'{}' was not found on PATH. Install FFmpeg (e.g. `brew install ffmpeg` or `sudo apt install ffmpeg`).", tool)
            }
            Self::Region(RegionError::OutOfBounds { width, height, .. }) => {
                format!("The defective rectangle does not fit inside the {}x{} video. Check --from/--to.", width, height)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_error_converts() {
        let err: PixelMenderError = RegionError::TouchesOrigin { x0: 0, y0: 4 }.into();
        assert!(matches!(err, PixelMenderError::Region(RegionError::TouchesOrigin { .. })));
        assert!(err.to_string().contains("row or column 0"));
    }

    #[test]
    fn test_user_message_for_missing_ffmpeg() {
        let err: PixelMenderError = VideoError::ToolMissing { tool: "ffmpeg".to_string() }.into();
        assert!(err.user_message().contains("Install FFmpeg"));
    }
}
