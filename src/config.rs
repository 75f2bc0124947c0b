use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    region::{BelowRule, ReadMode, Rect},
    video::VideoParams,
};

/// Main configuration for a repair run
///
/// Built once at start-up and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The defective rectangle and how it is repaired
    pub region: RegionConfig,

    /// Input file and output video parameters
    pub video: VideoConfig,

    /// What the run produces
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.region.validate()?;
        self.video.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// The defective rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Top-left corner (x, y)
    pub from: (u32, u32),

    /// Bottom-right corner (x, y); the pixels repaired stop one short of it
    pub to: (u32, u32),

    /// Evaluation of the below-the-reference rule
    pub below_rule: BelowRule,

    /// Whether repaired pixels feed later pixels in the same pass
    pub read_mode: ReadMode,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            from: (948, 230),
            to: (954, 235),
            below_rule: BelowRule::default(),
            read_mode: ReadMode::default(),
        }
    }
}

impl RegionConfig {
    fn validate(&self) -> Result<()> {
        let rect = Rect::new(self.from, self.to).map_err(|_| ConfigError::InvalidValue {
            key: "region.from/to".to_string(),
            value: format!("{:?}-{:?}", self.from, self.to),
        })?;

        if !rect.is_empty() && (rect.x0 == 0 || rect.y0 == 0) {
            return Err(ConfigError::InvalidValue {
                key: "region.from".to_string(),
                value: format!("{:?}", self.from),
            }
            .into());
        }

        Ok(())
    }
}

/// Input and output video settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Video to repair
    pub input: PathBuf,

    /// Output encoding parameters
    pub params: VideoParams,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.mp4"),
            params: VideoParams::default(),
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingKey { key: "video.input".to_string() }.into());
        }

        if !(self.params.fps.is_finite() && self.params.fps > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "video.params.fps".to_string(),
                value: self.params.fps.to_string(),
            }
            .into());
        }

        let (width, height) = self.params.resolution;
        // yuv420p needs even dimensions
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.resolution".to_string(),
                value: format!("{}x{}", width, height),
            }
            .into());
        }

        if !(1..=31).contains(&self.params.quality) {
            return Err(ConfigError::InvalidValue {
                key: "video.params.quality".to_string(),
                value: self.params.quality.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// What a run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One repaired output video
    #[default]
    Video,
    /// Before/after stills every `snapshot_interval` frames, no video
    Snapshots,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,

    /// Directory for all output files, created if absent
    pub directory: PathBuf,

    /// File name of the output video inside `directory`
    pub video_file: String,

    /// Save a snapshot pair for every frame whose 1-based index is a multiple of this
    pub snapshot_interval: u64,

    /// Copy the input's audio track into the output video
    pub with_audio: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Video,
            directory: PathBuf::from("output"),
            video_file: "video_output.avi".to_string(),
            snapshot_interval: 100,
            with_audio: false,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.snapshot_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "output.snapshot_interval".to_string(),
                value: self.snapshot_interval.to_string(),
            }
            .into());
        }

        if self.video_file.is_empty() {
            return Err(ConfigError::MissingKey { key: "output.video_file".to_string() }.into());
        }

        Ok(())
    }

    /// Full path of the output video
    pub fn video_path(&self) -> PathBuf {
        self.directory.join(&self.video_file)
    }
}

/// Parse a corner given as `X,Y` on the command line
pub fn parse_corner(value: &str) -> std::result::Result<(u32, u32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let x = x.trim().parse().map_err(|_| format!("invalid x coordinate '{}'", x))?;
    let y = y.trim().parse().map_err(|_| format!("invalid y coordinate '{}'", y))?;
    Ok((x, y))
}
