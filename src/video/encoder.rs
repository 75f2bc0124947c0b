use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info};

use crate::error::{Result, VideoError};
use crate::video::traits::FrameSink;
use crate::video::types::{Frame, VideoParams};

/// Summary of a finished output video
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub frame_count: u64,
    pub file_size: u64,
}

/// Check that the `ffmpeg` executable can be run
pub fn check_ffmpeg_available() -> bool {
    StdCommand::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Encodes raw rgb24 frames into an XVID `.avi` through an `ffmpeg` child process
///
/// When an audio source is given, its first audio stream is copied into the
/// output without re-encoding.
pub struct FfmpegEncoder {
    output: PathBuf,
    input_size: (u32, u32),
    child: Child,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegEncoder {
    /// Start an encoder for frames of `input_size`
    pub fn spawn<P: AsRef<Path>>(
        output: P,
        input_size: (u32, u32),
        params: &VideoParams,
        audio_from: Option<&Path>,
    ) -> Result<Self> {
        let output = output.as_ref().to_path_buf();
        let args = Self::build_args(&output, input_size, params, audio_from);
        debug!("ffmpeg {}", args.join(" "));

        let mut command = Command::new("ffmpeg");
        command.args(&args);
        let encoder = Self::start(command, output, input_size)?;

        info!(
            "Encoding {}x{} -> {}x{} @ {} fps into {}",
            input_size.0,
            input_size.1,
            params.resolution.0,
            params.resolution.1,
            params.fps,
            encoder.output.display()
        );
        Ok(encoder)
    }

    /// Run `command` as the encoder, feeding it raw frames on stdin
    fn start(mut command: Command, output: PathBuf, input_size: (u32, u32)) -> Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VideoError::EncodingFailed {
                reason: format!("failed to spawn ffmpeg: {}", e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "ffmpeg stdin not captured".to_string(),
        })?;

        Ok(Self {
            output,
            input_size,
            child,
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    /// Command-line arguments for the encoder process
    pub fn build_args(
        output: &Path,
        input_size: (u32, u32),
        params: &VideoParams,
        audio_from: Option<&Path>,
    ) -> Vec<String> {
        let mut args: Vec<String> = [
            "-v", "error",
            "-y",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.push("-s".to_string());
        args.push(format!("{}x{}", input_size.0, input_size.1));
        args.push("-r".to_string());
        args.push(params.fps.to_string());
        args.push("-i".to_string());
        args.push("-".to_string());

        if let Some(audio) = audio_from {
            args.push("-i".to_string());
            args.push(audio.display().to_string());
            for arg in ["-map", "0:v:0", "-map", "1:a:0?", "-c:a", "copy"] {
                args.push(arg.to_string());
            }
        }

        if input_size != params.resolution {
            args.push("-vf".to_string());
            args.push(format!("scale={}:{}", params.resolution.0, params.resolution.1));
        }

        for arg in ["-c:v", "mpeg4", "-vtag", "XVID", "-pix_fmt", "yuv420p", "-q:v"] {
            args.push(arg.to_string());
        }
        args.push(params.quality.to_string());
        args.push(output.display().to_string());

        args
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Summary of the written file; call after [`FrameSink::finish`]
    pub fn output_info(&self) -> Result<EncodedVideo> {
        let metadata = std::fs::metadata(&self.output)?;
        Ok(EncodedVideo {
            path: self.output.clone(),
            frame_count: self.frames_written,
            file_size: metadata.len(),
        })
    }
}

impl FrameSink for FfmpegEncoder {
    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.dimensions() != self.input_size {
            return Err(VideoError::DimensionMismatch {
                expected: self.input_size,
                actual: frame.dimensions(),
            }
            .into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| VideoError::EncodingFailed {
            reason: "encoder already finished".to_string(),
        })?;

        stdin
            .write_all(frame.as_rgb_bytes())
            .await
            .map_err(|e| VideoError::EncodingFailed {
                reason: format!("writing frame {} failed: {}", self.frames_written + 1, e),
            })?;

        self.frames_written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.flush().await?;
            // Closing stdin signals end of input to ffmpeg
            drop(stdin);
        }

        let status = self.child.wait().await.map_err(|e| VideoError::EncodingFailed {
            reason: format!("waiting for ffmpeg failed: {}", e),
        })?;

        check_exit(status)?;
        debug!("Encoder finished after {} frames", self.frames_written);
        Ok(())
    }
}

/// A non-zero encoder exit means the output file cannot be trusted
fn check_exit(status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(VideoError::EncodingFailed {
        reason: format!("ffmpeg exited with {}", status),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PixelMenderError;

    fn params() -> VideoParams {
        VideoParams {
            fps: 30.0,
            resolution: (1920, 1080),
            quality: 4,
        }
    }

    #[test]
    fn test_args_without_audio() {
        let args = FfmpegEncoder::build_args(Path::new("out/video_output.avi"), (1920, 1080), &params(), None);
        let joined = args.join(" ");

        assert!(joined.contains("-f rawvideo -pix_fmt rgb24 -s 1920x1080 -r 30 -i -"));
        assert!(joined.contains("-c:v mpeg4 -vtag XVID"));
        assert!(!joined.contains("-c:a"));
        assert!(!joined.contains("scale="));
        assert_eq!(args.last().map(String::as_str), Some("out/video_output.avi"));
    }

    #[test]
    fn test_args_with_audio_passthrough() {
        let args = FfmpegEncoder::build_args(
            Path::new("out.avi"),
            (1920, 1080),
            &params(),
            Some(Path::new("input.mp4")),
        );
        let joined = args.join(" ");

        assert!(joined.contains("-i input.mp4 -map 0:v:0 -map 1:a:0? -c:a copy"));
    }

    #[test]
    fn test_args_scale_to_configured_resolution() {
        let args = FfmpegEncoder::build_args(Path::new("out.avi"), (1280, 720), &params(), None);
        let joined = args.join(" ");

        assert!(joined.contains("-s 1280x720"));
        assert!(joined.contains("-vf scale=1920:1080"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_check() {
        use std::os::unix::process::ExitStatusExt;

        assert!(check_exit(ExitStatus::from_raw(0)).is_ok());
        // Raw wait status for exit code 1
        let result = check_exit(ExitStatus::from_raw(1 << 8));
        assert!(matches!(
            result,
            Err(PixelMenderError::Video(VideoError::EncodingFailed { .. }))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_encoder_reports_on_finish() {
        let mut command = Command::new("sh");
        command.args(["-c", "cat > /dev/null; exit 3"]);
        let mut encoder = FfmpegEncoder::start(command, PathBuf::from("unused.avi"), (2, 2)).unwrap();

        encoder.write_frame(&Frame::new_filled(2, 2, [0, 0, 0])).await.unwrap();
        assert_eq!(encoder.frames_written(), 1);

        let result = encoder.finish().await;
        match result {
            Err(PixelMenderError::Video(VideoError::EncodingFailed { reason })) => {
                assert!(reason.contains("exit"), "unexpected reason: {}", reason);
            }
            other => panic!("expected EncodingFailed, got {:?}", other.map(|_| ())),
        }

        // Writing after finish is refused
        assert!(encoder.write_frame(&Frame::new_filled(2, 2, [0, 0, 0])).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_encoder_rejects_wrong_frame_size() {
        let mut command = Command::new("sh");
        command.args(["-c", "cat > /dev/null"]);
        let mut encoder = FfmpegEncoder::start(command, PathBuf::from("unused.avi"), (2, 2)).unwrap();

        let result = encoder.write_frame(&Frame::new_filled(3, 2, [0, 0, 0])).await;
        assert!(matches!(
            result,
            Err(PixelMenderError::Video(VideoError::DimensionMismatch { .. }))
        ));
        assert!(encoder.finish().await.is_ok());
    }
}
