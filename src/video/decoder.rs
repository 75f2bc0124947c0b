use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::error::{Result, VideoError};
use crate::video::traits::FrameSource;
use crate::video::types::{rgb_frame_len, Frame};

/// Properties of the input video, as reported by ffprobe
///
/// `width` and `height` are the displayed size: ffmpeg applies the stream's
/// rotation while decoding, so a quarter-turned stream has its coded size swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
    pub codec: String,
    pub frame_count: Option<u64>,
    pub duration: Option<f64>,
    pub has_audio: bool,
    /// Display rotation in degrees, normalized to 0, 90, 180 or 270
    pub rotation: u32,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    tags: Option<ProbeTags>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    /// Rotation from the display matrix side data, or the legacy `rotate` tag
    fn rotation(&self) -> u32 {
        let degrees = self
            .side_data_list
            .iter()
            .find_map(|side| side.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|tags| tags.rotate.as_deref())
                    .and_then(|r| r.trim().parse::<f64>().ok())
            })
            .unwrap_or(0.0);

        // Snap to the nearest quarter turn
        let quarters = (degrees / 90.0).round() as i64;
        (quarters.rem_euclid(4) * 90) as u32
    }
}

/// Run ffprobe on `path` and read the first video stream's properties
pub async fn probe<P: AsRef<Path>>(path: P) -> Result<VideoMetadata> {
    let path = path.as_ref();

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .await
        .map_err(|_| VideoError::ToolMissing { tool: "ffprobe".to_string() })?;

    if !output.status.success() {
        return Err(VideoError::LoadFailed { path: path.display().to_string() }.into());
    }

    let json = String::from_utf8(output.stdout).map_err(|_| VideoError::ProbeFailed {
        reason: format!("{}: ffprobe output is not UTF-8", path.display()),
    })?;

    let metadata = parse_probe_output(&json)?;
    info!(
        "Video metadata: {}x{} @ {} fps, codec {}, audio: {}",
        metadata.width,
        metadata.height,
        metadata.fps.map(|f| format!("{:.2}", f)).unwrap_or_else(|| "?".to_string()),
        metadata.codec,
        metadata.has_audio
    );
    if metadata.rotation != 0 {
        info!(
            "Stream is rotated {} degrees; frames and rectangle coordinates use the displayed orientation",
            metadata.rotation
        );
    }
    Ok(metadata)
}

/// Parse `ffprobe -print_format json -show_streams` output
pub fn parse_probe_output(json: &str) -> Result<VideoMetadata> {
    let probe: ProbeOutput = serde_json::from_str(json).map_err(|e| VideoError::ProbeFailed {
        reason: format!("invalid ffprobe JSON: {}", e),
    })?;

    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| VideoError::ProbeFailed { reason: "no video stream".to_string() })?;

    let (coded_width, coded_height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(VideoError::ProbeFailed {
                reason: "video stream has no dimensions".to_string(),
            }
            .into())
        }
    };

    let rotation = video.rotation();
    let (width, height) = if rotation % 180 == 90 {
        (coded_height, coded_width)
    } else {
        (coded_width, coded_height)
    };

    let fps = video
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| video.r_frame_rate.as_deref().and_then(parse_frame_rate));

    Ok(VideoMetadata {
        width,
        height,
        fps,
        codec: video.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
        frame_count: video.nb_frames.as_deref().and_then(|n| n.parse().ok()),
        duration: video.duration.as_deref().and_then(|d| d.parse().ok()),
        has_audio,
        rotation,
    })
}

/// Parse an ffprobe rational like `30000/1001`
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

/// Splits a byte stream of packed rgb24 frames into [`Frame`]s
///
/// A clean end of stream at a frame boundary ends the sequence. A trailing
/// partial frame is logged and dropped. Once ended, every later call returns `None`.
pub struct RawFrameReader<R> {
    reader: R,
    width: u32,
    height: u32,
    frames_read: u64,
    finished: bool,
}

impl<R: AsyncRead + Unpin> RawFrameReader<R> {
    pub fn new(reader: R, width: u32, height: u32) -> Self {
        Self {
            reader,
            width,
            height,
            frames_read: 0,
            finished: false,
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<R: AsyncRead + Unpin> FrameSource for RawFrameReader<R> {
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; rgb_frame_len(self.width, self.height)];

        let filled = read_full(&mut self.reader, &mut buf)
            .await
            .map_err(|e| VideoError::FrameReadFailure {
                index: self.frames_read + 1,
                reason: e.to_string(),
            })?;

        if filled == 0 {
            self.finished = true;
            return Ok(None);
        }

        if filled < buf.len() {
            warn!(
                "Frame {} truncated ({} of {} bytes); ending stream",
                self.frames_read + 1,
                filled,
                buf.len()
            );
            self.finished = true;
            return Ok(None);
        }

        self.frames_read += 1;
        let frame = Frame::from_rgb_bytes(self.width, self.height, buf).ok_or_else(|| {
            VideoError::FrameReadFailure {
                index: self.frames_read,
                reason: "buffer size does not match frame dimensions".to_string(),
            }
        })?;
        Ok(Some(frame))
    }
}

/// Decodes a video to raw rgb24 frames through an `ffmpeg` child process
pub struct FfmpegDecoder {
    path: PathBuf,
    metadata: VideoMetadata,
    child: Child,
    frames: RawFrameReader<ChildStdout>,
    exited: bool,
}

impl FfmpegDecoder {
    /// Probe `path` and start decoding it
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(VideoError::LoadFailed { path: path.display().to_string() }.into());
        }

        let metadata = probe(path).await?;
        Self::spawn(path, metadata)
    }

    /// Start decoding `path` with already known metadata
    pub fn spawn<P: AsRef<Path>>(path: P, metadata: VideoMetadata) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut child = Command::new("ffmpeg")
            .args(Self::build_args(&path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VideoError::DecodingFailed {
                reason: format!("failed to spawn ffmpeg: {}", e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| VideoError::DecodingFailed {
            reason: "ffmpeg stdout not captured".to_string(),
        })?;

        debug!("Decoder started for {}", path.display());

        let frames = RawFrameReader::new(stdout, metadata.width, metadata.height);
        Ok(Self {
            path,
            metadata,
            child,
            frames,
            exited: false,
        })
    }

    /// Command-line arguments for the decoder process
    ///
    /// Every decoded frame is emitted exactly once (`-fps_mode passthrough`),
    /// in the displayed orientation.
    pub fn build_args(path: &Path) -> Vec<String> {
        let mut args: Vec<String> = ["-v", "error", "-nostdin", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(path.display().to_string());
        for arg in [
            "-map", "0:v:0",
            "-fps_mode", "passthrough",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-",
        ] {
            args.push(arg.to_string());
        }
        args
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn frames_read(&self) -> u64 {
        self.frames.frames_read()
    }

    async fn wait_for_exit(&mut self) {
        self.exited = true;
        match self.child.wait().await {
            Ok(status) if status.success() => {
                debug!("Decoder finished after {} frames", self.frames_read());
            }
            Ok(status) => {
                warn!(
                    "Decoder for {} exited with {} after {} frames; treating as end of stream",
                    self.path.display(),
                    status,
                    self.frames_read()
                );
            }
            Err(e) => warn!("Could not wait for decoder: {}", e),
        }
    }
}

impl FrameSource for FfmpegDecoder {
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        let frame = self.frames.next_frame().await?;
        if frame.is_none() && !self.exited {
            self.wait_for_exit().await;
        }
        Ok(frame)
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_JSON: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30/1",
                "avg_frame_rate": "30000/1001",
                "duration": "12.345",
                "nb_frames": "370"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "48000"
            }
        ]
    }"#;

    #[test]
    fn test_parse_probe_output() {
        let metadata = parse_probe_output(PROBE_JSON).unwrap();
        assert_eq!((metadata.width, metadata.height), (1920, 1080));
        assert_eq!(metadata.codec, "h264");
        assert_eq!(metadata.frame_count, Some(370));
        assert!(metadata.has_audio);
        assert!((metadata.fps.unwrap() - 29.97).abs() < 0.01);
        assert!((metadata.duration.unwrap() - 12.345).abs() < 1e-9);
    }

    #[test]
    fn test_probe_without_video_stream() {
        let json = r#"{"streams": [{"codec_type": "audio", "codec_name": "mp3"}]}"#;
        assert!(parse_probe_output(json).is_err());
        assert!(parse_probe_output("not json").is_err());
    }

    #[test]
    fn test_frame_rate_falls_back_to_r_frame_rate() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 64, "height": 48,
            "avg_frame_rate": "0/0", "r_frame_rate": "25/1"}]}"#;
        let metadata = parse_probe_output(json).unwrap();
        assert_eq!(metadata.fps, Some(25.0));
        assert!(!metadata.has_audio);
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let json = r#"{"streams": [{"codec_type": "video", "codec_name": "hevc",
            "width": 1920, "height": 1080, "avg_frame_rate": "30/1",
            "side_data_list": [{"side_data_type": "Display Matrix",
                "displaymatrix": "\n00000000:            0       65536           0\n",
                "rotation": -90}]}]}"#;
        let metadata = parse_probe_output(json).unwrap();
        assert_eq!(metadata.rotation, 270);
        assert_eq!((metadata.width, metadata.height), (1080, 1920));
    }

    #[test]
    fn test_rotate_tag_and_half_turn() {
        let tagged = r#"{"streams": [{"codec_type": "video", "width": 640, "height": 480,
            "tags": {"rotate": "90"}}]}"#;
        let metadata = parse_probe_output(tagged).unwrap();
        assert_eq!(metadata.rotation, 90);
        assert_eq!((metadata.width, metadata.height), (480, 640));

        let flipped = r#"{"streams": [{"codec_type": "video", "width": 640, "height": 480,
            "side_data_list": [{"side_data_type": "Display Matrix", "rotation": 180}]}]}"#;
        let metadata = parse_probe_output(flipped).unwrap();
        assert_eq!(metadata.rotation, 180);
        assert_eq!((metadata.width, metadata.height), (640, 480));

        let plain = parse_probe_output(PROBE_JSON).unwrap();
        assert_eq!(plain.rotation, 0);
    }

    #[test]
    fn test_decoder_args_keep_every_frame() {
        let args = FfmpegDecoder::build_args(Path::new("clip.mp4"));
        let joined = args.join(" ");

        assert!(joined.contains("-i clip.mp4 -map 0:v:0 -fps_mode passthrough"));
        assert!(joined.ends_with("-f rawvideo -pix_fmt rgb24 -"));
        assert!(!joined.contains("-noautorotate"));
    }

    /// Two 2x2 frames: the first all 10s, the second all 20s
    fn two_frames() -> Vec<u8> {
        let mut bytes = vec![10u8; 12];
        bytes.extend(vec![20u8; 12]);
        bytes
    }

    #[tokio::test]
    async fn test_raw_frames_end_cleanly_at_boundary() {
        let bytes = two_frames();
        let mut frames = RawFrameReader::new(&bytes[..], 2, 2);

        let first = frames.next_frame().await.unwrap().unwrap();
        assert_eq!(first.get_pixel(1, 1), [10, 10, 10]);
        let second = frames.next_frame().await.unwrap().unwrap();
        assert_eq!(second.get_pixel(0, 0), [20, 20, 20]);

        assert!(frames.next_frame().await.unwrap().is_none());
        assert!(frames.is_finished());
        assert_eq!(frames.frames_read(), 2);
    }

    #[tokio::test]
    async fn test_truncated_trailing_frame_ends_stream() {
        let bytes = two_frames();
        // One and a half frames
        let mut frames = RawFrameReader::new(&bytes[..18], 2, 2);

        assert!(frames.next_frame().await.unwrap().is_some());
        assert!(frames.next_frame().await.unwrap().is_none());
        assert!(frames.next_frame().await.unwrap().is_none());
        assert_eq!(frames.frames_read(), 1);
    }

    #[tokio::test]
    async fn test_empty_stream_has_no_frames() {
        let mut frames = RawFrameReader::new(&[0u8; 0][..], 4, 4);
        assert!(frames.next_frame().await.unwrap().is_none());
        assert_eq!(frames.frames_read(), 0);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("30"), None);
    }

    #[tokio::test]
    async fn test_read_full_reports_short_read() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = &data[..];
        let mut buf = [0u8; 3];
        assert_eq!(read_full(&mut reader, &mut buf).await.unwrap(), 3);
        assert_eq!(read_full(&mut reader, &mut buf).await.unwrap(), 2);
        assert_eq!(read_full(&mut reader, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let result = FfmpegDecoder::open("definitely/not/here.mp4").await;
        assert!(matches!(
            result,
            Err(crate::error::PixelMenderError::Video(VideoError::LoadFailed { .. }))
        ));
    }
}
