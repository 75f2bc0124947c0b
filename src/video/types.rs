use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single decoded video frame
///
/// Thin wrapper around an RGB image buffer. Pixels are addressed by column
/// `x` and row `y`, each holding three `u8` channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Copy one pixel onto another within the same frame
    pub fn copy_pixel(&mut self, from: (u32, u32), to: (u32, u32)) {
        let value = *self.buffer.get_pixel(from.0, from.1);
        self.buffer.put_pixel(to.0, to.1, value);
    }

    /// Raw interleaved RGB bytes, row-major
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Create a frame from raw RGB bytes
    ///
    /// Returns `None` if `data` is not exactly `width * height * 3` bytes.
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Load a still image from disk as a frame
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        Ok(Self::new(image::open(path)?.to_rgb8()))
    }

    /// Save the frame; the format follows the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// Output video parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    /// Frame rate for output
    pub fps: f64,

    /// Output resolution (width, height)
    pub resolution: (u32, u32),

    /// FFmpeg `-q:v` value for the MPEG-4 encoder (1 = best, 31 = worst)
    pub quality: u8,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 30.0,
            resolution: (1920, 1080),
            quality: 4,
        }
    }
}

/// Number of bytes in one raw rgb24 frame
pub fn rgb_frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_bytes_checks_length() {
        assert!(Frame::from_rgb_bytes(2, 2, vec![0; 12]).is_some());
        assert!(Frame::from_rgb_bytes(2, 2, vec![0; 11]).is_none());
    }

    #[test]
    fn test_copy_pixel() {
        let mut frame = Frame::new_filled(3, 3, [0, 0, 0]);
        frame.set_pixel(0, 0, [10, 20, 30]);
        frame.copy_pixel((0, 0), (2, 1));
        assert_eq!(frame.get_pixel(2, 1), [10, 20, 30]);
        assert_eq!(frame.get_pixel(1, 1), [0, 0, 0]);
    }

    #[test]
    fn test_rgb_bytes_are_row_major() {
        let mut frame = Frame::new_filled(2, 2, [0, 0, 0]);
        frame.set_pixel(1, 0, [7, 8, 9]);
        assert_eq!(&frame.as_rgb_bytes()[3..6], &[7, 8, 9]);
        assert_eq!(rgb_frame_len(2, 2), frame.as_rgb_bytes().len());
    }
}
