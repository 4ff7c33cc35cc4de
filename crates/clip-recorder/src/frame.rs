//! Video frame type shared between the capture loop and the recorder

use std::sync::Arc;

/// Frames are shared, never copied, between the pre-roll buffer and the recorder
pub type SharedFrame = Arc<VideoFrame>;

/// Decoded RGB video frame
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u64) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Black frame of the given size
    pub fn blank(width: u32, height: u32, timestamp_ns: u64, sequence: u64) -> Self {
        Self::new(
            vec![0; Self::rgb_len(width, height)],
            width,
            height,
            timestamp_ns,
            sequence,
        )
    }

    /// Byte length of an RGB24 buffer for the given size
    pub fn rgb_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    /// Whether `data` matches the declared dimensions
    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == Self::rgb_len(self.width, self.height)
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.data.get(idx..idx + 3)?;
        Some([px[0], px[1], px[2]])
    }

    pub fn into_shared(self) -> SharedFrame {
        Arc::new(self)
    }
}
