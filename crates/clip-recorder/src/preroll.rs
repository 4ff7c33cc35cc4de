//! Bounded history of recent frames

use crate::frame::SharedFrame;
use std::collections::VecDeque;

/// Keeps the most recent `capacity` frames so a clip can start a few
/// seconds before the event that triggered it.
#[derive(Debug, Clone)]
pub struct PrerollBuffer {
    frames: VecDeque<SharedFrame>,
    capacity: usize,
}

impl PrerollBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Capacity for `secs` of video at `fps`, at least one frame
    pub fn for_duration(fps: f64, secs: f64) -> Self {
        let frames = (fps * secs).round();
        let capacity = if frames.is_finite() && frames >= 1.0 {
            frames as usize
        } else {
            1
        };
        Self::new(capacity)
    }

    /// Append a frame, evicting the oldest when full
    pub fn push(&mut self, frame: SharedFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Oldest-first copy of the buffered frames
    pub fn snapshot(&self) -> Vec<SharedFrame> {
        self.frames.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
