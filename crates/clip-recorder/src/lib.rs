//! Evidence clip recording
//!
//! Keeps a pre-roll of recent frames and writes one clip per active risk
//! scene on a background worker:
//! - Pre-roll ring of shared frames
//! - Bounded frame queue that drops rather than blocks
//! - Pluggable sinks, OpenCV video files by default

pub mod config;
pub mod frame;
pub mod preroll;
pub mod recorder;
pub mod sink;
pub mod video;

pub use config::ClipConfig;
pub use frame::{SharedFrame, VideoFrame};
pub use preroll::PrerollBuffer;
pub use recorder::{ClipCommand, ClipRecorder};
pub use sink::{ClipSink, SinkFactory};
pub use video::{VideoFileSink, VideoSinkFactory};

use thiserror::Error;

/// Clip recorder error types
#[derive(Error, Debug)]
pub enum ClipError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Frame size {actual:?} does not match clip size {expected:?}")]
    FrameSize { expected: (u32, u32), actual: (u32, u32) },

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<opencv::Error> for ClipError {
    fn from(err: opencv::Error) -> Self {
        ClipError::Encode(err.to_string())
    }
}

impl From<std::io::Error> for ClipError {
    fn from(err: std::io::Error) -> Self {
        ClipError::Io(err.to_string())
    }
}
