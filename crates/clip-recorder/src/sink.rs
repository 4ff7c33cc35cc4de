//! Clip output abstraction

use crate::frame::VideoFrame;
use crate::ClipError;
use std::path::Path;

/// Destination for one clip's frames
pub trait ClipSink: Send {
    fn write_frame(&mut self, frame: &VideoFrame) -> Result<(), ClipError>;

    /// Finalize the clip. The sink is unusable afterwards.
    fn finish(self: Box<Self>) -> Result<(), ClipError>;
}

/// Opens a sink for a new clip
pub trait SinkFactory: Send + Sync {
    fn create(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: f64,
    ) -> Result<Box<dyn ClipSink>, ClipError>;
}
