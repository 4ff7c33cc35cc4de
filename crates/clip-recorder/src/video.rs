//! Clip files encoded with OpenCV's video writer

use crate::frame::VideoFrame;
use crate::sink::{ClipSink, SinkFactory};
use crate::ClipError;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    videoio::VideoWriter,
};
use std::path::Path;
use tracing::debug;

/// Opens one video file per clip
#[derive(Debug, Clone, Copy)]
pub struct VideoSinkFactory {
    pub fourcc: [char; 4],
}

impl SinkFactory for VideoSinkFactory {
    fn create(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: f64,
    ) -> Result<Box<dyn ClipSink>, ClipError> {
        let [c1, c2, c3, c4] = self.fourcc;
        let fourcc = VideoWriter::fourcc(c1, c2, c3, c4)?;
        let filename = path
            .to_str()
            .ok_or_else(|| ClipError::Io(format!("clip path is not UTF-8: {}", path.display())))?;
        let size = core::Size::new(dimension(width)?, dimension(height)?);

        let writer = VideoWriter::new(filename, fourcc, fps, size, true)?;
        if !writer.is_opened()? {
            return Err(ClipError::Io(format!("cannot open video writer for {}", path.display())));
        }

        Ok(Box::new(VideoFileSink {
            writer,
            width,
            height,
            bgr: Mat::default(),
            frames: 0,
        }))
    }
}

fn dimension(value: u32) -> Result<i32, ClipError> {
    i32::try_from(value).map_err(|_| ClipError::Encode(format!("frame dimension {value} too large")))
}

/// An open video file
pub struct VideoFileSink {
    writer: VideoWriter,
    width: u32,
    height: u32,
    /// Reused colour-conversion buffer
    bgr: Mat,
    frames: u64,
}

impl ClipSink for VideoFileSink {
    fn write_frame(&mut self, frame: &VideoFrame) -> Result<(), ClipError> {
        if (frame.width, frame.height) != (self.width, self.height) {
            return Err(ClipError::FrameSize {
                expected: (self.width, self.height),
                actual: (frame.width, frame.height),
            });
        }
        if !frame.is_well_formed() {
            return Err(ClipError::Encode(format!(
                "frame {} holds {} bytes, expected {}",
                frame.sequence,
                frame.data.len(),
                VideoFrame::rgb_len(frame.width, frame.height)
            )));
        }

        let flat = Mat::from_slice(&frame.data)?;
        let rgb = flat.reshape(3, dimension(self.height)?)?;
        imgproc::cvt_color(&rgb, &mut self.bgr, imgproc::COLOR_RGB2BGR, 0)?;
        self.writer.write(&self.bgr)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<(), ClipError> {
        self.writer.release()?;
        debug!(frames = self.frames, "Video clip finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> VideoSinkFactory {
        VideoSinkFactory {
            fourcc: ['m', 'p', '4', 'v'],
        }
    }

    fn gradient(seq: u64) -> VideoFrame {
        let data = (0..VideoFrame::rgb_len(64, 48)).map(|i| (i % 251) as u8).collect();
        VideoFrame::new(data, 64, 48, seq, seq)
    }

    #[test]
    fn test_writes_video_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");

        let mut sink = factory().create(&path, 64, 48, 10.0).unwrap();
        for seq in 0..5 {
            sink.write_frame(&gradient(seq)).unwrap();
        }
        sink.finish().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert!(len > 0);
    }

    #[test]
    fn test_rejects_mismatched_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = factory().create(&dir.path().join("clip.mp4"), 64, 48, 10.0).unwrap();

        let err = sink.write_frame(&VideoFrame::blank(32, 24, 0, 0)).unwrap_err();
        assert!(matches!(err, ClipError::FrameSize { expected: (64, 48), actual: (32, 24) }));

        let short = VideoFrame::new(vec![0; 10], 64, 48, 0, 1);
        assert!(matches!(sink.write_frame(&short), Err(ClipError::Encode(_))));
        sink.finish().unwrap();
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("clip.mp4");
        assert!(factory().create(&path, 64, 48, 10.0).is_err());
    }
}
