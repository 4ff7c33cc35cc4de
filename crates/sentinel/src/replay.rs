//! Recorded detection source
//!
//! Reads one `DetectionFrame` JSON object per line and pairs each with a
//! blank video frame of the same size for the clip path.

use clip_recorder::{SharedFrame, VideoFrame};
use risk_engine::DetectionFrame;
use std::path::Path;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

pub struct DetectionReplay<R> {
    lines: Lines<R>,
    line_no: u64,
    sequence: u64,
    started: Instant,
}

impl DetectionReplay<BufReader<File>> {
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .await
            .map_err(|e| anyhow::anyhow!("cannot open {}: {e}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin> DetectionReplay<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            sequence: 0,
            started: Instant::now(),
        }
    }

    /// Next record, skipping blank and malformed lines. `None` at end of input.
    pub async fn next_frame(&mut self) -> anyhow::Result<Option<(SharedFrame, DetectionFrame)>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let detections: DetectionFrame = match serde_json::from_str(line) {
                Ok(d) => d,
                Err(e) => {
                    warn!(line = self.line_no, error = %e, "Skipping malformed detection record");
                    continue;
                }
            };

            let video = VideoFrame::blank(
                detections.width.max(1),
                detections.height.max(1),
                self.started.elapsed().as_nanos() as u64,
                self.sequence,
            );
            self.sequence += 1;
            return Ok(Some((video.into_shared(), detections)));
        }
        Ok(None)
    }
}
