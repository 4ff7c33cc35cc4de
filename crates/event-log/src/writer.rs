//! Event log writer task

use crate::EventLogError;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Grace period for draining the queue on shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// One scene's state at the moment it was logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub scene_name: String,
    pub timestamp: DateTime<Local>,
    pub scene_active: bool,
    pub risk_active: bool,

    /// Clip started on this frame, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_file: Option<String>,
}

/// Handle to the event log writer
pub struct EventLog {
    tx: mpsc::Sender<RiskEvent>,
    handle: JoinHandle<u64>,
    dir: PathBuf,
    dropped: AtomicU64,
}

impl EventLog {
    /// Open today's file in `dir` (created if missing) and start the writer.
    /// At most `capacity` events wait for the disk; newer ones are dropped.
    pub async fn start(dir: impl Into<PathBuf>, capacity: usize) -> Result<Self, EventLogError> {
        if capacity == 0 {
            return Err(EventLogError::Config("event queue capacity must be at least 1".into()));
        }
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let today = Local::now().date_naive();
        let file = open(&Self::path_for(&dir, today)).await?;
        info!(path = %Self::path_for(&dir, today).display(), "Event log started");

        let (tx, rx) = mpsc::channel(capacity);
        let sink = DailyFile {
            dir: dir.clone(),
            date: today,
            out: BufWriter::new(file),
        };
        let handle = tokio::spawn(run(sink, rx));

        Ok(Self {
            tx,
            handle,
            dir,
            dropped: AtomicU64::new(0),
        })
    }

    /// File holding the events of `date`
    pub fn path_for(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(format!("risk_events_{}.jsonl", date.format("%Y-%m-%d")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queue an event. Never blocks; the event is dropped if the queue is full.
    pub fn log(&self, event: RiskEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(scene = %event.scene_name, dropped, "Event queue full, event dropped");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!("Event log writer is gone, event dropped");
            }
        }
    }

    /// Events dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Write out everything queued and stop the writer
    pub async fn shutdown(self) {
        let dropped = self.dropped();
        drop(self.tx);
        match timeout(SHUTDOWN_TIMEOUT, self.handle).await {
            Ok(Ok(written)) => info!(written, dropped, "Event log stopped"),
            Ok(Err(e)) => error!(error = %e, "Event log task failed"),
            Err(_) => error!("Event log did not stop in time"),
        }
    }
}

async fn open(path: &Path) -> Result<File, EventLogError> {
    Ok(OpenOptions::new().create(true).append(true).open(path).await?)
}

/// Current day's file, rotated when an event falls on another date
struct DailyFile {
    dir: PathBuf,
    date: NaiveDate,
    out: BufWriter<File>,
}

impl DailyFile {
    async fn write(&mut self, event: &RiskEvent) -> Result<(), EventLogError> {
        let date = event.timestamp.date_naive();
        if date != self.date {
            self.out.flush().await?;
            let path = EventLog::path_for(&self.dir, date);
            self.out = BufWriter::new(open(&path).await?);
            self.date = date;
            info!(path = %path.display(), "Event log rotated");
        }

        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.out.write_all(&line).await?;
        Ok(())
    }
}

async fn run(mut sink: DailyFile, mut rx: mpsc::Receiver<RiskEvent>) -> u64 {
    let mut written = 0u64;

    while let Some(event) = rx.recv().await {
        let mut batch = vec![event];
        while let Ok(event) = rx.try_recv() {
            batch.push(event);
        }

        for event in &batch {
            match sink.write(event).await {
                Ok(()) => written += 1,
                Err(e) => error!(scene = %event.scene_name, error = %e, "Event write failed"),
            }
        }
        if let Err(e) = sink.out.flush().await {
            error!(error = %e, "Event log flush failed");
        }
        debug!(batch = batch.len(), "Events written");
    }

    if let Err(e) = sink.out.flush().await {
        error!(error = %e, "Event log flush failed");
    }
    written
}
