//! Per-scene clip recording off the frame path
//!
//! The capture loop hands frames and commands to a dedicated writer thread;
//! encoding and disk I/O never stall detection. Every scene has at most one
//! open clip and each frame is written to every open clip.
//!
//! Commands and frames travel on separate queues but share one ticket
//! sequence, so the worker applies them in the order they were issued.

use crate::config::ClipConfig;
use crate::frame::SharedFrame;
use crate::sink::{ClipSink, SinkFactory};
use crate::video::VideoSinkFactory;
use crate::ClipError;
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Idle wait between polls of the worker queues
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Commands for the recording worker
#[derive(Debug)]
pub enum ClipCommand {
    /// Open a clip for `scene` seeded with the pre-roll frames
    Start {
        scene: String,
        preroll: Vec<SharedFrame>,
        file_name: String,
    },
    /// Close the clip for `scene`
    Stop { scene: String },
    /// Close every open clip
    StopAll,
}

/// Position of a command or frame in issue order
type Ticket = u64;

/// Handle to the recording worker
pub struct ClipRecorder {
    commands: mpsc::UnboundedSender<(Ticket, ClipCommand)>,
    frames: mpsc::Sender<(Ticket, SharedFrame)>,
    next_ticket: AtomicU64,
    done: oneshot::Receiver<()>,
    handle: JoinHandle<()>,
    shutdown_timeout: Duration,
}

impl ClipRecorder {
    /// Start a worker writing video files into `config.output_dir`
    pub fn spawn(config: &ClipConfig) -> Result<Self, ClipError> {
        let factory = VideoSinkFactory {
            fourcc: config.fourcc()?,
        };
        Self::with_factory(config, Arc::new(factory))
    }

    /// Start a worker with a custom sink factory
    pub fn with_factory(config: &ClipConfig, factory: Arc<dyn SinkFactory>) -> Result<Self, ClipError> {
        config.validate()?;
        std::fs::create_dir_all(&config.output_dir)?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (frames, frame_rx) = mpsc::channel(config.frame_queue);
        let (done_tx, done) = oneshot::channel();
        let worker = Worker {
            output_dir: config.output_dir.clone(),
            preroll_secs: config.preroll_secs,
            factory,
            sinks: BTreeMap::new(),
            pending: VecDeque::new(),
        };
        let handle = std::thread::Builder::new()
            .name("clip-recorder".into())
            .spawn(move || {
                worker.run(command_rx, frame_rx);
                let _ = done_tx.send(());
            })?;

        info!(output_dir = %config.output_dir.display(), "Clip recorder started");
        Ok(Self {
            commands,
            frames,
            next_ticket: AtomicU64::new(0),
            done,
            handle,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn start(&self, scene: &str, preroll: Vec<SharedFrame>, file_name: String) {
        self.send(ClipCommand::Start {
            scene: scene.to_string(),
            preroll,
            file_name,
        });
    }

    pub fn stop(&self, scene: &str) {
        self.send(ClipCommand::Stop {
            scene: scene.to_string(),
        });
    }

    pub fn stop_all(&self) {
        self.send(ClipCommand::StopAll);
    }

    /// Queue a frame for every open clip. Returns false if the queue was full
    /// and the frame was dropped.
    pub fn push_frame(&self, frame: SharedFrame) -> bool {
        match self.frames.try_send((self.ticket(), frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Clip frame queue full, dropping frame");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Frames queued but not yet taken by the worker
    pub fn pending_frames(&self) -> usize {
        self.frames.max_capacity() - self.frames.capacity()
    }

    /// Write out queued frames, close all clips and wait for the worker.
    ///
    /// A worker still busy after the shutdown timeout is left running
    /// detached; shutdown returns regardless.
    pub async fn shutdown(self) {
        let Self {
            commands,
            frames,
            done,
            handle,
            shutdown_timeout,
            ..
        } = self;
        drop(commands);
        drop(frames);

        match tokio::time::timeout(shutdown_timeout, done).await {
            Ok(Ok(())) => {
                if handle.join().is_err() {
                    error!("Clip worker panicked while exiting");
                } else {
                    info!("Clip recorder stopped");
                }
            }
            // Sender dropped without signalling: the worker panicked
            Ok(Err(_)) => {
                let _ = handle.join();
                error!("Clip worker failed");
            }
            Err(_) => error!(
                timeout_secs = shutdown_timeout.as_secs_f64(),
                "Clip worker did not stop in time, leaving it behind"
            ),
        }
    }

    fn ticket(&self) -> Ticket {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    fn send(&self, command: ClipCommand) {
        if self.commands.send((self.ticket(), command)).is_err() {
            warn!("Clip worker is gone, command dropped");
        }
    }
}

struct Worker {
    output_dir: PathBuf,
    preroll_secs: f64,
    factory: Arc<dyn SinkFactory>,
    sinks: BTreeMap<String, Box<dyn ClipSink>>,
    /// Commands received but issued after the frame being written
    pending: VecDeque<(Ticket, ClipCommand)>,
}

impl Worker {
    fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<(Ticket, ClipCommand)>,
        mut frames: mpsc::Receiver<(Ticket, SharedFrame)>,
    ) {
        loop {
            let mut connected = self.collect(&mut commands);

            let mut idle = true;
            while let Ok((ticket, frame)) = frames.try_recv() {
                idle = false;
                // Anything issued before this frame is already queued
                connected &= self.collect(&mut commands);
                self.apply_until(ticket);
                self.write(&frame);
            }
            // Every frame issued before the remaining commands has been taken
            self.apply_until(Ticket::MAX);

            if !connected {
                self.close_all();
                debug!("Clip worker exiting");
                return;
            }
            if idle {
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }

    /// Move queued commands into `pending`; false once the handle is gone
    fn collect(&mut self, commands: &mut mpsc::UnboundedReceiver<(Ticket, ClipCommand)>) -> bool {
        loop {
            match commands.try_recv() {
                Ok(command) => self.pending.push_back(command),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Apply pending commands issued before `ticket`
    fn apply_until(&mut self, ticket: Ticket) {
        while self.pending.front().is_some_and(|(t, _)| *t < ticket) {
            if let Some((_, command)) = self.pending.pop_front() {
                self.handle(command);
            }
        }
    }

    /// Write one frame to every open clip; clips that fail are closed
    fn write(&mut self, frame: &SharedFrame) {
        let mut failed = Vec::new();
        for (scene, sink) in self.sinks.iter_mut() {
            if let Err(e) = sink.write_frame(frame) {
                error!(scene = %scene, error = %e, "Clip write failed, closing clip");
                failed.push(scene.clone());
            }
        }
        for scene in failed {
            self.close(&scene);
        }
    }

    fn handle(&mut self, command: ClipCommand) {
        match command {
            ClipCommand::Start {
                scene,
                preroll,
                file_name,
            } => self.open(scene, preroll, file_name),
            ClipCommand::Stop { scene } => {
                if !self.close(&scene) {
                    warn!(scene = %scene, "Stop for a scene without an open clip");
                }
            }
            ClipCommand::StopAll => self.close_all(),
        }
    }

    fn open(&mut self, scene: String, preroll: Vec<SharedFrame>, file_name: String) {
        if self.sinks.contains_key(&scene) {
            warn!(scene = %scene, "Clip already open for scene");
            return;
        }
        let Some(first) = preroll.first() else {
            error!(scene = %scene, "Cannot start clip without pre-roll frames");
            return;
        };

        let fps = preroll.len() as f64 / self.preroll_secs.max(1.0);
        let path = self.output_dir.join(&file_name);
        let mut sink = match self.factory.create(&path, first.width, first.height, fps) {
            Ok(sink) => sink,
            Err(e) => {
                error!(scene = %scene, path = %path.display(), error = %e, "Cannot open clip");
                return;
            }
        };

        for frame in &preroll {
            if let Err(e) = sink.write_frame(frame) {
                error!(scene = %scene, error = %e, "Pre-roll write failed, abandoning clip");
                if let Err(e) = sink.finish() {
                    error!(scene = %scene, error = %e, "Clip finalize failed");
                }
                return;
            }
        }

        info!(scene = %scene, path = %path.display(), fps, preroll = preroll.len(), "Clip started");
        self.sinks.insert(scene, sink);
    }

    /// Finalize and remove the clip for `scene`; false if none was open
    fn close(&mut self, scene: &str) -> bool {
        let Some(sink) = self.sinks.remove(scene) else {
            return false;
        };
        match sink.finish() {
            Ok(()) => info!(scene = %scene, "Clip closed"),
            Err(e) => error!(scene = %scene, error = %e, "Clip finalize failed"),
        }
        true
    }

    fn close_all(&mut self) {
        let scenes: Vec<String> = self.sinks.keys().cloned().collect();
        for scene in scenes {
            self.close(&scene);
        }
    }
}
