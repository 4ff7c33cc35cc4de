//! TCP link to the relay module
//!
//! Connects lazily on the first command. A failed write drops the stream,
//! reconnects once and resends.

use crate::protocol::Command;
use crate::BeaconError;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub struct BeaconLink {
    addr: String,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl BeaconLink {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
            stream: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Send one command, connecting first if needed
    pub async fn send(&mut self, command: Command) -> Result<(), BeaconError> {
        let bytes = command.bytes();

        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };

        match self.write(&mut stream, bytes).await {
            Ok(()) => {
                self.stream = Some(stream);
                debug!(?command, "Beacon command sent");
                return Ok(());
            }
            Err(e) => warn!(?command, error = %e, "Beacon write failed, reconnecting"),
        }
        drop(stream);

        let mut stream = self.connect().await?;
        self.write(&mut stream, bytes).await?;
        self.stream = Some(stream);
        debug!(?command, "Beacon command sent after reconnect");
        Ok(())
    }

    /// Drop the connection
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            debug!(addr = %self.addr, "Beacon link closed");
        }
    }

    async fn connect(&self) -> Result<TcpStream, BeaconError> {
        let stream = timeout(self.timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| BeaconError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(|e| BeaconError::Connect {
                addr: self.addr.clone(),
                reason: e.to_string(),
            })?;
        stream.set_nodelay(true)?;
        info!(addr = %self.addr, "Connected to beacon relay");
        Ok(stream)
    }

    async fn write(&self, stream: &mut TcpStream, bytes: &[u8]) -> Result<(), BeaconError> {
        timeout(self.timeout, async {
            stream.write_all(bytes).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| BeaconError::Timeout(self.timeout.as_millis() as u64))??;
        Ok(())
    }
}
