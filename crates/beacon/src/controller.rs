//! Beacon controller task

use crate::config::BeaconConfig;
use crate::link::BeaconLink;
use crate::protocol::Command;
use crate::BeaconError;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Handle to the beacon task.
///
/// [`Beacon::ping`] never blocks; pings arriving faster than the task drains
/// them are coalesced.
pub struct Beacon {
    signal_tx: mpsc::Sender<()>,
    shutdown_tx: oneshot::Sender<()>,
    state_rx: watch::Receiver<bool>,
    handle: JoinHandle<()>,
    join_timeout: Duration,
}

impl Beacon {
    /// Start the beacon task on the current runtime
    pub fn spawn(config: &BeaconConfig) -> Result<Self, BeaconError> {
        config.validate()?;
        info!(
            addr = %config.address(),
            cooldown_secs = config.cooldown_secs,
            "Starting beacon controller"
        );

        let link = BeaconLink::new(config.address(), config.connect_timeout());
        let (signal_tx, signal_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(false);

        let handle = tokio::spawn(run(link, config.cooldown(), signal_rx, shutdown_rx, state_tx));

        Ok(Self {
            signal_tx,
            shutdown_tx,
            state_rx,
            handle,
            join_timeout: config.connect_timeout() + Duration::from_secs(1),
        })
    }

    /// Signal that risk is present on this frame
    pub fn ping(&self) {
        // Full means a signal is already pending; closed means shutting down
        let _ = self.signal_tx.try_send(());
    }

    /// Whether the beacon is currently lit
    pub fn is_on(&self) -> bool {
        *self.state_rx.borrow()
    }

    /// Watch beacon on/off transitions
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state_rx.clone()
    }

    /// Stop the task, switching the beacon off if it is lit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        match timeout(self.join_timeout, self.handle).await {
            Ok(Ok(())) => info!("Beacon controller stopped"),
            Ok(Err(e)) => error!(error = %e, "Beacon task failed"),
            Err(_) => error!("Beacon controller did not stop in time"),
        }
    }
}

async fn run(
    mut link: BeaconLink,
    cooldown: Duration,
    mut signal_rx: mpsc::Receiver<()>,
    mut shutdown_rx: oneshot::Receiver<()>,
    state_tx: watch::Sender<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            received = timeout(cooldown, signal_rx.recv()) => match received {
                Ok(Some(())) => {
                    while signal_rx.try_recv().is_ok() {}
                    if !*state_tx.borrow() {
                        switch(&mut link, Command::Activate, &state_tx).await;
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    if *state_tx.borrow() {
                        debug!("Cooldown elapsed without risk");
                        switch(&mut link, Command::Deactivate, &state_tx).await;
                    }
                }
            },
        }
    }

    if *state_tx.borrow() {
        switch(&mut link, Command::Deactivate, &state_tx).await;
    }
    link.close().await;
}

/// Send `command` and publish the new state if it went through.
/// On failure the state is left unchanged so the next cycle retries.
async fn switch(link: &mut BeaconLink, command: Command, state_tx: &watch::Sender<bool>) {
    match link.send(command).await {
        Ok(()) => {
            let on = command == Command::Activate;
            state_tx.send_replace(on);
            info!(on, "Beacon switched");
        }
        Err(e) => warn!(?command, error = %e, "Beacon command failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::time::{sleep, Instant};

    const ON: [u8; 3] = [254, 100, 1];
    const OFF: [u8; 3] = [254, 101, 1];

    /// Relay stand-in that records everything it receives
    async fn relay() -> (u16, Arc<Mutex<Vec<u8>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();

        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let sink = sink.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 64];
                    while let Ok(n) = sock.read(&mut buf).await {
                        if n == 0 {
                            break;
                        }
                        sink.lock().unwrap().extend_from_slice(&buf[..n]);
                    }
                });
            }
        });

        (port, received)
    }

    fn config(port: u16, cooldown_secs: f64) -> BeaconConfig {
        BeaconConfig {
            port,
            cooldown_secs,
            connect_timeout_secs: 1.0,
            ..Default::default()
        }
    }

    async fn wait_for_bytes(received: &Arc<Mutex<Vec<u8>>>, len: usize) -> Vec<u8> {
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            let bytes = received.lock().unwrap().clone();
            if bytes.len() >= len || Instant::now() > deadline {
                return bytes;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ping_activates_then_cooldown_deactivates() {
        let (port, received) = relay().await;
        let beacon = Beacon::spawn(&config(port, 0.3)).unwrap();
        let mut state = beacon.subscribe();

        beacon.ping();
        state.changed().await.unwrap();
        assert!(*state.borrow());

        state.changed().await.unwrap();
        assert!(!*state.borrow());

        let bytes = wait_for_bytes(&received, 6).await;
        assert_eq!(bytes, [ON, OFF].concat());
        beacon.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_repeated_pings_send_one_activation() {
        let (port, received) = relay().await;
        let beacon = Beacon::spawn(&config(port, 0.5)).unwrap();

        for _ in 0..10 {
            beacon.ping();
            sleep(Duration::from_millis(20)).await;
        }
        assert!(beacon.is_on());

        beacon.shutdown().await;
        let bytes = wait_for_bytes(&received, 6).await;
        assert_eq!(bytes, [ON, OFF].concat());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_switches_off() {
        let (port, received) = relay().await;
        let beacon = Beacon::spawn(&config(port, 60.0)).unwrap();
        let mut state = beacon.subscribe();

        beacon.ping();
        state.changed().await.unwrap();

        beacon.shutdown().await;
        let bytes = wait_for_bytes(&received, 6).await;
        assert_eq!(&bytes[3..], &OFF);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unreachable_relay_stays_off() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let beacon = Beacon::spawn(&config(port, 0.2)).unwrap();
        beacon.ping();
        sleep(Duration::from_millis(300)).await;
        assert!(!beacon.is_on());
        beacon.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let cfg = BeaconConfig {
            cooldown_secs: -1.0,
            ..Default::default()
        };
        assert!(Beacon::spawn(&cfg).is_err());
    }
}
