//! Live-reload loop: keeps a socket to the server's reload endpoint and
//! reports when the client should reload.
//!
//! Each call to [`run_until_reload`] owns a fresh [`ReloadState`]; after a
//! reload the caller starts over, so the first connection of the new client
//! never triggers another reload.

use std::collections::VecDeque;
use std::time::Duration;

use client_logging::{client_debug, client_info, client_warn};
use pffweb_core::{update_reload, ReloadEffect, ReloadMsg, ReloadState};
use pffweb_engine::{ReloadConnection, ReloadSignal, ReloadTransport};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reload,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSettings {
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
}

enum Wake {
    Shutdown,
    Signal(Option<ReloadSignal>),
    ReconnectDue,
}

pub async fn run_until_reload(
    transport: &dyn ReloadTransport,
    endpoint: &Url,
    settings: ReloadSettings,
    shutdown: &CancellationToken,
) -> ReloadOutcome {
    let mut state = ReloadState::with_reconnect_delay(settings.reconnect_delay);
    let mut connection: Option<Box<dyn ReloadConnection>> = None;
    let mut reconnect_at: Option<Instant> = None;
    let mut inbox = VecDeque::from([ReloadMsg::Started]);

    loop {
        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update_reload(state, msg);
            state = next;
            for effect in effects {
                match effect {
                    ReloadEffect::Connect => {
                        client_debug!("Connecting to {}", endpoint);
                        let attempt = tokio::select! {
                            _ = shutdown.cancelled() => return ReloadOutcome::Shutdown,
                            attempt = tokio::time::timeout(
                                settings.connect_timeout,
                                transport.connect(endpoint),
                            ) => attempt,
                        };
                        match attempt {
                            Ok(Ok(opened)) => {
                                connection = Some(opened);
                                inbox.push_back(ReloadMsg::SocketOpened);
                            }
                            Ok(Err(err)) => {
                                client_debug!("{}", err);
                                inbox.push_back(ReloadMsg::SocketClosed);
                            }
                            Err(_) => {
                                client_warn!("Timed out connecting to {}", endpoint);
                                inbox.push_back(ReloadMsg::SocketClosed);
                            }
                        }
                    }
                    ReloadEffect::ScheduleReconnect { delay } => {
                        reconnect_at = Some(Instant::now() + delay);
                    }
                    ReloadEffect::CloseSocket => close(&mut connection).await,
                    ReloadEffect::Reload => return ReloadOutcome::Reload,
                }
            }
        }

        let wake = tokio::select! {
            _ = shutdown.cancelled() => Wake::Shutdown,
            signal = next_signal(&mut connection) => Wake::Signal(signal),
            _ = sleep_until(reconnect_at) => Wake::ReconnectDue,
        };

        match wake {
            Wake::Shutdown => {
                close(&mut connection).await;
                return ReloadOutcome::Shutdown;
            }
            Wake::Signal(Some(signal)) => {
                client_info!("Reload signal received ({} bytes).", signal.payload_len);
                inbox.push_back(ReloadMsg::SignalReceived);
            }
            Wake::Signal(None) => {
                connection = None;
                inbox.push_back(ReloadMsg::SocketClosed);
            }
            Wake::ReconnectDue => {
                reconnect_at = None;
                inbox.push_back(ReloadMsg::ReconnectElapsed);
            }
        }
    }
}

async fn close(connection: &mut Option<Box<dyn ReloadConnection>>) {
    if let Some(mut open) = connection.take() {
        open.close().await;
    }
}

async fn next_signal(connection: &mut Option<Box<dyn ReloadConnection>>) -> Option<ReloadSignal> {
    match connection {
        Some(open) => open.next_signal().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Runs the reload action: the configured command, or a line on stdout.
pub async fn perform_reload(command: Option<&[String]>) {
    let Some((program, args)) = command.and_then(|argv| argv.split_first()) else {
        println!("reload");
        return;
    };
    match tokio::process::Command::new(program).args(args).status().await {
        Ok(status) if status.success() => client_debug!("Reload command finished"),
        Ok(status) => client_warn!("Reload command exited with {}", status),
        Err(err) => client_warn!("Failed to run reload command {:?}: {}", program, err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pffweb_engine::{ReloadConnection, ReloadError, ReloadSignal, ReloadTransport};
    use tokio::sync::mpsc;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;
    use url::Url;

    use super::{run_until_reload, ReloadOutcome, ReloadSettings};

    const SETTINGS: ReloadSettings = ReloadSettings {
        reconnect_delay: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(10),
    };

    /// Fails the first `failures` connects; each later connect hands the
    /// server side of the socket to the test.
    struct FakeTransport {
        failures: Mutex<usize>,
        attempts: Mutex<Vec<Instant>>,
        opened: mpsc::UnboundedSender<mpsc::UnboundedSender<ReloadSignal>>,
        closes: Arc<AtomicUsize>,
    }

    struct FakeConnection {
        signals: mpsc::UnboundedReceiver<ReloadSignal>,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ReloadTransport for FakeTransport {
        async fn connect(&self, _endpoint: &Url) -> Result<Box<dyn ReloadConnection>, ReloadError> {
            self.attempts.lock().unwrap().push(Instant::now());
            {
                let mut failures = self.failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(ReloadError::Connect("connection refused".to_string()));
                }
            }
            let (tx, rx) = mpsc::unbounded_channel();
            let _ = self.opened.send(tx);
            Ok(Box::new(FakeConnection {
                signals: rx,
                closes: self.closes.clone(),
            }))
        }
    }

    #[async_trait::async_trait]
    impl ReloadConnection for FakeConnection {
        async fn next_signal(&mut self) -> Option<ReloadSignal> {
            self.signals.recv().await
        }

        async fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        transport: Arc<FakeTransport>,
        opened: mpsc::UnboundedReceiver<mpsc::UnboundedSender<ReloadSignal>>,
        closes: Arc<AtomicUsize>,
        shutdown: CancellationToken,
    }

    impl Harness {
        fn new(failures: usize) -> Self {
            let (opened_tx, opened) = mpsc::unbounded_channel();
            let closes = Arc::new(AtomicUsize::new(0));
            Self {
                transport: Arc::new(FakeTransport {
                    failures: Mutex::new(failures),
                    attempts: Mutex::new(Vec::new()),
                    opened: opened_tx,
                    closes: closes.clone(),
                }),
                opened,
                closes,
                shutdown: CancellationToken::new(),
            }
        }

        fn spawn(&self) -> tokio::task::JoinHandle<ReloadOutcome> {
            let transport = self.transport.clone();
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                let endpoint = Url::parse("ws://localhost:8800/reload").unwrap();
                run_until_reload(transport.as_ref(), &endpoint, SETTINGS, &shutdown).await
            })
        }

        fn attempts(&self) -> Vec<Instant> {
            self.transport.attempts.lock().unwrap().clone()
        }
    }

    fn signal() -> ReloadSignal {
        ReloadSignal { payload_len: 6 }
    }

    #[tokio::test(start_paused = true)]
    async fn first_connect_waits_for_signal_then_reloads_once() {
        let mut harness = Harness::new(0);
        let task = harness.spawn();
        let server = harness.opened.recv().await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!task.is_finished());

        server.send(signal()).unwrap();
        server.send(signal()).unwrap();
        assert_eq!(task.await.unwrap(), ReloadOutcome::Reload);
        assert_eq!(harness.closes.load(Ordering::SeqCst), 1);
        assert_eq!(harness.attempts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn outage_reconnects_after_delay_and_reloads() {
        let mut harness = Harness::new(0);
        let task = harness.spawn();
        let server = harness.opened.recv().await.unwrap();
        drop(server);

        let _second = harness.opened.recv().await.unwrap();
        assert_eq!(task.await.unwrap(), ReloadOutcome::Reload);

        let attempts = harness.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[1] - attempts[0] >= Duration::from_secs(2));
        assert_eq!(harness.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connects_retry_forever_at_fixed_interval() {
        let mut harness = Harness::new(3);
        let task = harness.spawn();

        let _server = harness.opened.recv().await.unwrap();
        assert_eq!(task.await.unwrap(), ReloadOutcome::Reload);

        let attempts = harness.attempts();
        assert_eq!(attempts.len(), 4);
        for pair in attempts.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_secs(2), "retried after {gap:?}");
            assert!(gap < Duration::from_secs(3), "retried after {gap:?}");
        }
    }

    struct StalledTransport;

    #[async_trait::async_trait]
    impl ReloadTransport for StalledTransport {
        async fn connect(&self, _endpoint: &Url) -> Result<Box<dyn ReloadConnection>, ReloadError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_stalled_connect() {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                let endpoint = Url::parse("ws://localhost:8800/reload").unwrap();
                run_until_reload(&StalledTransport, &endpoint, SETTINGS, &shutdown).await
            }
        });

        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();

        assert_eq!(task.await.unwrap(), ReloadOutcome::Shutdown);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_socket() {
        let mut harness = Harness::new(0);
        let task = harness.spawn();
        let _server = harness.opened.recv().await.unwrap();

        harness.shutdown.cancel();
        assert_eq!(task.await.unwrap(), ReloadOutcome::Shutdown);
        assert_eq!(harness.closes.load(Ordering::SeqCst), 1);
    }
}
