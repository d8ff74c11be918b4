//! Endpoint poller: fetches the event list of one endpoint on a fixed interval
//!
//! Each poller runs its own fetch-store-wait loop on a tokio task. The latest
//! result is published through a `watch` channel as a whole [`Snapshot`], so
//! readers always see a complete event list and never wait on a fetch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::EndpointConfig;
use crate::event::{parse_events, Event};
use crate::io::{BasicAuth, HttpClient};
use crate::SensutopError;

/// Consecutive failures after which a poller logs a warning
pub const FAILURE_WARN_THRESHOLD: u32 = 5;

/// The event list most recently stored by a poller
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub events: Arc<Vec<Event>>,
    /// Completed fetch attempts, successful or not
    pub fetch_count: u64,
    pub consecutive_failures: u32,
}

/// Everything needed to fetch events from one endpoint
#[derive(Clone)]
struct Fetcher {
    name: String,
    url: String,
    auth: Option<BasicAuth>,
    http: Arc<dyn HttpClient>,
}

impl Fetcher {
    async fn fetch(&self) -> crate::Result<Vec<Event>> {
        let failed = |reason: String| SensutopError::FetchFailed {
            endpoint: self.name.clone(),
            reason,
        };

        let response = self
            .http
            .get(&self.url, self.auth.clone())
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.is_success() {
            return Err(failed(format!("HTTP status {}", response.status)));
        }

        parse_events(&response.body).map_err(|e| failed(e.to_string()))
    }
}

/// Polls a single monitoring endpoint in the background
pub struct EndpointPoller {
    fetcher: Fetcher,
    interval: Duration,
    snapshot_tx: Option<watch::Sender<Snapshot>>,
    snapshot_rx: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for EndpointPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointPoller")
            .field("name", &self.fetcher.name)
            .field("url", &self.fetcher.url)
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl EndpointPoller {
    pub fn new(
        name: &str,
        config: &EndpointConfig,
        http: Arc<dyn HttpClient>,
        interval: Duration,
    ) -> Self {
        let fetcher = Fetcher {
            name: name.to_string(),
            url: config.events_url(),
            auth: config.credentials(),
            http,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());

        tracing::debug!("Created poller '{}' for {}", fetcher.name, fetcher.url);

        Self {
            fetcher,
            interval,
            snapshot_tx: Some(snapshot_tx),
            snapshot_rx,
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.fetcher.name
    }

    pub fn url(&self) -> &str {
        &self.fetcher.url
    }

    /// Start the fetch loop. A poller can only be started once.
    pub fn start(&mut self) {
        let Some(snapshot_tx) = self.snapshot_tx.take() else {
            tracing::warn!("Poller '{}' already started", self.fetcher.name);
            return;
        };

        let fetcher = self.fetcher.clone();
        let interval = self.interval;
        let cancel = self.cancel.clone();

        tracing::debug!(
            "Starting poller '{}' with interval {:?}",
            fetcher.name,
            interval
        );
        self.handle = Some(tokio::spawn(async move {
            poll_loop(fetcher, snapshot_tx, interval, cancel).await;
        }));
    }

    /// Signal the fetch loop to exit. An in-flight fetch is allowed to finish.
    pub fn stop(&self) {
        tracing::debug!("Stopping poller '{}'", self.fetcher.name);
        self.cancel.cancel();
    }

    /// Wait for the fetch loop to exit after [`stop`](Self::stop)
    pub async fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Poller '{}' task failed: {}", self.fetcher.name, e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The most recently stored event list
    pub fn latest_events(&self) -> Arc<Vec<Event>> {
        Arc::clone(&self.snapshot_rx.borrow().events)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver that is notified each time a new snapshot is stored
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Fetch once without touching the stored snapshot
    #[cfg(test)]
    async fn fetch(&self) -> crate::Result<Vec<Event>> {
        self.fetcher.fetch().await
    }
}

impl Drop for EndpointPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    fetcher: Fetcher,
    snapshot_tx: watch::Sender<Snapshot>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut fetch_count: u64 = 0;
    let mut consecutive_failures: u32 = 0;

    while !cancel.is_cancelled() {
        tracing::debug!("Fetching '{}'", fetcher.name);
        let events = match fetcher.fetch().await {
            Ok(events) => {
                tracing::debug!("Got {} events from '{}'", events.len(), fetcher.name);
                consecutive_failures = 0;
                events
            }
            Err(e) => {
                consecutive_failures += 1;
                tracing::debug!("{}", e);
                if consecutive_failures == FAILURE_WARN_THRESHOLD {
                    tracing::warn!(
                        "Endpoint '{}' has {} consecutive fetch failures",
                        fetcher.name,
                        consecutive_failures
                    );
                }
                Vec::new()
            }
        };
        fetch_count += 1;

        snapshot_tx.send_replace(Snapshot {
            events: Arc::new(events),
            fetch_count,
            consecutive_failures,
        });

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => {}
        }
    }

    tracing::debug!("Polling loop for '{}' stopped", fetcher.name);
}
