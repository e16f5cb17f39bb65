//! Streaming dedup publisher
//!
//! Every consumer connection gets its own task and its own [`DedupCache`].
//! The task polls the store, formats both update kinds for each entry and
//! forwards only lines whose bytes differ from what that connection was last
//! sent for the same (key, kind). A fresh connection starts with an empty
//! cache and therefore receives the full picture on its first cycle.

use crate::config::Config;
use crate::error::Result;
use crate::format::{self, UpdateKind};
use crate::state::{AircraftKey, AircraftStore, Snapshot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Timing and policy shared by all connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherSettings {
    pub poll_interval: Duration,
    pub fault_backoff: Duration,
    pub emit_primary_targets: bool,
    pub channel_capacity: usize,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            fault_backoff: Duration::from_secs(1),
            emit_primary_targets: true,
            channel_capacity: 256,
        }
    }
}

impl From<&Config> for PublisherSettings {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.stream.poll_interval(),
            fault_backoff: config.stream.fault_backoff(),
            emit_primary_targets: config.emit_primary_targets,
            channel_capacity: config.stream.channel_capacity,
        }
    }
}

/// Lines produced by one poll cycle
#[derive(Debug, Default)]
pub struct CycleOutput {
    pub lines: Vec<String>,
    /// Entries that could not be formatted; they are retried next cycle
    pub faults: usize,
}

/// Last-emitted bytes per (key, kind) for one connection
#[derive(Debug)]
pub struct DedupCache {
    emit_primary_targets: bool,
    last_emitted: HashMap<(AircraftKey, UpdateKind), String>,
}

impl DedupCache {
    pub fn new(emit_primary_targets: bool) -> Self {
        Self {
            emit_primary_targets,
            last_emitted: HashMap::new(),
        }
    }

    /// Format every entry in `snapshot` and keep the lines that changed
    pub fn poll_cycle(&mut self, snapshot: &Snapshot) -> CycleOutput {
        let mut output = CycleOutput::default();

        for (key, state) in snapshot {
            if !state.is_primary_only() || self.emit_primary_targets {
                let line = format::to_line(&format::track_update(state));
                self.offer(key, UpdateKind::Track, line, &mut output);
            }

            if let Some(update) = format::flight_plan_update(state) {
                let line = format::to_line(&update);
                self.offer(key, UpdateKind::FlightPlan, line, &mut output);
            }
        }

        output
    }

    /// Number of (key, kind) pairs sent so far
    pub fn len(&self) -> usize {
        self.last_emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_emitted.is_empty()
    }

    fn offer(
        &mut self,
        key: &AircraftKey,
        kind: UpdateKind,
        line: Result<String>,
        output: &mut CycleOutput,
    ) {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(key = %key, kind = %kind, "Failed to format update: {}", e);
                output.faults += 1;
                return;
            }
        };

        let slot = (key.clone(), kind);
        if self.last_emitted.get(&slot) == Some(&line) {
            return;
        }
        self.last_emitted.insert(slot, line.clone());
        output.lines.push(line);
    }
}

/// Spawns one polling task per consumer connection
pub struct Publisher {
    store: Arc<AircraftStore>,
    settings: PublisherSettings,
    next_connection: AtomicU64,
}

impl Publisher {
    pub fn new(store: Arc<AircraftStore>, settings: PublisherSettings) -> Self {
        Self {
            store,
            settings,
            next_connection: AtomicU64::new(1),
        }
    }

    /// Start a publisher task for a new connection
    ///
    /// The task ends when `cancel` fires or the returned receiver is dropped.
    pub fn spawn_connection(&self, cancel: CancellationToken) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(self.settings.channel_capacity.max(1));
        let connection = self.next_connection.fetch_add(1, Ordering::Relaxed);

        info!(connection, "Stream consumer connected");
        tokio::spawn(run_connection(
            connection,
            self.store.clone(),
            self.settings,
            tx,
            cancel,
        ));
        rx
    }
}

async fn run_connection(
    connection: u64,
    store: Arc<AircraftStore>,
    settings: PublisherSettings,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    let mut cache = DedupCache::new(settings.emit_primary_targets);

    loop {
        let snapshot = store.snapshot().await;
        let cycle = cache.poll_cycle(&snapshot);

        if !cycle.lines.is_empty() {
            debug!(connection, lines = cycle.lines.len(), "Sending changed updates");
        }
        for line in cycle.lines {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(connection, "Stream publisher stopped");
                    return;
                }
                sent = tx.send(line) => {
                    if sent.is_err() {
                        info!(connection, "Stream consumer disconnected");
                        return;
                    }
                }
            }
        }

        let delay = if cycle.faults > 0 {
            error!(
                connection,
                faults = cycle.faults,
                "Poll cycle incomplete, backing off for {:?}", settings.fault_backoff
            );
            settings.poll_interval + settings.fault_backoff
        } else {
            settings.poll_interval
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                info!(connection, "Stream publisher stopped");
                return;
            }
            _ = tx.closed() => {
                info!(connection, "Stream consumer disconnected");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
