//! Altimeter refresh task
//!
//! Startup makes a bounded number of fetch attempts; after that the task
//! sleeps one refresh interval between single attempts, forever or until
//! cancelled. A failed fetch is logged and the previous setting is kept.

use super::source::PressureSource;
use super::Altimeter;
use crate::config::AltimeterConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Retry and refresh timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub startup_attempts: u32,
    pub startup_retry_delay: Duration,
    pub refresh_interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            startup_attempts: 3,
            startup_retry_delay: Duration::from_secs(5),
            refresh_interval: Duration::from_secs(300),
        }
    }
}

impl From<&AltimeterConfig> for RefreshPolicy {
    fn from(config: &AltimeterConfig) -> Self {
        Self {
            startup_attempts: config.startup_attempts,
            startup_retry_delay: config.startup_retry_delay(),
            refresh_interval: config.refresh_interval(),
        }
    }
}

/// Sole writer of the shared [`Altimeter`] reading
pub struct AltimeterRefresher {
    source: Arc<dyn PressureSource>,
    altimeter: Arc<Altimeter>,
    policy: RefreshPolicy,
}

impl AltimeterRefresher {
    pub fn new(
        source: Arc<dyn PressureSource>,
        altimeter: Arc<Altimeter>,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            source,
            altimeter,
            policy,
        }
    }

    /// Spawn [`run`](Self::run) onto the runtime
    pub fn spawn(self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Startup attempts, then the periodic loop until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        info!(source = self.source.name(), "Fetching initial altimeter setting");
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = self.startup() => {}
        }

        info!(
            interval_secs = self.policy.refresh_interval.as_secs(),
            "Starting periodic altimeter updates"
        );
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Altimeter refresh task stopped");
                    return;
                }
                _ = tokio::time::sleep(self.policy.refresh_interval) => {
                    self.refresh_once().await;
                }
            }
        }
    }

    /// Up to `startup_attempts` fetches; returns whether one succeeded
    pub async fn startup(&self) -> bool {
        let attempts = self.policy.startup_attempts;
        for attempt in 1..=attempts {
            if self.refresh_once().await {
                return true;
            }
            if attempt < attempts {
                info!("Retrying altimeter fetch (attempt {}/{})", attempt + 1, attempts);
                tokio::time::sleep(self.policy.startup_retry_delay).await;
            }
        }
        warn!(
            setting_inhg = self.altimeter.current().setting_inhg,
            "No altimeter setting after {} attempts, keeping current value", attempts
        );
        false
    }

    /// One fetch; on success the reading is replaced, on failure it is kept
    pub async fn refresh_once(&self) -> bool {
        match self.source.fetch().await {
            Ok(setting_inhg) => {
                let reading = self.altimeter.update(setting_inhg);
                info!(
                    setting_inhg = reading.setting_inhg,
                    at = %reading.updated_at.format("%Y-%m-%d %H:%M:%S"),
                    "Updated altimeter setting"
                );
                true
            }
            Err(e) => {
                warn!(source = self.source.name(), "Altimeter fetch failed: {}", e);
                false
            }
        }
    }
}
