//! Worker scheduler for periodic background tasks.

use notifier::Notifier;
use registry::ComputerRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use telemetry::health;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Worker scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between health probes of the registry and notifier
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
}

fn default_health_check_interval_secs() -> u64 {
    60
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            health_check_interval_secs: default_health_check_interval_secs(),
        }
    }
}

impl WorkerConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs.max(1))
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    registry: Arc<dyn ComputerRepository>,
    notifier: Arc<dyn Notifier>,
}

impl WorkerScheduler {
    pub fn new(
        config: WorkerConfig,
        registry: Arc<dyn ComputerRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            registry,
            notifier,
        }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_health_probe(shutdown).await;
        }));

        info!("Background workers started");
        handles
    }

    async fn run_health_probe(&self, shutdown: CancellationToken) {
        let mut ticker = interval(self.config.health_check_interval());

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Health probe stopping");
                    return;
                }
                _ = ticker.tick() => self.probe_once().await,
            }
        }
    }

    /// Probe every dependency once and record the result.
    pub async fn probe_once(&self) {
        let status = health();

        if self.registry.ping().await {
            status.registry.set_healthy();
        } else {
            warn!("Registry health probe failed");
            status.registry.set_unhealthy("registry unreachable");
        }

        if self.notifier.is_healthy().await {
            status.notifier.set_healthy();
        } else {
            warn!("Notification service health probe failed");
            status.notifier.set_unhealthy("notification service unreachable");
        }
    }
}
