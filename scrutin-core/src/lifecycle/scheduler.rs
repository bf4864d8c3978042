use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{error, info};

use crate::error::Result;
use crate::lifecycle::service::LifecycleService;

/// Sweep cadence and switches. Either sweep can be disabled for deployments
/// that drive retirement manually through the publish endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    pub completion_interval: Duration,
    pub archival_interval: Duration,
    pub auto_complete: bool,
    pub auto_archive: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            completion_interval: Duration::from_secs(60),
            archival_interval: Duration::from_secs(30),
            auto_complete: true,
            auto_archive: true,
        }
    }
}

/// Timer-driven lifecycle sweeps that run for the lifetime of the process.
pub struct LifecycleScheduler {
    service: Arc<LifecycleService>,
    settings: SweepSettings,
    shutdown_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<()>>>,
}

impl std::fmt::Debug for LifecycleScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleScheduler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LifecycleScheduler {
    pub fn new(
        service: Arc<LifecycleService>,
        settings: SweepSettings,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            service,
            settings,
            shutdown_rx: Arc::new(tokio::sync::Mutex::new(shutdown_rx)),
        }
    }

    /// Runs the enabled sweep loops until the shutdown channel fires.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!(
            "Starting lifecycle scheduler (completion every {:?}, archival every {:?})",
            self.settings.completion_interval, self.settings.archival_interval
        );

        let mut tasks = Vec::new();

        if self.settings.auto_complete {
            let scheduler = self.clone();
            tasks.push(tokio::spawn(async move {
                scheduler.run_completion_sweeps().await;
            }));
        } else {
            info!("Completion sweep disabled by configuration");
        }

        if self.settings.auto_archive {
            let scheduler = self.clone();
            tasks.push(tokio::spawn(async move {
                scheduler.run_archival_sweeps().await;
            }));
        } else {
            info!("Archival sweep disabled by configuration");
        }

        // Wait for shutdown signal
        {
            let mut shutdown_rx = self.shutdown_rx.lock().await;
            let _ = shutdown_rx.recv().await;
        }

        info!("Shutting down lifecycle scheduler");

        for task in tasks {
            task.abort();
        }

        Ok(())
    }

    async fn run_completion_sweeps(&self) {
        let mut interval = interval(self.settings.completion_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.service.completion_sweep().await {
                error!("Completion sweep pass failed: {}", e);
            }
        }
    }

    async fn run_archival_sweeps(&self) {
        let mut interval = interval(self.settings.archival_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.service.archival_sweep().await {
                error!("Archival sweep pass failed: {}", e);
            }
        }
    }
}
