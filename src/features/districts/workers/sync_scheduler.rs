use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::core::config::SyncConfig;
use crate::features::districts::services::{DistrictSyncService, SyncError};

/// Background worker that re-synchronizes the district tree on a fixed period
pub struct SyncScheduler {
    sync_service: Arc<DistrictSyncService>,
    period: Option<Duration>,
    run_on_startup: bool,
}

impl SyncScheduler {
    pub fn new(sync_service: Arc<DistrictSyncService>, config: &SyncConfig) -> Self {
        Self {
            sync_service,
            period: (config.interval_secs > 0).then(|| Duration::from_secs(config.interval_secs)),
            run_on_startup: config.run_on_startup,
        }
    }

    /// Whether there is anything for the worker to do
    pub fn is_enabled(&self) -> bool {
        self.period.is_some() || self.run_on_startup
    }

    /// Run the scheduler loop. Returns immediately when periodic runs are
    /// disabled, after the optional startup run.
    pub async fn run(&self) {
        if self.run_on_startup {
            tracing::info!("Running startup district sync");
            self.tick().await;
        }

        let Some(period) = self.period else {
            tracing::info!("Periodic district sync disabled");
            return;
        };

        tracing::info!("Starting district sync scheduler (every {}s)", period.as_secs());

        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&self) {
        match self.sync_service.run(None).await {
            Ok(_) => {}
            Err(SyncError::AlreadyRunning) => {
                tracing::info!("Skipping scheduled district sync, a run is already in progress");
            }
            Err(e) => {
                tracing::error!("Scheduled district sync failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryStore;
    use crate::shared::test_helpers::{guangdong_payload, sync_service, StubSource};

    fn config(interval_secs: u64, run_on_startup: bool) -> SyncConfig {
        SyncConfig {
            object_key: "districts.json".to_string(),
            interval_secs,
            run_on_startup,
        }
    }

    #[tokio::test]
    async fn test_startup_run_without_period_returns() {
        let source = Arc::new(StubSource::ok(guangdong_payload()));
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(sync_service(source.clone(), store.clone()));
        let scheduler = SyncScheduler::new(service, &config(0, true));

        scheduler.run().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(store.put_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_nothing() {
        let source = Arc::new(StubSource::ok(guangdong_payload()));
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(sync_service(source.clone(), store));
        let scheduler = SyncScheduler::new(service, &config(0, false));

        assert!(!scheduler.is_enabled());
        scheduler.run().await;
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_runs_follow_interval() {
        let source = Arc::new(StubSource::ok(guangdong_payload()));
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(sync_service(source.clone(), store));
        let scheduler = SyncScheduler::new(service, &config(60, false));

        let handle = tokio::spawn(async move { scheduler.run().await });

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 0);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(source.calls(), 2);

        handle.abort();
    }
}
