//! One synchronization attempt: fetch, normalize, build, persist.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use super::source_normalizer::normalize;
use super::tree_builder::{build_tree, BuildStats};
use super::upstream_client::DistrictSource;
use crate::core::config::{SyncConfig, UpstreamConfig};
use crate::modules::storage::{ObjectMetadata, ObjectStore, PutOptions, StorageError, StoredObject};
use crate::shared::constants::{JSON_CONTENT_TYPE, UPDATED_AT_METADATA_KEY};

/// Terminal reason a sync run failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Upstream API key is not configured")]
    MissingCredential,

    #[error("Upstream HTTP error{}: {detail}", status_suffix(.status))]
    UpstreamHttp { status: Option<u16>, detail: String },

    #[error("Upstream API error {code}: {message}")]
    UpstreamApi { code: i64, message: String },

    #[error("Upstream returned no usable district records")]
    EmptyResult,

    #[error("Failed to persist district tree: {0}")]
    StoreWrite(String),

    #[error("A district sync is already running")]
    AlreadyRunning,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStage {
    Idle,
    Fetching,
    Normalizing,
    Building,
    Persisting,
    Done,
    Failed(SyncError),
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStage::Idle => f.write_str("idle"),
            SyncStage::Fetching => f.write_str("fetching"),
            SyncStage::Normalizing => f.write_str("normalizing"),
            SyncStage::Building => f.write_str("building"),
            SyncStage::Persisting => f.write_str("persisting"),
            SyncStage::Done => f.write_str("done"),
            SyncStage::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Settings a run needs, resolved once from configuration
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub api_key: Option<String>,
    pub object_key: String,
    /// Identity sent upstream when the trigger does not supply one
    pub caller_identity: Option<String>,
}

impl SyncSettings {
    pub fn from_config(upstream: &UpstreamConfig, sync: &SyncConfig) -> Self {
        Self {
            api_key: upstream.api_key.clone(),
            object_key: sync.object_key.clone(),
            caller_identity: upstream.caller_identity.clone(),
        }
    }

    /// File name offered to clients downloading the stored tree
    pub fn attachment_filename(&self) -> &str {
        self.object_key
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("districts.json")
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub key: String,
    /// When the tree was built; the same value is stored as `updated-at`
    /// metadata by the write, so it precedes the store's last-modified time
    pub updated_at: DateTime<Utc>,
    pub shape: &'static str,
    pub stats: BuildStats,
    pub skipped: usize,
    pub bytes: usize,
}

/// Outcome of the most recent run in this process
#[derive(Debug, Clone)]
pub struct LastRun {
    pub finished_at: DateTime<Utc>,
    pub outcome: Result<SyncReport, SyncError>,
}

/// Drives district synchronization runs against an upstream source and an
/// object store. Runs within one process never overlap.
pub struct DistrictSyncService {
    settings: SyncSettings,
    source: Arc<dyn DistrictSource>,
    store: Arc<dyn ObjectStore>,
    run_lock: Mutex<()>,
    stage: RwLock<SyncStage>,
    last_run: RwLock<Option<LastRun>>,
}

impl DistrictSyncService {
    pub fn new(
        settings: SyncSettings,
        source: Arc<dyn DistrictSource>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            settings,
            source,
            store,
            run_lock: Mutex::new(()),
            stage: RwLock::new(SyncStage::Idle),
            last_run: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub async fn stage(&self) -> SyncStage {
        self.stage.read().await.clone()
    }

    pub async fn last_run(&self) -> Option<LastRun> {
        self.last_run.read().await.clone()
    }

    /// Run one synchronization.
    ///
    /// `caller` overrides the configured caller identity for this run. On any
    /// failure the stored object is left as it was.
    pub async fn run(&self, caller: Option<&str>) -> Result<SyncReport, SyncError> {
        let _guard = self.run_lock.try_lock().map_err(|_| {
            tracing::warn!("District sync requested while another run is in progress");
            SyncError::AlreadyRunning
        })?;

        tracing::info!("Starting districts update...");
        let outcome = self.execute(caller).await;

        match &outcome {
            Ok(report) => {
                self.enter(SyncStage::Done).await;
                tracing::info!(
                    "Districts update completed: {} provinces, {} cities, {} districts ({} skipped, {} bytes)",
                    report.stats.provinces,
                    report.stats.cities,
                    report.stats.districts,
                    report.skipped,
                    report.bytes
                );
            }
            Err(e) => {
                self.enter(SyncStage::Failed(e.clone())).await;
                tracing::error!("Districts update failed: {}", e);
            }
        }

        *self.last_run.write().await = Some(LastRun {
            finished_at: Utc::now(),
            outcome: outcome.clone(),
        });

        outcome
    }

    async fn execute(&self, caller: Option<&str>) -> Result<SyncReport, SyncError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(SyncError::MissingCredential)?;
        let caller = caller.or(self.settings.caller_identity.as_deref());

        self.enter(SyncStage::Fetching).await;
        let payload = self.source.fetch(api_key, caller).await?;

        self.enter(SyncStage::Normalizing).await;
        let shape = normalize(&payload)?;
        tracing::info!("Upstream payload detected as {} shape", shape.kind());

        self.enter(SyncStage::Building).await;
        let outcome = build_tree(&shape)?;

        self.enter(SyncStage::Persisting).await;
        let body = serde_json::to_vec(&outcome.tree)
            .map_err(|e| SyncError::StoreWrite(format!("serialization failed: {}", e)))?;
        let bytes = body.len();
        // Recorded in the same PUT, so it has to be taken before the write
        let updated_at = Utc::now();

        let options = PutOptions {
            content_type: JSON_CONTENT_TYPE.to_string(),
            metadata: HashMap::from([(
                UPDATED_AT_METADATA_KEY.to_string(),
                updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            )]),
        };

        self.store
            .put(&self.settings.object_key, body, options)
            .await
            .map_err(|e| SyncError::StoreWrite(e.to_string()))?;

        Ok(SyncReport {
            key: self.settings.object_key.clone(),
            updated_at,
            shape: shape.kind(),
            stats: outcome.stats,
            skipped: outcome.skipped.len(),
            bytes,
        })
    }

    async fn enter(&self, stage: SyncStage) {
        tracing::debug!("District sync stage: {}", stage);
        *self.stage.write().await = stage;
    }

    /// The stored tree, if a sync has ever completed
    pub async fn stored_tree(&self) -> Result<Option<StoredObject>, StorageError> {
        self.store.get(&self.settings.object_key).await
    }

    /// Metadata of the stored tree without fetching its body
    pub async fn stored_metadata(&self) -> Result<Option<ObjectMetadata>, StorageError> {
        self.store.head(&self.settings.object_key).await
    }
}
