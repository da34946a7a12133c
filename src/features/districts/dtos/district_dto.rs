use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::districts::services::{LastRun, SyncReport};

/// Response DTO for a completed sync run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncReportDto {
    /// Object key the tree was written to
    pub key: String,
    pub updated_at: DateTime<Utc>,
    /// Upstream payload layout the run detected
    pub shape: String,
    pub provinces: usize,
    pub cities: usize,
    pub districts: usize,
    /// Divisions dropped because of unusable identifiers
    pub skipped: usize,
    /// Size of the serialized tree
    pub bytes: usize,
}

impl From<SyncReport> for SyncReportDto {
    fn from(r: SyncReport) -> Self {
        Self {
            key: r.key,
            updated_at: r.updated_at,
            shape: r.shape.to_string(),
            provinces: r.stats.provinces,
            cities: r.stats.cities,
            districts: r.stats.districts,
            skipped: r.skipped,
            bytes: r.bytes,
        }
    }
}

/// Outcome of the most recent run handled by this instance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LastRunDto {
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

impl From<LastRun> for LastRunDto {
    fn from(run: LastRun) -> Self {
        Self {
            finished_at: run.finished_at,
            success: run.outcome.is_ok(),
            error: run.outcome.err().map(|e| e.to_string()),
        }
    }
}

/// Response DTO for the sync status endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncStatusDto {
    pub key: String,
    /// Current stage of this instance's sync state machine
    pub stage: String,
    /// Whether a tree has been stored yet
    pub stored: bool,
    pub last_updated: Option<DateTime<Utc>>,
    /// `last_updated` in China Standard Time
    pub last_updated_display: String,
    /// Raw `updated-at` metadata of the stored object
    pub updated_at_metadata: Option<String>,
    pub etag: Option<String>,
    pub size: Option<u64>,
    pub last_run: Option<LastRunDto>,
}
