pub mod identifier_codec;
pub mod source_normalizer;
pub mod sync_service;
pub mod tree_builder;
pub mod upstream_client;

pub use sync_service::{DistrictSyncService, LastRun, SyncError, SyncReport, SyncSettings, SyncStage};
pub use upstream_client::{DistrictSource, TencentMapClient};
