//! Storage module for the synchronized districts object
//!
//! Defines the `ObjectStore` seam the sync orchestrator and the HTTP handlers
//! talk to, plus the MinIO/S3-compatible implementation used in production.

#[cfg(test)]
mod memory_store;
mod minio_client;

#[cfg(test)]
pub use memory_store::MemoryStore;
pub use minio_client::MinIOClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::shared::constants::UPDATED_AT_METADATA_KEY;

/// Errors raised by an object store backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure storage client: {0}")]
    Client(String),

    #[error("Failed to read object '{key}': {detail}")]
    Read { key: String, detail: String },

    #[error("Failed to write object '{key}': {detail}")]
    Write { key: String, detail: String },
}

/// Object metadata as returned by a HEAD request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub size: Option<u64>,
    /// User metadata, keys without the `x-amz-meta-` prefix
    pub custom: HashMap<String, String>,
}

impl ObjectMetadata {
    /// Build time recorded by the sync run that wrote the object
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.custom
            .get(UPDATED_AT_METADATA_KEY)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Best known time of the last write: the recorded build time,
    /// falling back to the store's last-modified timestamp
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at().or(self.last_modified)
    }
}

/// A stored object body together with its metadata
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub metadata: ObjectMetadata,
}

/// Options for a single PUT
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

/// Key-value object storage with all-or-nothing writes
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object, `None` when the key does not exist
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;

    /// Fetch only the metadata of an object, `None` when the key does not exist
    async fn head(&self, key: &str) -> Result<Option<ObjectMetadata>, StorageError>;

    /// Write an object in a single request
    async fn put(&self, key: &str, body: Vec<u8>, options: PutOptions) -> Result<(), StorageError>;
}
