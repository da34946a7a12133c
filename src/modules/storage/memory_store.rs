//! In-memory object store used by tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{ObjectMetadata, ObjectStore, PutOptions, StorageError, StoredObject};

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Number of successful writes
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Seed an object without counting it as a write
    pub fn insert(&self, key: &str, body: &[u8], metadata: ObjectMetadata) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                metadata,
            },
        );
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        Ok(self.object(key))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        Ok(self.object(key).map(|o| o.metadata))
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: PutOptions) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                key: key.to_string(),
                detail: "write rejected".to_string(),
            });
        }

        let metadata = ObjectMetadata {
            content_type: Some(options.content_type),
            last_modified: Some(Utc::now()),
            etag: Some(format!("\"{}\"", self.puts.load(Ordering::SeqCst) + 1)),
            size: Some(body.len() as u64),
            custom: options.metadata,
        };
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), StoredObject { body, metadata });
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
