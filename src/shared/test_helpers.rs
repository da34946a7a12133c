//! Fixtures shared by service and route tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::features::districts::services::{
    DistrictSource, DistrictSyncService, SyncError, SyncSettings,
};
use crate::modules::storage::MemoryStore;

/// Upstream stand-in returning a fixed response
pub struct StubSource {
    response: Result<Value, SyncError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    callers: Mutex<Vec<Option<String>>>,
}

impl StubSource {
    pub fn ok(payload: Value) -> Self {
        Self::with_response(Ok(payload))
    }

    pub fn failing(error: SyncError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<Value, SyncError>) -> Self {
        Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            callers: Mutex::new(Vec::new()),
        }
    }

    /// Hold every fetch for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn callers(&self) -> Vec<Option<String>> {
        self.callers.lock().unwrap().clone()
    }
}

#[async_trait]
impl DistrictSource for StubSource {
    async fn fetch(&self, _api_key: &str, caller: Option<&str>) -> Result<Value, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.callers.lock().unwrap().push(caller.map(str::to_string));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

pub fn test_settings() -> SyncSettings {
    SyncSettings {
        api_key: Some("test-key".to_string()),
        object_key: "districts.json".to_string(),
        caller_identity: Some("https://districts.example.com".to_string()),
    }
}

pub fn sync_service(source: Arc<StubSource>, store: Arc<MemoryStore>) -> DistrictSyncService {
    DistrictSyncService::new(test_settings(), source, store)
}

/// One province, one city, one district in the three-level array layout
pub fn guangdong_payload() -> Value {
    json!([
        [{"id": "440000", "name": "广东", "fullname": "广东省"}],
        [{"id": "440100", "name": "广州", "fullname": "广州市"}],
        [{"id": "440103", "name": "荔湾", "fullname": "荔湾区"}]
    ])
}
