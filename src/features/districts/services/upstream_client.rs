use async_trait::async_trait;
use reqwest::header::REFERER;
use serde::Deserialize;
use serde_json::Value;

use super::SyncError;

const USER_AGENT: &str = "DistrictSync/0.1 (administrative-division-cache)";
const DISTRICT_LIST_PATH: &str = "/ws/district/v1/getlist";

/// Where a sync run gets its raw district payload from
#[async_trait]
pub trait DistrictSource: Send + Sync {
    /// Fetch the `result` payload of the district list.
    ///
    /// `caller` is sent as the identifying header the provider checks
    /// against the key's allow-list.
    async fn fetch(&self, api_key: &str, caller: Option<&str>) -> Result<Value, SyncError>;
}

/// Tencent Map WebService response envelope
#[derive(Debug, Deserialize)]
pub struct TencentEnvelope {
    pub status: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data_version: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
}

impl TencentEnvelope {
    /// Payload of a successful response
    pub fn into_result(self) -> Result<Value, SyncError> {
        if self.status != 0 {
            return Err(SyncError::UpstreamApi {
                code: self.status,
                message: self.message,
            });
        }

        if let Some(version) = &self.data_version {
            tracing::info!("Upstream district data version: {}", version);
        }

        match self.result {
            Some(result) if !result.is_null() => Ok(result),
            _ => Err(SyncError::EmptyResult),
        }
    }
}

/// Client for the Tencent Map district list API
pub struct TencentMapClient {
    client: reqwest::Client,
    base_url: String,
}

impl TencentMapClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().user_agent(USER_AGENT).build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl DistrictSource for TencentMapClient {
    async fn fetch(&self, api_key: &str, caller: Option<&str>) -> Result<Value, SyncError> {
        let url = format!(
            "{}{}?key={}",
            self.base_url,
            DISTRICT_LIST_PATH,
            urlencoding::encode(api_key)
        );

        // The key is part of the URL, so only the endpoint is logged
        tracing::debug!(
            "Fetching district list from {}{} (caller: {:?})",
            self.base_url,
            DISTRICT_LIST_PATH,
            caller
        );

        let mut request = self.client.get(&url);
        if let Some(caller) = caller {
            request = request.header(REFERER, caller);
        }

        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("District list request failed: {}", e);
            SyncError::UpstreamHttp {
                status: e.status().map(|s| s.as_u16()),
                detail: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::UpstreamHttp {
                status: Some(status.as_u16()),
                detail: body.chars().take(200).collect(),
            });
        }

        let envelope: TencentEnvelope = response.json().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("Failed to parse district list response: {}", e);
            SyncError::UpstreamHttp {
                status: Some(status.as_u16()),
                detail: format!("invalid response body: {}", e),
            }
        })?;

        envelope.into_result()
    }
}
