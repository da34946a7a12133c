//! MinIO/S3-compatible storage client
//!
//! Everything goes through the rust-s3 crate. Writes carry the user metadata
//! as `x-amz-meta-*` headers on the same PUT, so the object body and its
//! metadata land in one object version.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{ObjectMetadata, ObjectStore, PutOptions, StorageError, StoredObject};
use crate::core::config::MinIOConfig;

const META_HEADER_PREFIX: &str = "x-amz-meta-";

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration
    pub fn new(config: MinIOConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Client(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| StorageError::Client(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        info!(
            "MinIO client configured for endpoint: {}, bucket: {}",
            config.endpoint,
            bucket.name()
        );

        Ok(Self {
            bucket,
            region,
            credentials,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            StorageError::Client(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[async_trait]
impl ObjectStore for MinIOClient {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let response = match self.bucket.get_object(key).await {
            Ok(response) => response,
            Err(e) if is_not_found(&e.to_string()) => return Ok(None),
            Err(e) => {
                return Err(StorageError::Read {
                    key: key.to_string(),
                    detail: e.to_string(),
                })
            }
        };

        match response.status_code() {
            404 => return Ok(None),
            code if !(200..300).contains(&code) => {
                return Err(StorageError::Read {
                    key: key.to_string(),
                    detail: format!("unexpected status {}", code),
                })
            }
            _ => {}
        }

        let headers = response.headers();
        let metadata = metadata_from_headers(&headers);
        let body = response.bytes().to_vec();

        debug!(
            "Downloaded '{}' ({} bytes) from bucket '{}'",
            key,
            body.len(),
            self.bucket.name()
        );
        Ok(Some(StoredObject { body, metadata }))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        match self.bucket.head_object(key).await {
            Ok((_, 404)) => Ok(None),
            Ok((result, code)) if (200..300).contains(&code) => Ok(Some(ObjectMetadata {
                content_type: result.content_type,
                last_modified: result.last_modified.as_deref().and_then(parse_http_date),
                etag: result.e_tag,
                size: result.content_length.and_then(|len| u64::try_from(len).ok()),
                custom: result
                    .metadata
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(k, v)| (strip_meta_prefix(&k), v))
                    .collect(),
            })),
            Ok((_, code)) => Err(StorageError::Read {
                key: key.to_string(),
                detail: format!("unexpected status {}", code),
            }),
            Err(e) if is_not_found(&e.to_string()) => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                detail: e.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: PutOptions) -> Result<(), StorageError> {
        let write_err = |detail: String| StorageError::Write {
            key: key.to_string(),
            detail,
        };

        let headers = metadata_headers(&options.metadata).map_err(write_err)?;
        let response = self
            .bucket
            .put_object_with_content_type_and_headers(
                key,
                &body,
                &options.content_type,
                Some(headers),
            )
            .await
            .map_err(|e| write_err(e.to_string()))?;

        let code = response.status_code();
        if !(200..300).contains(&code) {
            return Err(write_err(format!(
                "{} - {}",
                code,
                String::from_utf8_lossy(response.bytes())
            )));
        }

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            key,
            body.len(),
            self.bucket.name()
        );
        Ok(())
    }
}

fn is_not_found(error: &str) -> bool {
    error.contains("404") || error.contains("NoSuchKey")
}

/// User metadata as `x-amz-meta-*` request headers
fn metadata_headers(metadata: &HashMap<String, String>) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for (name, value) in metadata {
        let header_name = format!("{}{}", META_HEADER_PREFIX, name.to_lowercase());
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| format!("Invalid metadata name '{}': {}", name, e))?;
        let header_value = HeaderValue::from_str(value.trim())
            .map_err(|e| format!("Invalid metadata value for '{}': {}", name, e))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn strip_meta_prefix(name: &str) -> String {
    let lower = name.to_lowercase();
    lower
        .strip_prefix(META_HEADER_PREFIX)
        .map(str::to_string)
        .unwrap_or(lower)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn metadata_from_headers(headers: &HashMap<String, String>) -> ObjectMetadata {
    let mut metadata = ObjectMetadata::default();

    for (name, value) in headers {
        let name = name.to_lowercase();
        match name.as_str() {
            "content-type" => metadata.content_type = Some(value.clone()),
            "last-modified" => metadata.last_modified = parse_http_date(value),
            "etag" => metadata.etag = Some(value.clone()),
            "content-length" => metadata.size = value.parse().ok(),
            _ if name.starts_with(META_HEADER_PREFIX) => {
                metadata
                    .custom
                    .insert(strip_meta_prefix(&name), value.clone());
            }
            _ => {}
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_headers() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(
            "Last-Modified".to_string(),
            "Wed, 21 Oct 2026 07:28:00 GMT".to_string(),
        );
        headers.insert("ETag".to_string(), "\"abc\"".to_string());
        headers.insert(
            "x-amz-meta-updated-at".to_string(),
            "2026-10-21T07:27:59.000Z".to_string(),
        );

        let metadata = metadata_from_headers(&headers);
        assert_eq!(metadata.content_type.as_deref(), Some("application/json"));
        assert_eq!(metadata.etag.as_deref(), Some("\"abc\""));
        assert_eq!(
            metadata.last_modified.map(|t| t.to_rfc3339()),
            Some("2026-10-21T07:28:00+00:00".to_string())
        );
        assert_eq!(
            metadata.updated_at().map(|t| t.to_rfc3339()),
            Some("2026-10-21T07:27:59+00:00".to_string())
        );
    }

    #[test]
    fn test_metadata_headers_are_prefixed() {
        let metadata = HashMap::from([(
            "Updated-At".to_string(),
            " 2026-10-21T07:27:59.000Z ".to_string(),
        )]);

        let headers = metadata_headers(&metadata).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get("x-amz-meta-updated-at").unwrap(),
            "2026-10-21T07:27:59.000Z"
        );
    }

    #[test]
    fn test_metadata_headers_reject_invalid_names() {
        let metadata = HashMap::from([("bad name".to_string(), "x".to_string())]);
        assert!(metadata_headers(&metadata).is_err());
    }

    #[test]
    fn test_strip_meta_prefix() {
        assert_eq!(strip_meta_prefix("X-Amz-Meta-Updated-At"), "updated-at");
        assert_eq!(strip_meta_prefix("updated-at"), "updated-at");
    }
}
