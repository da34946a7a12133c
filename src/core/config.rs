use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub swagger: SwaggerConfig,
    pub upstream: UpstreamConfig,
    pub sync: SyncConfig,
    pub minio: MinIOConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Tencent Map WebService district-list API settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the WebService API (no trailing slash)
    pub base_url: String,
    /// API key. Optional at boot so the read endpoints keep working;
    /// every sync run checks it before touching the network.
    pub api_key: Option<String>,
    /// Referer sent when the triggering context does not supply one
    pub caller_identity: Option<String>,
}

/// Synchronization settings shared by the scheduler and the trigger endpoint
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Object key the serialized tree is stored under
    pub object_key: String,
    /// Period between scheduled runs in seconds (0 disables the scheduler)
    pub interval_secs: u64,
    /// Run once immediately after startup
    pub run_on_startup: bool,
}

/// MinIO/S3 storage configuration
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket holding the districts object
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            upstream: UpstreamConfig::from_env()?,
            sync: SyncConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "District Sync API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Administrative division tree synchronized from Tencent Map".to_string()
        });

        Ok(Self {
            title,
            version,
            description,
        })
    }
}

impl UpstreamConfig {
    const DEFAULT_BASE_URL: &'static str = "https://apis.map.qq.com";

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("TENCENT_MAP_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = non_empty_var("TENCENT_MAP_KEY");
        let caller_identity = non_empty_var("UPSTREAM_REFERER");

        Ok(Self {
            base_url,
            api_key,
            caller_identity,
        })
    }
}

impl SyncConfig {
    const DEFAULT_OBJECT_KEY: &'static str = "districts.json";
    const DEFAULT_INTERVAL_SECS: u64 = 24 * 60 * 60; // daily

    pub fn from_env() -> Result<Self, String> {
        let object_key = non_empty_var("DISTRICTS_OBJECT_KEY")
            .unwrap_or_else(|| Self::DEFAULT_OBJECT_KEY.to_string());

        let interval_secs = env::var("SYNC_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SYNC_INTERVAL_SECS must be a valid number".to_string())?;

        let run_on_startup = env::var("SYNC_ON_STARTUP")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|_| "SYNC_ON_STARTUP must be true or false".to_string())?;

        Ok(Self {
            object_key,
            interval_secs,
            run_on_startup,
        })
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "district-sync".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_key,
            secret_key,
            bucket,
            region,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        };
        assert_eq!(config.server_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_non_empty_var_ignores_blank_values() {
        env::set_var("DISTRICT_SYNC_TEST_BLANK", "   ");
        env::set_var("DISTRICT_SYNC_TEST_SET", " key ");

        assert_eq!(non_empty_var("DISTRICT_SYNC_TEST_BLANK"), None);
        assert_eq!(non_empty_var("DISTRICT_SYNC_TEST_SET"), Some("key".to_string()));
        assert_eq!(non_empty_var("DISTRICT_SYNC_TEST_UNSET"), None);
    }
}
