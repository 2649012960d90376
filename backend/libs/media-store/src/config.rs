/// Media store configuration shared by every service that uploads assets
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MediaStoreConfig {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Base URL assets are served from (CDN domain)
    pub cdn_base_url: String,
    /// Endpoint override for S3-compatible stores (MinIO); forces path-style
    pub endpoint_url: Option<String>,
    /// Per-call request timeout
    pub request_timeout: Duration,
}

impl MediaStoreConfig {
    /// Load media store configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("MEDIA_BUCKET").unwrap_or_else(|_| "vidra-media".to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            cdn_base_url: std::env::var("MEDIA_CDN_BASE_URL")
                .unwrap_or_else(|_| "https://cdn.vidra.dev".to_string())
                .trim_end_matches('/')
                .to_string(),
            endpoint_url: std::env::var("MEDIA_ENDPOINT_URL").ok(),
            request_timeout: Duration::from_secs(
                std::env::var("MEDIA_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Public URL for an object key
    pub fn cdn_url(&self, key: &str) -> String {
        format!("{}/{}", self.cdn_base_url, key)
    }
}
