/// Configuration management for the video service
///
/// Loads configuration from environment variables. Database pool settings
/// live in `db-pool` and media store settings in `media-store`; this covers
/// everything that is specific to this service.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Token validation settings
    pub auth: AuthConfig,
    /// Watch-history settings
    pub history: HistoryConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

/// Token validation settings. Token issuance belongs to the identity
/// service; this service only validates bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity service
    pub jwt_secret: String,
}

/// Watch-history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum entries kept per user; oldest entries are evicted past this
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    100
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8084), // video-service default HTTP port
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };

        let history = HistoryConfig {
            limit: std::env::var("WATCH_HISTORY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or_else(default_history_limit),
        };

        Ok(Config { app, auth, history })
    }
}
