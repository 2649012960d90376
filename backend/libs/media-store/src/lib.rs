//! Media Store Adapter
//!
//! Wraps the external object store behind the [`MediaStore`] trait so
//! services (and their tests) never talk to S3 directly. Uploads take a
//! staged local file and hand back a hosted URL plus derived metadata;
//! deletes are idempotent and keyed by the public id embedded in that URL.

use async_trait::async_trait;
use std::path::Path;

pub mod config;
pub mod s3;

pub use config::MediaStoreConfig;
pub use s3::S3MediaStore;

/// What kind of asset is being uploaded. Video uploads get a duration probe;
/// images do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Video,
    Image,
}

impl ResourceKind {
    /// Fallback extension when the staged file carries none.
    pub fn default_extension(&self) -> &'static str {
        match self {
            ResourceKind::Video => "mp4",
            ResourceKind::Image => "jpg",
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    /// Public URL the asset is served from.
    pub url: String,
    /// Probed duration for video assets; `None` for images or when the
    /// probe fails.
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("object storage call failed: {0}")]
    Storage(String),
    #[error("object storage call timed out: {0}")]
    Timeout(String),
    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<resilience::TimeoutError> for MediaStoreError {
    fn from(err: resilience::TimeoutError) -> Self {
        match err {
            resilience::TimeoutError::Elapsed(_) => MediaStoreError::Timeout(err.to_string()),
            resilience::TimeoutError::OperationFailed(msg) => MediaStoreError::Storage(msg),
        }
    }
}

/// Abstraction over the media-hosting service.
///
/// `upload` must remove the staged local file on every outcome, success or
/// failure. `delete` must treat a missing asset as success.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(
        &self,
        local_path: &Path,
        kind: ResourceKind,
    ) -> Result<UploadedMedia, MediaStoreError>;

    async fn delete(&self, public_id: &str) -> Result<(), MediaStoreError>;
}

/// Derive the public id from a hosted URL: the final path segment minus its
/// extension. `https://cdn.vidra.dev/ab12.mp4` yields `ab12`.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let segment = url.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    let id = match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => segment,
    };
    Some(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_strips_extension() {
        assert_eq!(
            public_id_from_url("https://cdn.vidra.dev/ab12-cd34.mp4").as_deref(),
            Some("ab12-cd34")
        );
    }

    #[test]
    fn test_public_id_without_extension() {
        assert_eq!(
            public_id_from_url("https://cdn.vidra.dev/ab12-cd34").as_deref(),
            Some("ab12-cd34")
        );
    }

    #[test]
    fn test_public_id_only_strips_last_extension() {
        assert_eq!(
            public_id_from_url("https://cdn.vidra.dev/clip.final.mp4").as_deref(),
            Some("clip.final")
        );
    }

    #[test]
    fn test_public_id_rejects_trailing_slash() {
        assert_eq!(public_id_from_url("https://cdn.vidra.dev/"), None);
    }

    #[test]
    fn test_default_extensions() {
        assert_eq!(ResourceKind::Video.default_extension(), "mp4");
        assert_eq!(ResourceKind::Image.default_extension(), "jpg");
    }
}
