/// S3-backed implementation of the [`MediaStore`] trait
///
/// Keys are flat `{uuid}.{ext}` so the public id can be recovered from the
/// hosted URL. Every S3 call runs under the object-storage timeout preset;
/// deletes additionally get a bounded retry because they are idempotent.
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use resilience::{presets, with_retry, with_timeout_result};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{MediaStore, MediaStoreConfig, MediaStoreError, ResourceKind, UploadedMedia};

#[derive(Clone)]
pub struct S3MediaStore {
    client: Client,
    config: MediaStoreConfig,
}

impl S3MediaStore {
    /// Build the S3 client from the ambient AWS environment plus the media
    /// store configuration (endpoint override for MinIO-style stores).
    pub async fn new(config: MediaStoreConfig) -> Self {
        let aws_config = aws_config::load_from_env().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        Self { client, config }
    }

    #[cfg(test)]
    fn with_client(client: Client, config: MediaStoreConfig) -> Self {
        Self { client, config }
    }

    async fn put_object(&self, key: &str, local_path: &Path) -> Result<(), MediaStoreError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| MediaStoreError::Storage(format!("failed to read staged file: {e}")))?;

        with_timeout_result(
            self.config.request_timeout,
            self.client
                .put_object()
                .bucket(&self.config.bucket)
                .key(key)
                .content_type(content_type_for(key))
                .body(body)
                .send(),
        )
        .await?;

        Ok(())
    }

    async fn upload_inner(
        &self,
        local_path: &Path,
        kind: ResourceKind,
    ) -> Result<UploadedMedia, MediaStoreError> {
        let ext = local_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| kind.default_extension().to_string());
        let key = format!("{}.{}", Uuid::new_v4(), ext);

        // Probe before the upload while the staged file still exists.
        let duration_seconds = match kind {
            ResourceKind::Video => probe_duration(local_path).await,
            ResourceKind::Image => None,
        };

        self.put_object(&key, local_path).await?;

        Ok(UploadedMedia {
            url: self.config.cdn_url(&key),
            duration_seconds,
        })
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, MediaStoreError> {
        let listed = with_timeout_result(
            self.config.request_timeout,
            self.client
                .list_objects_v2()
                .bucket(&self.config.bucket)
                .prefix(prefix)
                .send(),
        )
        .await?;

        let keys: Vec<String> = listed
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|k| k.to_string()))
            .collect();

        for key in &keys {
            with_timeout_result(
                self.config.request_timeout,
                self.client
                    .delete_object()
                    .bucket(&self.config.bucket)
                    .key(key)
                    .send(),
            )
            .await?;
        }

        Ok(keys.len())
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(
        &self,
        local_path: &Path,
        kind: ResourceKind,
    ) -> Result<UploadedMedia, MediaStoreError> {
        let result = self.upload_inner(local_path, kind).await;

        // The staged file is removed on every outcome so a failed upload
        // cannot leave artifacts behind.
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %local_path.display(), error = %e, "failed to remove staged upload file");
            }
        }

        result
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaStoreError> {
        // The key is `{public_id}.{ext}` and the extension is not stored, so
        // deletion lists by prefix. Zero matches is success.
        let prefix = format!("{public_id}.");
        let retry = presets::object_storage_config()
            .retry
            .unwrap_or_default();

        let removed = with_retry(retry, || self.delete_by_prefix(&prefix))
            .await
            .map_err(|e| e.into_source())?;

        debug!(public_id, removed, "media asset delete completed");
        Ok(())
    }
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Best-effort duration probe via ffprobe. Any failure (missing binary,
/// unparseable output) yields `None`; a probe must never fail an upload.
async fn probe_duration(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_format",
            "-of",
            "json",
            path.to_string_lossy().as_ref(),
        ])
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        debug!(path = %path.display(), "ffprobe exited non-zero, skipping duration");
        return None;
    }

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
    json.get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_probe_duration_missing_file_is_none() {
        let duration = probe_duration(Path::new("/nonexistent/clip.mp4")).await;
        assert!(duration.is_none());
    }

    #[tokio::test]
    async fn test_upload_removes_staged_file_on_failure() {
        // Endpoint points nowhere, so the put fails; the staged file must
        // still be gone afterwards.
        let dir = std::env::temp_dir();
        let path = dir.join(format!("media-store-test-{}.jpg", Uuid::new_v4()));
        tokio::fs::write(&path, b"not a real jpeg").await.unwrap();

        let config = MediaStoreConfig {
            bucket: "test-bucket".to_string(),
            region: "us-east-1".to_string(),
            cdn_base_url: "https://cdn.test".to_string(),
            endpoint_url: Some("http://127.0.0.1:1".to_string()),
            request_timeout: std::time::Duration::from_secs(2),
        };
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new("us-east-1"))
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config);
        builder = builder
            .endpoint_url("http://127.0.0.1:1")
            .force_path_style(true);
        let store = S3MediaStore::with_client(Client::from_conf(builder.build()), config);

        let result = store.upload(&path, ResourceKind::Image).await;
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
