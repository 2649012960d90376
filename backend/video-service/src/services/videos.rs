/// Video flows: listing, detail, publish, update, delete, publish toggle
///
/// Orchestrates the repositories and the media store adapter. Upload
/// failures abort before any database write; asset deletes on cleanup paths
/// are best-effort and logged, never blocking the primary mutation.
use media_store::{public_id_from_url, MediaStore, ResourceKind};
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{NewVideo, VideoRepository, VideoUpdate};
use crate::error::{AppError, Result};
use crate::models::{ListParams, Video, VideoDetail, VideoPage};
use crate::services::HistoryService;

/// Staged input for a new video
#[derive(Debug, Clone)]
pub struct PublishVideo {
    pub title: String,
    pub description: String,
    pub video_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub is_published: Option<bool>,
}

/// Metadata changes plus an optional replacement thumbnail
#[derive(Debug, Clone, Default)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub thumbnail_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct VideoService {
    repo: VideoRepository,
    history: HistoryService,
    store: Arc<dyn MediaStore>,
}

impl VideoService {
    pub fn new(pool: PgPool, history: HistoryService, store: Arc<dyn MediaStore>) -> Self {
        Self {
            repo: VideoRepository::new(pool),
            history,
            store,
        }
    }

    /// Published-videos page with pagination totals
    pub async fn list(&self, params: ListParams) -> Result<VideoPage> {
        let (videos, total) = self.repo.list_published(params).await?;
        Ok(VideoPage {
            videos,
            current_page: params.page,
            total_pages: total_pages(total, params.limit),
            total_videos: total,
        })
    }

    /// Upload both assets, then insert the row. The video upload failing
    /// aborts before any database write; a thumbnail failure additionally
    /// reclaims the just-uploaded video asset.
    pub async fn publish(&self, owner_id: Uuid, input: PublishVideo) -> Result<Video> {
        let media = self
            .store
            .upload(&input.video_path, ResourceKind::Video)
            .await?;

        let thumbnail = match self
            .store
            .upload(&input.thumbnail_path, ResourceKind::Image)
            .await
        {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.reclaim_asset(&media.url).await;
                return Err(e.into());
            }
        };

        let video = self
            .repo
            .insert(NewVideo {
                owner_id,
                title: input.title,
                description: input.description,
                media_url: media.url,
                thumbnail_url: thumbnail.url,
                duration_seconds: media.duration_seconds.unwrap_or(0.0),
                is_published: input.is_published.unwrap_or(true),
            })
            .await?;

        info!(video_id = %video.id, owner = %owner_id, "video published");
        Ok(video)
    }

    /// Detail read with its side effects: the view-count bump is awaited and
    /// its failure surfaces (zero rows means the video is gone), and the
    /// view lands in the viewer's watch history before the response.
    pub async fn get_detail(&self, viewer_id: Uuid, video_id: Uuid) -> Result<VideoDetail> {
        let bumped = self.repo.increment_view_count(video_id).await?;
        if bumped == 0 {
            return Err(AppError::NotFound(format!("video {video_id} not found")));
        }

        let detail = self
            .repo
            .detail_for_viewer(video_id, viewer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("video {video_id} not found")))?;

        self.history.record_view(viewer_id, video_id).await?;

        Ok(detail)
    }

    /// Metadata update; a replacement thumbnail is uploaded first and the
    /// old asset reclaimed afterwards.
    pub async fn update(&self, actor_id: Uuid, video_id: Uuid, input: UpdateVideo) -> Result<Video> {
        let existing = self.require_owned(actor_id, video_id).await?;

        let new_thumbnail_url = match &input.thumbnail_path {
            Some(path) => Some(self.store.upload(path, ResourceKind::Image).await?.url),
            None => None,
        };

        let video = self
            .repo
            .update_metadata(
                video_id,
                VideoUpdate {
                    title: input.title,
                    description: input.description,
                    is_published: input.is_published,
                    thumbnail_url: new_thumbnail_url.clone(),
                },
            )
            .await?;

        if new_thumbnail_url.is_some() {
            self.reclaim_asset(&existing.thumbnail_url).await;
        }

        Ok(video)
    }

    /// Soft delete: one transaction removes the row from every read path
    /// (and its like/history rows); media assets are reclaimed
    /// asynchronously by the purge worker.
    pub async fn delete(&self, actor_id: Uuid, video_id: Uuid) -> Result<()> {
        self.require_owned(actor_id, video_id).await?;

        let deleted = self.repo.soft_delete_with_relations(video_id).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("video {video_id} not found")));
        }

        info!(video_id = %video_id, "video soft-deleted, assets scheduled for reclaim");
        Ok(())
    }

    /// Flip the publish flag
    pub async fn toggle_publish(&self, actor_id: Uuid, video_id: Uuid) -> Result<Video> {
        self.require_owned(actor_id, video_id).await?;
        let video = self.repo.toggle_publish(video_id).await?;
        Ok(video)
    }

    /// Fetch the video and confirm the actor owns it
    async fn require_owned(&self, actor_id: Uuid, video_id: Uuid) -> Result<Video> {
        let video = self
            .repo
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("video {video_id} not found")))?;

        if video.owner_id != actor_id {
            return Err(AppError::Unauthorized(
                "only the owner may modify this video".to_string(),
            ));
        }

        Ok(video)
    }

    /// Best-effort asset delete on a cleanup path; failures are logged and
    /// never abort the primary operation.
    async fn reclaim_asset(&self, url: &str) {
        let Some(public_id) = public_id_from_url(url) else {
            warn!(%url, "could not derive public id for asset cleanup");
            return;
        };
        if let Err(e) = self.store.delete(&public_id).await {
            warn!(%public_id, error = %e, "asset cleanup failed");
        }
    }
}

/// `ceil(total / limit)` in integer math
pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}
