/// Repository for Video rows, including the aggregation pipelines
///
/// Every read filters `deleted_at IS NULL`; soft-deleted rows are only
/// visible to the purge worker. The listing and detail queries join the
/// identity projection and tolerate a missing owner row.
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    ListParams, OwnerProfile, Video, VideoDetail, VideoListItem,
};

/// Fields for a new video row
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub is_published: bool,
}

/// Optional metadata changes; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct VideoListRow {
    id: Uuid,
    title: String,
    description: String,
    media_url: String,
    thumbnail_url: String,
    duration_seconds: f64,
    view_count: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    username: Option<String>,
    full_name: Option<String>,
    avatar_url: Option<String>,
}

impl VideoListRow {
    fn into_item(self) -> VideoListItem {
        let owner = match (self.username, self.full_name) {
            (Some(username), Some(full_name)) => Some(OwnerProfile {
                username,
                full_name,
                avatar_url: self.avatar_url,
            }),
            _ => None,
        };
        VideoListItem {
            id: self.id,
            title: self.title,
            description: self.description,
            media_url: self.media_url,
            thumbnail_url: self.thumbnail_url,
            duration_seconds: self.duration_seconds,
            view_count: self.view_count,
            created_at: self.created_at,
            owner,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VideoDetailRow {
    id: Uuid,
    title: String,
    description: String,
    media_url: String,
    thumbnail_url: String,
    duration_seconds: f64,
    view_count: i64,
    is_published: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    username: Option<String>,
    full_name: Option<String>,
    avatar_url: Option<String>,
    like_count: i64,
    subscriber_count: i64,
    is_liked: bool,
    is_subscribed: bool,
}

#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new: NewVideo) -> Result<Video, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (
                id, owner_id, title, description, media_url, thumbnail_url,
                duration_seconds, view_count, is_published, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, NOW(), NOW())
            RETURNING id, owner_id, title, description, media_url, thumbnail_url,
                      duration_seconds, view_count, is_published, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.owner_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.media_url)
        .bind(&new.thumbnail_url)
        .bind(new.duration_seconds)
        .bind(new.is_published)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, video_id: Uuid) -> Result<Option<Video>, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            r#"
            SELECT id, owner_id, title, description, media_url, thumbnail_url,
                   duration_seconds, view_count, is_published, created_at, updated_at
            FROM videos
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn exists(&self, video_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1 AND deleted_at IS NULL)
            "#,
        )
        .bind(video_id)
        .fetch_one(&self.pool)
        .await
    }

    /// COALESCE update of mutable metadata; the owner column is never
    /// touched after insert.
    pub async fn update_metadata(
        &self,
        video_id: Uuid,
        update: VideoUpdate,
    ) -> Result<Video, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_published = COALESCE($4, is_published),
                thumbnail_url = COALESCE($5, thumbnail_url),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, owner_id, title, description, media_url, thumbnail_url,
                      duration_seconds, view_count, is_published, created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.is_published)
        .bind(update.thumbnail_url)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn toggle_publish(&self, video_id: Uuid) -> Result<Video, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET is_published = NOT is_published, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, owner_id, title, description, media_url, thumbnail_url,
                      duration_seconds, view_count, is_published, created_at, updated_at
            "#,
        )
        .bind(video_id)
        .fetch_one(&self.pool)
        .await
    }

    /// View counter bump; returns rows affected so the caller can treat zero
    /// as `NotFound`.
    pub async fn increment_view_count(&self, video_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET view_count = view_count + 1
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(video_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Soft-delete a video together with its like rows and watch-history
    /// entries, all in one transaction. Media assets are reclaimed later by
    /// the purge worker.
    pub async fn soft_delete_with_relations(&self, video_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let affected = sqlx::query(
            r#"
            UPDATE videos
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(video_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            DELETE FROM likes WHERE target_kind = 'video' AND target_id = $1
            "#,
        )
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM watch_history WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Published-videos listing page plus total count.
    ///
    /// The sort column and direction come from whitelisted enums, never from
    /// raw input; `id` breaks ties so pages are stable.
    pub async fn list_published(
        &self,
        params: ListParams,
    ) -> Result<(Vec<VideoListItem>, i64), sqlx::Error> {
        let query = format!(
            r#"
            SELECT v.id, v.title, v.description, v.media_url, v.thumbnail_url,
                   v.duration_seconds, v.view_count, v.created_at,
                   u.username, u.full_name, u.avatar_url
            FROM videos v
            LEFT JOIN users u ON u.id = v.owner_id
            WHERE v.is_published AND v.deleted_at IS NULL
            ORDER BY v.{column} {direction}, v.id
            LIMIT $1 OFFSET $2
            "#,
            column = params.sort.as_column(),
            direction = params.direction.as_sql(),
        );

        let rows = sqlx::query_as::<_, VideoListRow>(&query)
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM videos
            WHERE is_published AND deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(VideoListRow::into_item).collect(), total))
    }

    /// Denormalized detail view for one viewer: owner projection, like and
    /// subscriber counts, and the viewer's own relation flags.
    pub async fn detail_for_viewer(
        &self,
        video_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Option<VideoDetail>, sqlx::Error> {
        let row = sqlx::query_as::<_, VideoDetailRow>(
            r#"
            SELECT v.id, v.title, v.description, v.media_url, v.thumbnail_url,
                   v.duration_seconds, v.view_count, v.is_published, v.created_at,
                   u.username, u.full_name, u.avatar_url,
                   (SELECT COUNT(*) FROM likes l
                    WHERE l.target_kind = 'video' AND l.target_id = v.id) AS like_count,
                   (SELECT COUNT(*) FROM subscriptions s
                    WHERE s.channel_id = v.owner_id) AS subscriber_count,
                   EXISTS(SELECT 1 FROM likes l
                          WHERE l.target_kind = 'video' AND l.target_id = v.id
                            AND l.user_id = $2) AS is_liked,
                   EXISTS(SELECT 1 FROM subscriptions s
                          WHERE s.channel_id = v.owner_id
                            AND s.subscriber_id = $2) AS is_subscribed
            FROM videos v
            LEFT JOIN users u ON u.id = v.owner_id
            WHERE v.id = $1 AND v.deleted_at IS NULL
            "#,
        )
        .bind(video_id)
        .bind(viewer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let owner = match (r.username, r.full_name) {
                (Some(username), Some(full_name)) => Some(OwnerProfile {
                    username,
                    full_name,
                    avatar_url: r.avatar_url,
                }),
                _ => None,
            };
            VideoDetail {
                id: r.id,
                title: r.title,
                description: r.description,
                media_url: r.media_url,
                thumbnail_url: r.thumbnail_url,
                duration_seconds: r.duration_seconds,
                view_count: r.view_count,
                is_published: r.is_published,
                created_at: r.created_at,
                owner,
                like_count: r.like_count,
                subscriber_count: r.subscriber_count,
                is_liked: r.is_liked,
                is_subscribed: r.is_subscribed,
            }
        }))
    }

    /// Soft-deleted rows awaiting purge, oldest first
    pub async fn list_soft_deleted(
        &self,
        batch_size: i64,
    ) -> Result<Vec<(Uuid, String, String)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (Uuid, String, String)>(
            r#"
            SELECT id, media_url, thumbnail_url
            FROM videos
            WHERE deleted_at IS NOT NULL
            ORDER BY deleted_at
            LIMIT $1
            "#,
        )
        .bind(batch_size)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Hard delete after assets are reclaimed; comments and history cascade
    pub async fn hard_delete(&self, video_id: Uuid) -> Result<bool, sqlx::Error> {
        let affected = sqlx::query(
            r#"
            DELETE FROM videos WHERE id = $1
            "#,
        )
        .bind(video_id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }
}
