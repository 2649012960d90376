/// Repository for Like rows
///
/// Toggle mutations go through `ToggleService`, which serializes them per
/// key; this repository only covers the read side.
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    LikeTargetKind, LikedVideoEntry, ListParams, OwnerProfile, VideoListItem,
};

#[derive(Debug, sqlx::FromRow)]
struct LikedVideoRow {
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
    liked_at: chrono::DateTime<chrono::Utc>,
}

impl LikedVideoRow {
    fn into_entry(self) -> LikedVideoEntry {
        let owner = match (self.username, self.full_name) {
            (Some(username), Some(full_name)) => Some(OwnerProfile {
                username,
                full_name,
                avatar_url: self.avatar_url,
            }),
            _ => None,
        };
        LikedVideoEntry {
            video: VideoListItem {
                id: self.id,
                title: self.title,
                description: self.description,
                media_url: self.media_url,
                thumbnail_url: self.thumbnail_url,
                duration_seconds: self.duration_seconds,
                view_count: self.view_count,
                created_at: self.created_at,
                owner,
            },
            liked_at: self.liked_at,
        }
    }
}

#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user has liked a target
    pub async fn check_user_liked(
        &self,
        user_id: Uuid,
        kind: LikeTargetKind,
        target_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE user_id = $1 AND target_kind = $2 AND target_id = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(target_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Page of the videos a user has liked, newest like first, plus the
    /// total. Soft-deleted videos drop out even while their like rows are
    /// pending purge.
    pub async fn list_liked_videos(
        &self,
        user_id: Uuid,
        params: ListParams,
    ) -> Result<(Vec<LikedVideoEntry>, i64), sqlx::Error> {
        let rows = sqlx::query_as::<_, LikedVideoRow>(
            r#"
            SELECT v.id, v.title, v.description, v.media_url, v.thumbnail_url,
                   v.duration_seconds, v.view_count, v.created_at,
                   u.username, u.full_name, u.avatar_url,
                   l.created_at AS liked_at
            FROM likes l
            JOIN videos v ON v.id = l.target_id AND v.deleted_at IS NULL
            LEFT JOIN users u ON u.id = v.owner_id
            WHERE l.user_id = $1 AND l.target_kind = 'video'
            ORDER BY l.created_at DESC, l.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM likes l
            JOIN videos v ON v.id = l.target_id AND v.deleted_at IS NULL
            WHERE l.user_id = $1 AND l.target_kind = 'video'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(LikedVideoRow::into_entry).collect(), total))
    }

    /// Like count for a target
    pub async fn count_for_target(
        &self,
        kind: LikeTargetKind,
        target_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE target_kind = $1 AND target_id = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(target_id)
        .fetch_one(&self.pool)
        .await
    }
}
