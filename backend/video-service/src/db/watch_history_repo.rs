/// Repository for the per-user watch history
///
/// The `(user_id, video_id)` primary key is the dedupe guarantee: recording
/// a view is a single upsert that either inserts the entry or moves it to
/// the front by refreshing `watched_at`.
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{HistoryEntry, OwnerProfile, VideoListItem};

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    watched_at: DateTime<Utc>,
    id: Uuid,
    title: String,
    description: String,
    media_url: String,
    thumbnail_url: String,
    duration_seconds: f64,
    view_count: i64,
    created_at: DateTime<Utc>,
    username: Option<String>,
    full_name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Clone)]
pub struct WatchHistoryRepository {
    pool: PgPool,
}

impl WatchHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert the view, evict entries past `cap`, and return the surviving
    /// video ids most recent first. All three statements share a
    /// transaction.
    pub async fn record_view(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        cap: i64,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id, watched_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM watch_history
            WHERE user_id = $1 AND video_id IN (
                SELECT video_id FROM watch_history
                WHERE user_id = $1
                ORDER BY watched_at DESC
                OFFSET $2
            )
            "#,
        )
        .bind(user_id)
        .bind(cap)
        .execute(&mut *tx)
        .await?;

        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT video_id FROM watch_history
            WHERE user_id = $1
            ORDER BY watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ids)
    }

    /// History entries joined with their non-deleted videos and owner
    /// projections, most recent first
    pub async fn history_for_user(&self, user_id: Uuid) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT h.watched_at,
                   v.id, v.title, v.description, v.media_url, v.thumbnail_url,
                   v.duration_seconds, v.view_count, v.created_at,
                   u.username, u.full_name, u.avatar_url
            FROM watch_history h
            JOIN videos v ON v.id = h.video_id AND v.deleted_at IS NULL
            LEFT JOIN users u ON u.id = v.owner_id
            WHERE h.user_id = $1
            ORDER BY h.watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let owner = match (r.username, r.full_name) {
                    (Some(username), Some(full_name)) => Some(OwnerProfile {
                        username,
                        full_name,
                        avatar_url: r.avatar_url,
                    }),
                    _ => None,
                };
                HistoryEntry {
                    watched_at: r.watched_at,
                    video: VideoListItem {
                        id: r.id,
                        title: r.title,
                        description: r.description,
                        media_url: r.media_url,
                        thumbnail_url: r.thumbnail_url,
                        duration_seconds: r.duration_seconds,
                        view_count: r.view_count,
                        created_at: r.created_at,
                        owner,
                    },
                }
            })
            .collect())
    }
}
