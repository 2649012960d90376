/// Toggle Engine
///
/// Likes and subscriptions share one semantics: look up the relation row,
/// delete it if present, create it otherwise. The lookup-and-mutate pair is
/// serialized per `(actor, target, kind)` key with a transaction-scoped
/// advisory lock, so concurrent toggles on the same key queue instead of
/// racing; the unique constraints on the relation tables are the backstop.
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{Like, LikeTargetKind, Subscription, ToggleOutcome};

#[derive(Clone)]
pub struct ToggleService {
    pool: PgPool,
    users: UserRepository,
}

impl ToggleService {
    pub fn new(pool: PgPool) -> Self {
        let users = UserRepository::new(pool.clone());
        Self { pool, users }
    }

    /// Flip a like on a video, comment or tweet. Fails with `NotFound` when
    /// the target does not exist; a failed toggle never creates a row.
    pub async fn toggle_like(
        &self,
        actor_id: Uuid,
        kind: LikeTargetKind,
        target_id: Uuid,
    ) -> Result<ToggleOutcome<Like>> {
        self.ensure_target_exists(kind, target_id).await?;

        let key = format!("like:{actor_id}:{}:{target_id}", kind.as_str());
        let mut tx = self.pool.begin().await?;
        acquire_toggle_lock(&mut tx, &key).await?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM likes
            WHERE user_id = $1 AND target_kind = $2 AND target_id = $3
            "#,
        )
        .bind(actor_id)
        .bind(kind.as_str())
        .bind(target_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some(like_id) => {
                sqlx::query("DELETE FROM likes WHERE id = $1")
                    .bind(like_id)
                    .execute(&mut *tx)
                    .await?;
                ToggleOutcome::removed()
            }
            None => {
                let like = sqlx::query_as::<_, Like>(
                    r#"
                    INSERT INTO likes (id, user_id, target_kind, target_id, created_at)
                    VALUES ($1, $2, $3, $4, NOW())
                    RETURNING id, user_id, target_kind, target_id, created_at
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(actor_id)
                .bind(kind.as_str())
                .bind(target_id)
                .fetch_one(&mut *tx)
                .await?;
                ToggleOutcome::added(like)
            }
        };

        tx.commit().await?;
        debug!(actor = %actor_id, target = %target_id, kind = kind.as_str(), state = ?outcome.state, "like toggled");
        Ok(outcome)
    }

    /// Flip a subscription to a channel. The channel must exist in the
    /// identity projection.
    pub async fn toggle_subscription(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<ToggleOutcome<Subscription>> {
        if !self.users.exists(channel_id).await? {
            return Err(AppError::NotFound(format!("channel {channel_id} not found")));
        }

        let key = format!("sub:{subscriber_id}:{channel_id}");
        let mut tx = self.pool.begin().await?;
        acquire_toggle_lock(&mut tx, &key).await?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM subscriptions
            WHERE subscriber_id = $1 AND channel_id = $2
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some(subscription_id) => {
                sqlx::query("DELETE FROM subscriptions WHERE id = $1")
                    .bind(subscription_id)
                    .execute(&mut *tx)
                    .await?;
                ToggleOutcome::removed()
            }
            None => {
                let subscription = sqlx::query_as::<_, Subscription>(
                    r#"
                    INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
                    VALUES ($1, $2, $3, NOW())
                    RETURNING id, subscriber_id, channel_id, created_at
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(subscriber_id)
                .bind(channel_id)
                .fetch_one(&mut *tx)
                .await?;
                ToggleOutcome::added(subscription)
            }
        };

        tx.commit().await?;
        debug!(subscriber = %subscriber_id, channel = %channel_id, state = ?outcome.state, "subscription toggled");
        Ok(outcome)
    }

    async fn ensure_target_exists(&self, kind: LikeTargetKind, target_id: Uuid) -> Result<()> {
        let query = match kind {
            LikeTargetKind::Video => {
                "SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1 AND deleted_at IS NULL)"
            }
            LikeTargetKind::Comment => "SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)",
            LikeTargetKind::Tweet => "SELECT EXISTS(SELECT 1 FROM tweets WHERE id = $1)",
        };

        let exists = sqlx::query_scalar::<_, bool>(query)
            .bind(target_id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "{} {target_id} not found",
                kind.as_str()
            )))
        }
    }
}

/// Transaction-scoped advisory lock on the toggle key. Released on commit
/// or rollback.
async fn acquire_toggle_lock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    key: &str,
) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
