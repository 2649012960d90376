/// Repository for Subscription rows and channel listings
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ChannelProfile;

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Subscriber count of a channel
    pub async fn count_for_channel(&self, channel_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM subscriptions
            WHERE channel_id = $1
            "#,
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Profiles of a channel's subscribers, newest first, with total.
    ///
    /// Joins the identity projection, so subscribers whose profile row has
    /// not been synced yet are omitted from the list but still counted.
    pub async fn subscribers_of_channel(
        &self,
        channel_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ChannelProfile>, i64), sqlx::Error> {
        let profiles = sqlx::query_as::<_, ChannelProfile>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_url, s.created_at AS since
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC, u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(channel_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_for_channel(channel_id).await?;
        Ok((profiles, total))
    }

    /// Profiles of the channels a user subscribes to, newest first, with
    /// total.
    pub async fn channels_of_user(
        &self,
        subscriber_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ChannelProfile>, i64), sqlx::Error> {
        let profiles = sqlx::query_as::<_, ChannelProfile>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_url, s.created_at AS since
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC, u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(subscriber_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM subscriptions
            WHERE subscriber_id = $1
            "#,
        )
        .bind(subscriber_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((profiles, total))
    }

    /// Check whether a subscriber follows a channel
    pub async fn check_subscribed(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
            )
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await
    }
}
