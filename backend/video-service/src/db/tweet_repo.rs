/// Repository for Tweet rows
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Tweet;

#[derive(Clone)]
pub struct TweetRepository {
    pool: PgPool,
}

impl TweetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, author_id: Uuid, content: &str) -> Result<Tweet, sqlx::Error> {
        sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (id, author_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, tweet_id: Uuid) -> Result<Option<Tweet>, sqlx::Error> {
        sqlx::query_as::<_, Tweet>(
            r#"
            SELECT id, author_id, content, created_at, updated_at
            FROM tweets
            WHERE id = $1
            "#,
        )
        .bind(tweet_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_content(
        &self,
        tweet_id: Uuid,
        content: &str,
    ) -> Result<Tweet, sqlx::Error> {
        sqlx::query_as::<_, Tweet>(
            r#"
            UPDATE tweets
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(tweet_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    /// Delete a tweet and the like rows pointing at it
    pub async fn delete(&self, tweet_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM likes WHERE target_kind = 'tweet' AND target_id = $1
            "#,
        )
        .bind(tweet_id)
        .execute(&mut *tx)
        .await?;

        let affected = sqlx::query(
            r#"
            DELETE FROM tweets WHERE id = $1
            "#,
        )
        .bind(tweet_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(affected > 0)
    }
}
