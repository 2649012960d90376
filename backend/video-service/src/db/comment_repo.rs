/// Repository for Comment rows
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Comment;

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        video_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, video_id, author_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, video_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(video_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, video_id, author_id, content, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_content(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, video_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    /// Delete a comment and the like rows pointing at it
    pub async fn delete(&self, comment_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM likes WHERE target_kind = 'comment' AND target_id = $1
            "#,
        )
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

        let affected = sqlx::query(
            r#"
            DELETE FROM comments WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(affected > 0)
    }
}
