/// Comment endpoints; mutation requires authorship
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::db::{CommentRepository, VideoRepository};
use crate::error::{AppError, Result};
use crate::handlers::{created, ok, parse_id};
use crate::middleware::UserId;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub video_id: String,
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub content: String,
}

/// POST /comments
pub async fn create_comment(
    comments: web::Data<CommentRepository>,
    videos: web::Data<VideoRepository>,
    user: UserId,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;
    let video_id = parse_id(&body.video_id, "video")?;

    if !videos.exists(video_id).await? {
        return Err(AppError::NotFound(format!("video {video_id} not found")));
    }

    let comment = comments.insert(video_id, user.0, &body.content).await?;
    Ok(created(comment, "comment created"))
}

/// GET /comments/{id}
pub async fn get_comment(
    comments: web::Data<CommentRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&path, "comment")?;
    let comment = comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} not found")))?;
    Ok(ok(comment, "comment fetched"))
}

/// PATCH /comments/{id}
pub async fn update_comment(
    comments: web::Data<CommentRepository>,
    user: UserId,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&path, "comment")?;
    let body = body.into_inner();
    body.validate()?;

    require_author(&comments, comment_id, user.0).await?;
    let comment = comments.update_content(comment_id, &body.content).await?;
    Ok(ok(comment, "comment updated"))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    comments: web::Data<CommentRepository>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&path, "comment")?;
    require_author(&comments, comment_id, user.0).await?;
    comments.delete(comment_id).await?;
    Ok(ok(serde_json::json!({}), "comment deleted"))
}

async fn require_author(
    comments: &CommentRepository,
    comment_id: uuid::Uuid,
    actor_id: uuid::Uuid,
) -> Result<()> {
    let comment = comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} not found")))?;
    if comment.author_id != actor_id {
        return Err(AppError::Unauthorized(
            "only the author may modify this comment".to_string(),
        ));
    }
    Ok(())
}
