/// Like endpoints: toggles for each target kind plus the read side
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::db::LikeRepository;
use crate::error::Result;
use crate::handlers::{ok, parse_id};
use crate::middleware::UserId;
use crate::models::{LikeTargetKind, LikedVideoPage, ListParams};
use crate::services::videos::total_pages;
use crate::services::ToggleService;

/// POST /likes/videos/{id}
pub async fn toggle_video_like(
    service: web::Data<ToggleService>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let target_id = parse_id(&path, "video")?;
    let outcome = service
        .toggle_like(user.0, LikeTargetKind::Video, target_id)
        .await?;
    Ok(ok(outcome, "like toggled"))
}

/// POST /likes/comments/{id}
pub async fn toggle_comment_like(
    service: web::Data<ToggleService>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let target_id = parse_id(&path, "comment")?;
    let outcome = service
        .toggle_like(user.0, LikeTargetKind::Comment, target_id)
        .await?;
    Ok(ok(outcome, "like toggled"))
}

/// POST /likes/tweets/{id}
pub async fn toggle_tweet_like(
    service: web::Data<ToggleService>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let target_id = parse_id(&path, "tweet")?;
    let outcome = service
        .toggle_like(user.0, LikeTargetKind::Tweet, target_id)
        .await?;
    Ok(ok(outcome, "like toggled"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideosQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /likes/videos - page of the caller's liked videos, newest like first
pub async fn liked_videos(
    likes: web::Data<LikeRepository>,
    user: UserId,
    query: web::Query<LikedVideosQuery>,
) -> Result<HttpResponse> {
    let defaults = ListParams::default();
    let params = ListParams::new(
        query.page.unwrap_or(defaults.page),
        query.limit.unwrap_or(defaults.limit),
        defaults.sort,
        defaults.direction,
    )?;
    let (videos, total) = likes.list_liked_videos(user.0, params).await?;
    let page = LikedVideoPage {
        videos,
        current_page: params.page,
        total_pages: total_pages(total, params.limit),
        total_videos: total,
    };
    Ok(ok(page, "liked videos fetched"))
}

/// GET /videos/{id}/likes
pub async fn video_like_count(
    likes: web::Data<LikeRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let count = likes
        .count_for_target(LikeTargetKind::Video, video_id)
        .await?;
    Ok(ok(
        serde_json::json!({ "videoId": video_id, "likeCount": count }),
        "like count fetched",
    ))
}
