/// Video endpoints: listing, detail, publish, update, delete, publish flag
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::path::PathBuf;
use validator::Validate;

use crate::error::Result;
use crate::handlers::{created, ok, parse_id};
use crate::middleware::UserId;
use crate::models::{ListParams, SortDirection, SortField};
use crate::services::videos::{PublishVideo, UpdateVideo};
use crate::services::VideoService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVideosQuery {
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListVideosQuery {
    fn into_params(self) -> Result<ListParams> {
        let defaults = ListParams::default();
        let sort = match self.sort_by.as_deref() {
            Some(raw) => SortField::parse(raw)?,
            None => defaults.sort,
        };
        let direction = match self.sort_type.as_deref() {
            Some(raw) => SortDirection::parse(raw)?,
            None => defaults.direction,
        };
        ListParams::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
            sort,
            direction,
        )
    }
}

/// Uploads enter the system as staged local file paths; multipart handling
/// is the upload gateway's concern.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishVideoRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub video_path: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub thumbnail_path: String,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub thumbnail_path: Option<String>,
}

/// GET /videos
pub async fn list_videos(
    service: web::Data<VideoService>,
    query: web::Query<ListVideosQuery>,
) -> Result<HttpResponse> {
    let params = query.into_inner().into_params()?;
    let page = service.list(params).await?;
    Ok(ok(page, "videos fetched"))
}

/// POST /videos
pub async fn publish_video(
    service: web::Data<VideoService>,
    user: UserId,
    body: web::Json<PublishVideoRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let video = service
        .publish(
            user.0,
            PublishVideo {
                title: body.title,
                description: body.description,
                video_path: PathBuf::from(body.video_path),
                thumbnail_path: PathBuf::from(body.thumbnail_path),
                is_published: body.is_published,
            },
        )
        .await?;

    Ok(created(video, "video published"))
}

/// GET /videos/{id}
pub async fn get_video(
    service: web::Data<VideoService>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let detail = service.get_detail(user.0, video_id).await?;
    Ok(ok(detail, "video fetched"))
}

/// PATCH /videos/{id}
pub async fn update_video(
    service: web::Data<VideoService>,
    user: UserId,
    path: web::Path<String>,
    body: web::Json<UpdateVideoRequest>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let body = body.into_inner();
    body.validate()?;

    let video = service
        .update(
            user.0,
            video_id,
            UpdateVideo {
                title: body.title,
                description: body.description,
                is_published: body.is_published,
                thumbnail_path: body.thumbnail_path.map(PathBuf::from),
            },
        )
        .await?;

    Ok(ok(video, "video updated"))
}

/// DELETE /videos/{id}
pub async fn delete_video(
    service: web::Data<VideoService>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    service.delete(user.0, video_id).await?;
    Ok(ok(serde_json::json!({}), "video deleted"))
}

/// PATCH /videos/{id}/publish
pub async fn toggle_publish(
    service: web::Data<VideoService>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let video = service.toggle_publish(user.0, video_id).await?;
    Ok(ok(video, "publish state toggled"))
}
