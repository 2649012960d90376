/// Domain entities and read views
///
/// Entities mirror table rows one to one. Read views are the denormalized
/// shapes the aggregation queries produce; they serialize camelCase to match
/// the wire contract.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Video entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub view_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Like entity - a directed edge from a user to one target
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Subscription entity - subscriber follows a channel (both users)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tweet entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row in the `users` projection of the identity service
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Which entity a like points at. Stored as TEXT in the `target_kind`
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTargetKind {
    Video,
    Comment,
    Tweet,
}

impl LikeTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeTargetKind::Video => "video",
            LikeTargetKind::Comment => "comment",
            LikeTargetKind::Tweet => "tweet",
        }
    }

}

/// Public subset of a user profile embedded in read views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// One entry of a video listing page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    /// Absent when the identity projection lacks the owner row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerProfile>,
}

/// A listing page plus pagination totals
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub videos: Vec<VideoListItem>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_videos: i64,
}

/// Denormalized single-video view for a specific viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub view_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerProfile>,
    pub like_count: i64,
    pub subscriber_count: i64,
    pub is_liked: bool,
    pub is_subscribed: bool,
}

/// Which state a toggle left the relation in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    Added,
    Removed,
}

/// Outcome of a toggle; carries the created row on `added`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome<T> {
    pub state: ToggleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<T>,
}

impl<T> ToggleOutcome<T> {
    pub fn added(record: T) -> Self {
        Self {
            state: ToggleState::Added,
            record: Some(record),
        }
    }

    pub fn removed() -> Self {
        Self {
            state: ToggleState::Removed,
            record: None,
        }
    }
}

/// Profile plus relation timestamp for subscriber/subscription listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub since: DateTime<Utc>,
}

/// One liked video with the moment the like was placed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoEntry {
    pub video: VideoListItem,
    pub liked_at: DateTime<Utc>,
}

/// A page of the caller's liked videos, most recent like first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoPage {
    pub videos: Vec<LikedVideoEntry>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_videos: i64,
}

/// One watch-history entry joined with its video
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub video: VideoListItem,
    pub watched_at: DateTime<Utc>,
}

/// Whitelisted listing sort fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    ViewCount,
    DurationSeconds,
    Title,
}

impl SortField {
    /// Column name interpolated into ORDER BY; only these values ever reach
    /// the query text.
    pub fn as_column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::ViewCount => "view_count",
            SortField::DurationSeconds => "duration_seconds",
            SortField::Title => "title",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "created_at" => Ok(SortField::CreatedAt),
            "view_count" => Ok(SortField::ViewCount),
            "duration_seconds" => Ok(SortField::DurationSeconds),
            "title" => Ok(SortField::Title),
            other => Err(AppError::InvalidArgument(format!(
                "unknown sort field: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::InvalidArgument(format!(
                "unknown sort direction: {other}"
            ))),
        }
    }
}

/// Validated pagination and sort parameters for the listing query
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub page: i64,
    pub limit: i64,
    pub sort: SortField,
    pub direction: SortDirection,
}

pub const MAX_PAGE_SIZE: i64 = 100;

impl ListParams {
    pub fn new(
        page: i64,
        limit: i64,
        sort: SortField,
        direction: SortDirection,
    ) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::InvalidArgument(format!(
                "page must be >= 1, got {page}"
            )));
        }
        if limit < 1 || limit > MAX_PAGE_SIZE {
            return Err(AppError::InvalidArgument(format!(
                "limit must be in 1..={MAX_PAGE_SIZE}, got {limit}"
            )));
        }
        Ok(Self {
            page,
            limit,
            sort,
            direction,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: MAX_PAGE_SIZE,
            sort: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_target_kind_column_values() {
        assert_eq!(LikeTargetKind::Video.as_str(), "video");
        assert_eq!(LikeTargetKind::Comment.as_str(), "comment");
        assert_eq!(LikeTargetKind::Tweet.as_str(), "tweet");
    }

    #[test]
    fn test_toggle_outcome_serialization() {
        let added = ToggleOutcome::added(serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&added).unwrap();
        assert_eq!(json["state"], "added");
        assert!(json.get("record").is_some());

        let removed: ToggleOutcome<serde_json::Value> = ToggleOutcome::removed();
        let json = serde_json::to_value(&removed).unwrap();
        assert_eq!(json["state"], "removed");
        assert!(json.get("record").is_none());
    }

    #[test]
    fn test_list_params_bounds() {
        assert!(ListParams::new(0, 10, SortField::CreatedAt, SortDirection::Desc).is_err());
        assert!(ListParams::new(1, 0, SortField::CreatedAt, SortDirection::Desc).is_err());
        assert!(ListParams::new(1, 101, SortField::CreatedAt, SortDirection::Desc).is_err());

        let params = ListParams::new(2, 10, SortField::CreatedAt, SortDirection::Desc).unwrap();
        assert_eq!(params.offset(), 10);
    }

    #[test]
    fn test_sort_field_whitelist() {
        assert_eq!(SortField::parse("view_count").unwrap().as_column(), "view_count");
        assert!(SortField::parse("owner_id; DROP TABLE videos").is_err());
        assert!(SortDirection::parse("sideways").is_err());
    }
}
