/// Subscription endpoints: the toggle plus channel/user listings
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::db::{SubscriptionRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::handlers::{ok, parse_id};
use crate::middleware::UserId;
use crate::models::MAX_PAGE_SIZE;
use crate::services::ToggleService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    fn bounds(&self) -> Result<(i64, i64)> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(MAX_PAGE_SIZE);
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
        Ok((limit, (page - 1) * limit))
    }
}

/// POST /subscriptions/{channel_id}
pub async fn toggle_subscription(
    service: web::Data<ToggleService>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&path, "channel")?;
    let outcome = service.toggle_subscription(user.0, channel_id).await?;
    Ok(ok(outcome, "subscription toggled"))
}

/// GET /channels/{id}/subscribers
pub async fn channel_subscribers(
    subscriptions: web::Data<SubscriptionRepository>,
    users: web::Data<UserRepository>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&path, "channel")?;
    let channel = users
        .find_by_id(channel_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("channel {channel_id} not found")))?;

    let (limit, offset) = query.bounds()?;
    let (subscribers, total) = subscriptions
        .subscribers_of_channel(channel_id, limit, offset)
        .await?;
    Ok(ok(
        serde_json::json!({
            "channel": channel,
            "subscribers": subscribers,
            "totalSubscribers": total,
        }),
        "subscribers fetched",
    ))
}

/// GET /users/{id}/subscriptions
pub async fn user_subscriptions(
    subscriptions: web::Data<SubscriptionRepository>,
    users: web::Data<UserRepository>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "user")?;
    if !users.exists(user_id).await? {
        return Err(AppError::NotFound(format!("user {user_id} not found")));
    }
    let (limit, offset) = query.bounds()?;
    let (channels, total) = subscriptions
        .channels_of_user(user_id, limit, offset)
        .await?;
    Ok(ok(
        serde_json::json!({ "channels": channels, "totalSubscriptions": total }),
        "subscriptions fetched",
    ))
}
