/// Tweet endpoints; mutation requires authorship
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::db::TweetRepository;
use crate::error::{AppError, Result};
use crate::handlers::{created, ok, parse_id};
use crate::middleware::UserId;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTweetRequest {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTweetRequest {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub content: String,
}

/// POST /tweets
pub async fn create_tweet(
    tweets: web::Data<TweetRepository>,
    user: UserId,
    body: web::Json<CreateTweetRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;
    let tweet = tweets.insert(user.0, &body.content).await?;
    Ok(created(tweet, "tweet created"))
}

/// GET /tweets/{id}
pub async fn get_tweet(
    tweets: web::Data<TweetRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&path, "tweet")?;
    let tweet = tweets
        .find_by_id(tweet_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tweet {tweet_id} not found")))?;
    Ok(ok(tweet, "tweet fetched"))
}

/// PATCH /tweets/{id}
pub async fn update_tweet(
    tweets: web::Data<TweetRepository>,
    user: UserId,
    path: web::Path<String>,
    body: web::Json<UpdateTweetRequest>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&path, "tweet")?;
    let body = body.into_inner();
    body.validate()?;

    require_author(&tweets, tweet_id, user.0).await?;
    let tweet = tweets.update_content(tweet_id, &body.content).await?;
    Ok(ok(tweet, "tweet updated"))
}

/// DELETE /tweets/{id}
pub async fn delete_tweet(
    tweets: web::Data<TweetRepository>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&path, "tweet")?;
    require_author(&tweets, tweet_id, user.0).await?;
    tweets.delete(tweet_id).await?;
    Ok(ok(serde_json::json!({}), "tweet deleted"))
}

async fn require_author(
    tweets: &TweetRepository,
    tweet_id: uuid::Uuid,
    actor_id: uuid::Uuid,
) -> Result<()> {
    let tweet = tweets
        .find_by_id(tweet_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tweet {tweet_id} not found")))?;
    if tweet.author_id != actor_id {
        return Err(AppError::Unauthorized(
            "only the author may modify this tweet".to_string(),
        ));
    }
    Ok(())
}
