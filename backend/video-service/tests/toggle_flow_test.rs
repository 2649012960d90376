//! Integration tests: toggle engine
//!
//! Verifies the like/subscription toggle semantics against a real database:
//! - a toggle flips between added and removed
//! - a failed toggle (missing target) never creates a row
//! - concurrent toggles on the same key serialize instead of racing
//! - the liked-videos listing pages newest-first and skips deleted videos
//!
//! Requires Postgres reachable via `DATABASE_URL`; run with `--ignored`.

mod common;

use common::{count_rows, insert_user, insert_video, reset_db, setup_pool};
use serial_test::serial;
use uuid::Uuid;
use video_service::db::{LikeRepository, SubscriptionRepository};
use video_service::error::AppError;
use video_service::models::{LikeTargetKind, ListParams, SortDirection, SortField, ToggleState};
use video_service::services::ToggleService;

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_like_toggle_flips_between_added_and_removed() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let video = insert_video(&pool, owner, "First upload").await;

    let service = ToggleService::new(pool.clone());

    let outcome = service
        .toggle_like(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap();
    assert_eq!(outcome.state, ToggleState::Added);
    let like = outcome.record.expect("added toggle carries the row");
    assert_eq!(like.user_id, viewer);
    assert_eq!(like.target_id, video);
    assert_eq!(like.target_kind, "video");
    assert_eq!(count_rows(&pool, "likes").await, 1);

    let likes = LikeRepository::new(pool.clone());
    assert!(likes
        .check_user_liked(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap());
    assert_eq!(
        likes
            .count_for_target(LikeTargetKind::Video, video)
            .await
            .unwrap(),
        1
    );

    let outcome = service
        .toggle_like(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap();
    assert_eq!(outcome.state, ToggleState::Removed);
    assert!(outcome.record.is_none());
    assert!(!likes
        .check_user_liked(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap());
    assert_eq!(count_rows(&pool, "likes").await, 0);

    // Third toggle adds again
    let outcome = service
        .toggle_like(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap();
    assert_eq!(outcome.state, ToggleState::Added);
    assert_eq!(count_rows(&pool, "likes").await, 1);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_like_on_missing_target_creates_nothing() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let viewer = insert_user(&pool, "viewer").await;
    let service = ToggleService::new(pool.clone());

    let err = service
        .toggle_like(viewer, LikeTargetKind::Video, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(count_rows(&pool, "likes").await, 0);

    let err = service
        .toggle_like(viewer, LikeTargetKind::Comment, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(count_rows(&pool, "likes").await, 0);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_like_on_soft_deleted_video_is_not_found() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let video = insert_video(&pool, owner, "Gone soon").await;

    sqlx::query("UPDATE videos SET deleted_at = NOW() WHERE id = $1")
        .bind(video)
        .execute(&pool)
        .await
        .unwrap();

    let service = ToggleService::new(pool.clone());
    let err = service
        .toggle_like(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(count_rows(&pool, "likes").await, 0);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_same_user_likes_video_and_comment_independently() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let video = insert_video(&pool, owner, "With comment").await;

    let comment_id = Uuid::new_v4();
    sqlx::query("INSERT INTO comments (id, video_id, author_id, content) VALUES ($1, $2, $3, $4)")
        .bind(comment_id)
        .bind(video)
        .bind(owner)
        .bind("nice one")
        .execute(&pool)
        .await
        .unwrap();

    let service = ToggleService::new(pool.clone());
    service
        .toggle_like(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap();
    service
        .toggle_like(viewer, LikeTargetKind::Comment, comment_id)
        .await
        .unwrap();

    // Two distinct edges; removing one leaves the other
    assert_eq!(count_rows(&pool, "likes").await, 2);
    service
        .toggle_like(viewer, LikeTargetKind::Comment, comment_id)
        .await
        .unwrap();
    assert_eq!(count_rows(&pool, "likes").await, 1);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_concurrent_toggles_on_same_key_serialize() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let video = insert_video(&pool, owner, "Contended").await;

    let service = ToggleService::new(pool.clone());

    // 10 concurrent flips on one (actor, kind, target) key. The advisory
    // lock queues them; every call must succeed and an even number of flips
    // must land back at zero rows.
    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .toggle_like(viewer, LikeTargetKind::Video, video)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("toggle must not race");
    }

    assert_eq!(count_rows(&pool, "likes").await, 0);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_liked_videos_listing_pages_newest_first() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let first = insert_video(&pool, owner, "First").await;
    let second = insert_video(&pool, owner, "Second").await;
    let third = insert_video(&pool, owner, "Third").await;

    let service = ToggleService::new(pool.clone());
    for video in [first, second, third] {
        service
            .toggle_like(viewer, LikeTargetKind::Video, video)
            .await
            .unwrap();
        // distinct liked_at timestamps so the ordering is deterministic
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    // A comment like must not leak into the video listing
    let comment_id = Uuid::new_v4();
    sqlx::query("INSERT INTO comments (id, video_id, author_id, content) VALUES ($1, $2, $3, $4)")
        .bind(comment_id)
        .bind(first)
        .bind(owner)
        .bind("great")
        .execute(&pool)
        .await
        .unwrap();
    service
        .toggle_like(viewer, LikeTargetKind::Comment, comment_id)
        .await
        .unwrap();

    let likes = LikeRepository::new(pool.clone());
    let params = ListParams::new(1, 2, SortField::CreatedAt, SortDirection::Desc).unwrap();
    let (page, total) = likes.list_liked_videos(viewer, params).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].video.id, third);
    assert_eq!(page[1].video.id, second);
    assert!(page[0].liked_at > page[1].liked_at);
    let owner_profile = page[0].video.owner.as_ref().expect("owner projection");
    assert_eq!(owner_profile.username, "owner");

    let params = ListParams::new(2, 2, SortField::CreatedAt, SortDirection::Desc).unwrap();
    let (page, total) = likes.list_liked_videos(viewer, params).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].video.id, first);

    // Soft-deleted videos drop out even while the like row awaits purge
    sqlx::query("UPDATE videos SET deleted_at = NOW() WHERE id = $1")
        .bind(second)
        .execute(&pool)
        .await
        .unwrap();
    let params = ListParams::new(1, 10, SortField::CreatedAt, SortDirection::Desc).unwrap();
    let (page, total) = likes.list_liked_videos(viewer, params).await.unwrap();
    assert_eq!(total, 2);
    let ids: Vec<_> = page.iter().map(|entry| entry.video.id).collect();
    assert_eq!(ids, vec![third, first]);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_subscription_toggle_flips_and_checks_channel() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let subscriber = insert_user(&pool, "subscriber").await;
    let channel = insert_user(&pool, "channel").await;

    let service = ToggleService::new(pool.clone());

    let outcome = service
        .toggle_subscription(subscriber, channel)
        .await
        .unwrap();
    assert_eq!(outcome.state, ToggleState::Added);
    let subscription = outcome.record.unwrap();
    assert_eq!(subscription.subscriber_id, subscriber);
    assert_eq!(subscription.channel_id, channel);

    let subscriptions = SubscriptionRepository::new(pool.clone());
    assert!(subscriptions
        .check_subscribed(subscriber, channel)
        .await
        .unwrap());

    let outcome = service
        .toggle_subscription(subscriber, channel)
        .await
        .unwrap();
    assert_eq!(outcome.state, ToggleState::Removed);
    assert_eq!(count_rows(&pool, "subscriptions").await, 0);

    // Unknown channel never creates a row
    let err = service
        .toggle_subscription(subscriber, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(count_rows(&pool, "subscriptions").await, 0);
}
