//! Integration tests: video flows
//!
//! Covers listing pagination, the detail read and its side effects, publish
//! compensation on upload failure, ownership guards on delete, and the
//! soft-delete plus purge-cycle reclaim path.
//!
//! Requires Postgres reachable via `DATABASE_URL`; run with `--ignored`.

mod common;

use common::{count_rows, insert_user, insert_video, reset_db, setup_pool, FakeMediaStore};
use media_store::MediaStore;
use serial_test::serial;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use video_service::db::WatchHistoryRepository;
use video_service::error::AppError;
use video_service::jobs::purge::run_purge_cycle;
use video_service::models::{LikeTargetKind, ListParams, SortDirection, SortField};
use video_service::services::{HistoryService, PublishVideo, ToggleService, VideoService};

fn build_service(pool: &PgPool, store: Arc<FakeMediaStore>) -> VideoService {
    let history = HistoryService::new(WatchHistoryRepository::new(pool.clone()), 100);
    VideoService::new(pool.clone(), history, store as Arc<dyn MediaStore>)
}

fn publish_input(title: &str) -> PublishVideo {
    PublishVideo {
        title: title.to_string(),
        description: "staged by test".to_string(),
        video_path: PathBuf::from("/tmp/staged-clip.mp4"),
        thumbnail_path: PathBuf::from("/tmp/staged-thumb.jpg"),
        is_published: None,
    }
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_listing_pagination_returns_stable_pages() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    for i in 1..=25 {
        insert_video(&pool, owner, &format!("video-{i:02}")).await;
    }

    let service = build_service(&pool, Arc::new(FakeMediaStore::new()));

    let params = ListParams::new(2, 10, SortField::Title, SortDirection::Asc).unwrap();
    let page = service.list(params).await.unwrap();

    assert_eq!(page.current_page, 2);
    assert_eq!(page.total_videos, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.videos.len(), 10);
    // Page 2 of a title-ascending sort is videos 11..=20
    assert_eq!(page.videos.first().unwrap().title, "video-11");
    assert_eq!(page.videos.last().unwrap().title, "video-20");

    let owner_profile = page.videos[0].owner.as_ref().expect("owner projected");
    assert_eq!(owner_profile.username, "owner");

    // Last page is the remainder
    let params = ListParams::new(3, 10, SortField::Title, SortDirection::Asc).unwrap();
    let page = service.list(params).await.unwrap();
    assert_eq!(page.videos.len(), 5);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_listing_skips_unpublished_and_deleted() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    insert_video(&pool, owner, "visible").await;
    let draft = insert_video(&pool, owner, "draft").await;
    let gone = insert_video(&pool, owner, "gone").await;

    sqlx::query("UPDATE videos SET is_published = FALSE WHERE id = $1")
        .bind(draft)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE videos SET deleted_at = NOW() WHERE id = $1")
        .bind(gone)
        .execute(&pool)
        .await
        .unwrap();

    let service = build_service(&pool, Arc::new(FakeMediaStore::new()));
    let page = service.list(ListParams::default()).await.unwrap();

    assert_eq!(page.total_videos, 1);
    assert_eq!(page.videos[0].title, "visible");
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_detail_bumps_view_count_and_records_history() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let video = insert_video(&pool, owner, "Watched once").await;

    let toggles = ToggleService::new(pool.clone());
    toggles
        .toggle_like(viewer, LikeTargetKind::Video, video)
        .await
        .unwrap();
    toggles.toggle_subscription(viewer, owner).await.unwrap();

    let service = build_service(&pool, Arc::new(FakeMediaStore::new()));
    let detail = service.get_detail(viewer, video).await.unwrap();

    assert_eq!(detail.id, video);
    assert_eq!(detail.view_count, 1);
    assert_eq!(detail.like_count, 1);
    assert_eq!(detail.subscriber_count, 1);
    assert!(detail.is_liked);
    assert!(detail.is_subscribed);
    assert_eq!(detail.owner.as_ref().unwrap().username, "owner");

    // The view landed in the viewer's history before the response
    assert_eq!(count_rows(&pool, "watch_history").await, 1);

    // A viewer with no relations sees the bare counts
    let stranger = insert_user(&pool, "stranger").await;
    let detail = service.get_detail(stranger, video).await.unwrap();
    assert_eq!(detail.view_count, 2);
    assert!(!detail.is_liked);
    assert!(!detail.is_subscribed);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_detail_of_missing_video_is_not_found() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let viewer = insert_user(&pool, "viewer").await;
    let service = build_service(&pool, Arc::new(FakeMediaStore::new()));

    let err = service
        .get_detail(viewer, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(count_rows(&pool, "watch_history").await, 0);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_publish_uploads_assets_then_inserts_row() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let store = Arc::new(FakeMediaStore::new());
    let service = build_service(&pool, store.clone());

    let video = service
        .publish(owner, publish_input("Fresh upload"))
        .await
        .unwrap();

    let uploads = store.uploaded_urls();
    assert_eq!(uploads.len(), 2);
    assert_eq!(video.media_url, uploads[0]);
    assert_eq!(video.thumbnail_url, uploads[1]);
    assert_eq!(video.duration_seconds, 12.5);
    assert!(video.is_published);
    assert_eq!(count_rows(&pool, "videos").await, 1);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_publish_aborts_before_db_write_when_video_upload_fails() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let store = Arc::new(FakeMediaStore::failing_uploads_after(0));
    let service = build_service(&pool, store.clone());

    let err = service
        .publish(owner, publish_input("Never lands"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DependencyFailure(_)));
    assert_eq!(count_rows(&pool, "videos").await, 0);
    assert!(store.deleted_ids().is_empty());
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_publish_reclaims_video_asset_when_thumbnail_fails() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let store = Arc::new(FakeMediaStore::failing_uploads_after(1));
    let service = build_service(&pool, store.clone());

    let err = service
        .publish(owner, publish_input("Half staged"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DependencyFailure(_)));
    assert_eq!(count_rows(&pool, "videos").await, 0);

    // The orphaned video asset was reclaimed
    let uploads = store.uploaded_urls();
    assert_eq!(uploads.len(), 1);
    let deletes = store.deleted_ids();
    assert_eq!(deletes.len(), 1);
    assert!(uploads[0].contains(&deletes[0]));
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_delete_requires_ownership() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let intruder = insert_user(&pool, "intruder").await;
    let video = insert_video(&pool, owner, "Protected").await;

    let service = build_service(&pool, Arc::new(FakeMediaStore::new()));
    let err = service.delete(intruder, video).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // Nothing was touched
    let deleted_at: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT deleted_at FROM videos WHERE id = $1")
            .bind(video)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(deleted_at.is_none());
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_delete_then_purge_reclaims_assets_and_row() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let store = Arc::new(FakeMediaStore::new());
    let service = build_service(&pool, store.clone());

    let video = service
        .publish(owner, publish_input("Short lived"))
        .await
        .unwrap();
    ToggleService::new(pool.clone())
        .toggle_like(viewer, LikeTargetKind::Video, video.id)
        .await
        .unwrap();
    service.get_detail(viewer, video.id).await.unwrap();

    service.delete(owner, video.id).await.unwrap();

    // Soft delete removed the row from every read path in one transaction
    assert_eq!(count_rows(&pool, "likes").await, 0);
    assert_eq!(count_rows(&pool, "watch_history").await, 0);
    let page = service.list(ListParams::default()).await.unwrap();
    assert_eq!(page.total_videos, 0);
    assert_eq!(count_rows(&pool, "videos").await, 1);

    // Purge cycle reclaims both assets then hard-deletes the row
    let purged = run_purge_cycle(&pool, store.as_ref()).await.unwrap();
    assert_eq!(purged, 1);
    assert_eq!(count_rows(&pool, "videos").await, 0);
    assert_eq!(store.deleted_ids().len(), 2);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_purge_keeps_row_when_asset_reclaim_fails() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let store = Arc::new(FakeMediaStore::new());
    let service = build_service(&pool, store.clone());

    let video = service
        .publish(owner, publish_input("Sticky assets"))
        .await
        .unwrap();
    service.delete(owner, video.id).await.unwrap();

    store.set_fail_deletes(true);
    let purged = run_purge_cycle(&pool, store.as_ref()).await.unwrap();
    assert_eq!(purged, 0);
    assert_eq!(count_rows(&pool, "videos").await, 1);

    // Next cycle succeeds once the store recovers
    store.set_fail_deletes(false);
    let purged = run_purge_cycle(&pool, store.as_ref()).await.unwrap();
    assert_eq!(purged, 1);
    assert_eq!(count_rows(&pool, "videos").await, 0);
}

#[tokio::test]
#[serial]
#[ignore] // requires a running Postgres
async fn test_toggle_publish_flips_flag_for_owner_only() {
    let pool = setup_pool().await;
    reset_db(&pool).await;

    let owner = insert_user(&pool, "owner").await;
    let intruder = insert_user(&pool, "intruder").await;
    let video = insert_video(&pool, owner, "Flippable").await;

    let service = build_service(&pool, Arc::new(FakeMediaStore::new()));

    let updated = service.toggle_publish(owner, video).await.unwrap();
    assert!(!updated.is_published);
    let updated = service.toggle_publish(owner, video).await.unwrap();
    assert!(updated.is_published);

    let err = service.toggle_publish(intruder, video).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}
