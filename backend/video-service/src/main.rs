use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use db_pool::{create_pool, DbConfig};
use media_store::{MediaStore, MediaStoreConfig, S3MediaStore};
use video_service::config::Config;
use video_service::db::{
    CommentRepository, LikeRepository, SubscriptionRepository, TweetRepository, UserRepository,
    VideoRepository, WatchHistoryRepository,
};
use video_service::handlers;
use video_service::jobs::purge;
use video_service::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use video_service::services::{HistoryService, ToggleService, VideoService};

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("🔧 Starting video-service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "✅ Configuration loaded: env={}, port={}, history_limit={}",
        config.app.env, config.app.port, config.history.limit
    );

    // Initialize database pool
    let db_config = DbConfig::from_env("video-service")
        .map_err(|e| anyhow::anyhow!("Failed to load database config: {e}"))?;
    db_config.log_config();
    let pool = create_pool(db_config)
        .await
        .context("Failed to create database pool")?;
    info!("✅ Database pool created and verified");

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("✅ Database migrations completed");

    // Initialize media store adapter
    let store: Arc<dyn MediaStore> =
        Arc::new(S3MediaStore::new(MediaStoreConfig::from_env()).await);
    info!("✅ Media store adapter initialized");

    // Build services
    let history_service = HistoryService::new(
        WatchHistoryRepository::new(pool.clone()),
        config.history.limit,
    );
    let video_service = VideoService::new(pool.clone(), history_service.clone(), store.clone());
    let toggle_service = ToggleService::new(pool.clone());
    let video_repo = VideoRepository::new(pool.clone());
    let like_repo = LikeRepository::new(pool.clone());
    let subscription_repo = SubscriptionRepository::new(pool.clone());
    let comment_repo = CommentRepository::new(pool.clone());
    let tweet_repo = TweetRepository::new(pool.clone());
    let user_repo = UserRepository::new(pool.clone());

    // Start purge worker for soft-deleted videos
    tokio::spawn(purge::start_purge_worker(pool.clone(), store.clone()));
    info!("✅ Purge worker started");

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!("🚀 HTTP server listening on http://{}", bind_address);

    let jwt_secret = config.auth.jwt_secret.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(video_service.clone()))
            .app_data(web::Data::new(toggle_service.clone()))
            .app_data(web::Data::new(history_service.clone()))
            .app_data(web::Data::new(video_repo.clone()))
            .app_data(web::Data::new(like_repo.clone()))
            .app_data(web::Data::new(subscription_repo.clone()))
            .app_data(web::Data::new(comment_repo.clone()))
            .app_data(web::Data::new(tweet_repo.clone()))
            .app_data(web::Data::new(user_repo.clone()))
            .route(
                "/health",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
                }),
            )
            .route(
                "/health/ready",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/health/live",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware::new(&jwt_secret))
                    .wrap(MetricsMiddleware)
                    .service(
                        web::scope("/videos")
                            .route("", web::get().to(handlers::videos::list_videos))
                            .route("", web::post().to(handlers::videos::publish_video))
                            .route("/{id}", web::get().to(handlers::videos::get_video))
                            .route("/{id}", web::patch().to(handlers::videos::update_video))
                            .route("/{id}", web::delete().to(handlers::videos::delete_video))
                            .route(
                                "/{id}/publish",
                                web::patch().to(handlers::videos::toggle_publish),
                            )
                            .route("/{id}/likes", web::get().to(handlers::likes::video_like_count)),
                    )
                    .service(
                        web::scope("/likes")
                            .route("/videos", web::get().to(handlers::likes::liked_videos))
                            .route(
                                "/videos/{id}",
                                web::post().to(handlers::likes::toggle_video_like),
                            )
                            .route(
                                "/comments/{id}",
                                web::post().to(handlers::likes::toggle_comment_like),
                            )
                            .route(
                                "/tweets/{id}",
                                web::post().to(handlers::likes::toggle_tweet_like),
                            ),
                    )
                    .route(
                        "/subscriptions/{channel_id}",
                        web::post().to(handlers::subscriptions::toggle_subscription),
                    )
                    .route(
                        "/channels/{id}/subscribers",
                        web::get().to(handlers::subscriptions::channel_subscribers),
                    )
                    .route(
                        "/users/{id}/subscriptions",
                        web::get().to(handlers::subscriptions::user_subscriptions),
                    )
                    .route("/history", web::get().to(handlers::history::get_history))
                    .service(
                        web::scope("/comments")
                            .route("", web::post().to(handlers::comments::create_comment))
                            .route("/{id}", web::get().to(handlers::comments::get_comment))
                            .route("/{id}", web::patch().to(handlers::comments::update_comment))
                            .route(
                                "/{id}",
                                web::delete().to(handlers::comments::delete_comment),
                            ),
                    )
                    .service(
                        web::scope("/tweets")
                            .route("", web::post().to(handlers::tweets::create_tweet))
                            .route("/{id}", web::get().to(handlers::tweets::get_tweet))
                            .route("/{id}", web::patch().to(handlers::tweets::update_tweet))
                            .route("/{id}", web::delete().to(handlers::tweets::delete_tweet)),
                    ),
            )
    })
    .bind(&bind_address)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("🛑 video-service shutting down");
    Ok(())
}
