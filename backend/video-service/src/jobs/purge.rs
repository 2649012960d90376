/// Purge worker: reclaims soft-deleted videos
///
/// Video delete is a soft delete; this worker walks the backlog in batches,
/// deletes each video's media and thumbnail assets through the adapter
/// (idempotent, so repeats are safe), then hard-deletes the row. An asset
/// failure leaves the row for the next cycle, which is the compensation for
/// partial reclaims.
use media_store::{public_id_from_url, MediaStore};
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::db::VideoRepository;

/// How often the purge cycle runs
pub const PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Rows processed per cycle
const BATCH_SIZE: i64 = 50;

pub async fn start_purge_worker(pool: PgPool, store: std::sync::Arc<dyn MediaStore>) {
    info!(
        interval_secs = PURGE_INTERVAL.as_secs(),
        batch_size = BATCH_SIZE,
        "starting purge worker"
    );

    loop {
        sleep(PURGE_INTERVAL).await;

        match run_purge_cycle(&pool, store.as_ref()).await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "purge cycle completed"),
            Err(e) => warn!(error = %e, "purge cycle failed"),
        }
    }
}

/// One pass over the soft-deleted backlog. Returns the number of rows hard
/// deleted; rows whose assets could not be reclaimed are left for the next
/// cycle.
pub async fn run_purge_cycle(pool: &PgPool, store: &dyn MediaStore) -> Result<u64, sqlx::Error> {
    let repo = VideoRepository::new(pool.clone());
    let batch = repo.list_soft_deleted(BATCH_SIZE).await?;

    let mut purged = 0u64;
    for (video_id, media_url, thumbnail_url) in batch {
        let mut assets_reclaimed = true;
        for url in [&media_url, &thumbnail_url] {
            let Some(public_id) = public_id_from_url(url) else {
                warn!(video_id = %video_id, %url, "could not derive public id, skipping asset");
                continue;
            };
            if let Err(e) = store.delete(&public_id).await {
                warn!(video_id = %video_id, %public_id, error = %e, "asset reclaim failed, row kept for next cycle");
                assets_reclaimed = false;
                break;
            }
        }

        if assets_reclaimed && repo.hard_delete(video_id).await? {
            purged += 1;
        }
    }

    Ok(purged)
}
