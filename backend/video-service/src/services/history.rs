/// Watch-History Updater
///
/// Maintains the bounded, de-duplicated, most-recent-first list of viewed
/// videos per user. The cap resolves the unbounded-growth problem in the
/// original design: entries past `limit` are evicted oldest-first.
use uuid::Uuid;

use crate::db::WatchHistoryRepository;
use crate::error::Result;
use crate::models::HistoryEntry;

#[derive(Clone)]
pub struct HistoryService {
    repo: WatchHistoryRepository,
    limit: i64,
}

impl HistoryService {
    pub fn new(repo: WatchHistoryRepository, limit: u32) -> Self {
        Self {
            repo,
            limit: i64::from(limit),
        }
    }

    /// Record a view: de-duplicates, moves the entry to the front, trims to
    /// the cap. Returns the updated list of ids, most recent first.
    pub async fn record_view(&self, user_id: Uuid, video_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = self.repo.record_view(user_id, video_id, self.limit).await?;
        Ok(ids)
    }

    /// The viewer's history joined with the surviving videos
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<HistoryEntry>> {
        let entries = self.repo.history_for_user(user_id).await?;
        Ok(entries)
    }
}
