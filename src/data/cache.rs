//! In-memory fetch cache
//!
//! Volatile and cleared on restart. A single slot covers the whole
//! fetch operation: there is no key, only a timestamp and the records
//! produced by the last refresh.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::DistrictRecord;

/// Contents of the cache slot after a refresh
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// When the refresh finished
    pub fetched_at: DateTime<Utc>,
    /// Records produced by that refresh (not merged with earlier ones)
    pub records: Arc<Vec<DistrictRecord>>,
}

impl CacheEntry {
    fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Staleness cache gating `POST /fetch_tn_data`
///
/// Owned by `AppState` and handed to the ingest service, so tests can
/// build a fresh one per server instead of sharing process state.
pub struct FetchCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

impl FetchCache {
    /// Create an empty cache
    ///
    /// # Arguments
    /// * `ttl` - Staleness window (6 hours in production)
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Whether a refresh finished less than `ttl` ago
    pub async fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now()).await
    }

    /// Same as [`FetchCache::is_valid`] against an explicit clock
    pub async fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.slot
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| entry.is_fresh_at(now, self.ttl))
    }

    /// Overwrite the slot with the result of a refresh
    pub async fn store(&self, records: Vec<DistrictRecord>, fetched_at: DateTime<Utc>) {
        let count = records.len();
        *self.slot.write().await = Some(CacheEntry {
            fetched_at,
            records: Arc::new(records),
        });

        crate::metrics::FETCH_CACHE_SIZE.set(count as i64);
        tracing::debug!(records = count, %fetched_at, "Fetch cache updated");
    }

    /// Current slot contents, fresh or not
    pub async fn snapshot(&self) -> Option<CacheEntry> {
        self.slot.read().await.clone()
    }

    /// Timestamp of the last refresh
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.slot.read().await.as_ref().map(|entry| entry.fetched_at)
    }
}
