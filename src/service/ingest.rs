//! Ingest service
//!
//! Cache-gated refresh: pulls every configured financial year from
//! data.gov.in and appends the records to the store.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::data::{Database, FetchCache};
use crate::error::AppError;
use crate::upstream::DataGovClient;

/// Result of a completed refresh
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    /// Records written across all years
    pub total: u64,
    /// Years skipped because the upstream request failed
    pub failed_years: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// What `fetch_and_store` did
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The cache was fresh; nothing was fetched or written
    Cached { fetched_at: DateTime<Utc> },
    /// The full pipeline ran
    Fetched(FetchReport),
}

impl FetchOutcome {
    pub fn is_cached(&self) -> bool {
        matches!(self, FetchOutcome::Cached { .. })
    }
}

/// Ingest service
pub struct IngestService {
    db: Arc<Database>,
    client: DataGovClient,
    cache: Arc<FetchCache>,
    years: Vec<String>,
    /// Held for the whole check-fetch-store sequence
    fetch_lock: Mutex<()>,
}

impl IngestService {
    /// Create new ingest service
    ///
    /// # Arguments
    /// * `years` - Financial years to fetch, in order
    pub fn new(
        db: Arc<Database>,
        client: DataGovClient,
        cache: Arc<FetchCache>,
        years: Vec<String>,
    ) -> Self {
        Self {
            db,
            client,
            cache,
            years,
            fetch_lock: Mutex::new(()),
        }
    }

    /// Refresh the store unless the cache is still fresh
    ///
    /// Concurrent callers queue on an internal mutex; whoever runs second
    /// sees the cache the first one just filled and returns `Cached`.
    ///
    /// # Steps
    /// 1. Return `Cached` if the last refresh is inside the staleness window
    /// 2. For each year: fetch, skip on failure, insert in one transaction
    /// 3. Overwrite the cache with this run's records, even if all years failed
    ///
    /// # Errors
    /// Store failures abort the refresh and leave the cache untouched.
    pub async fn fetch_and_store(&self) -> Result<FetchOutcome, AppError> {
        let _guard = self.fetch_lock.lock().await;

        if self.cache.is_valid().await {
            if let Some(fetched_at) = self.cache.fetched_at().await {
                tracing::info!(%fetched_at, "Using cached MGNREGA data");
                crate::metrics::FETCH_CACHE_HITS_TOTAL.inc();
                return Ok(FetchOutcome::Cached { fetched_at });
            }
        }
        crate::metrics::FETCH_CACHE_MISSES_TOTAL.inc();

        tracing::info!(
            years = self.years.len(),
            upstream = %self.client.base_url(),
            "Fetching fresh data from data.gov.in"
        );

        let mut total = 0;
        let mut failed_years = Vec::new();
        let mut all_records = Vec::new();

        for year in &self.years {
            let fetched = match self.client.fetch_year(year).await {
                Ok(fetched) => fetched,
                Err(error) => {
                    tracing::warn!(fin_year = %year, %error, "Skipping financial year");
                    crate::metrics::UPSTREAM_YEARS_SKIPPED_TOTAL.inc();
                    failed_years.push(year.clone());
                    continue;
                }
            };

            let inserted = self.db.insert_year(&fetched.records).await?;
            total += inserted;
            crate::metrics::RECORDS_INGESTED_TOTAL.inc_by(inserted);

            tracing::info!(
                fin_year = %year,
                inserted,
                total,
                pages = fetched.pages,
                malformed_values = fetched.malformed_values,
                "Financial year stored"
            );

            all_records.extend(fetched.records);
        }

        let fetched_at = Utc::now();
        self.cache.store(all_records, fetched_at).await;

        if failed_years.is_empty() {
            tracing::info!(total, "Refresh complete");
        } else {
            tracing::warn!(total, failed = ?failed_years, "Refresh complete with skipped years");
        }

        Ok(FetchOutcome::Fetched(FetchReport {
            total,
            failed_years,
            fetched_at,
        }))
    }
}
