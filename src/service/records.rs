//! Record query service

use std::sync::Arc;

use crate::data::{Database, DistrictSummary, RecordFilter};
use crate::error::AppError;

/// Read side over `district_data`
pub struct RecordService {
    db: Arc<Database>,
}

impl RecordService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// District summaries for a state, optionally restricted to one year
    ///
    /// # Arguments
    /// * `state_name` - Case-insensitive substring of the state name
    /// * `fin_year` - Exact financial year, or `"All"`/`None` for every year
    ///
    /// # Returns
    /// Matching rows in insertion order; empty when nothing matches
    pub async fn get(
        &self,
        state_name: &str,
        fin_year: Option<&str>,
    ) -> Result<Vec<DistrictSummary>, AppError> {
        let filter = RecordFilter::new(state_name, fin_year);
        let summaries = self.db.query_summaries(&filter).await?;

        tracing::debug!(
            state_name = ?filter.state_name,
            fin_year = ?filter.fin_year,
            rows = summaries.len(),
            "District data query"
        );

        Ok(summaries)
    }
}
