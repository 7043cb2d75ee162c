//! data.gov.in resource client
//!
//! One GET per financial year (more only when `max_pages > 1`), filtered
//! to the configured state. Failures are returned to the caller, which
//! decides whether to skip the year.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Instant;

use super::record::map_record;
use crate::config::UpstreamConfig;
use crate::data::DistrictRecord;
use crate::error::AppError;

/// One page of the resource API response
///
/// Only `records` is used; the API also sends paging metadata.
#[derive(Debug, Deserialize)]
struct ResourcePage {
    #[serde(default)]
    records: Option<Vec<Map<String, Value>>>,
}

/// Records fetched for one financial year
#[derive(Debug, Clone)]
pub struct YearFetch {
    pub records: Vec<DistrictRecord>,
    /// Numeric fields stored as 0.0 because they could not be parsed
    pub malformed_values: usize,
    /// Requests issued for this year
    pub pages: u32,
}

/// Client for the district-wise MGNREGA resource
#[derive(Debug, Clone)]
pub struct DataGovClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    state_name: String,
    page_limit: u32,
    max_pages: u32,
}

impl DataGovClient {
    /// Create a client from configuration
    ///
    /// # Arguments
    /// * `http_client` - Shared HTTP client (timeouts are configured there)
    /// * `config` - Upstream endpoint, key and filters
    pub fn new(http_client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http_client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            state_name: config.state_name.clone(),
            page_limit: config.page_limit,
            max_pages: config.max_pages,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every record of one financial year
    ///
    /// Pages are requested until one comes back short or `max_pages` is
    /// reached. Any failing page fails the whole year; nothing is salvaged.
    ///
    /// # Errors
    /// - `AppError::Upstream` on a non-200 status
    /// - `AppError::HttpClient` on transport or body decoding failure
    pub async fn fetch_year(&self, fin_year: &str) -> Result<YearFetch, AppError> {
        let mut records = Vec::new();
        let mut malformed_values = 0;
        let mut pages = 0;

        while pages < self.max_pages {
            let offset = pages as u64 * self.page_limit as u64;
            let page = self.fetch_page(fin_year, offset).await?;
            pages += 1;

            let page_len = page.len();
            for raw in &page {
                let mapped = map_record(raw, fin_year);
                for field in &mapped.malformed {
                    tracing::warn!(
                        fin_year,
                        field = field.field,
                        raw = %field.raw,
                        district = ?mapped.record.district_name,
                        "Unparseable numeric value stored as 0"
                    );
                }
                malformed_values += mapped.malformed.len();
                records.push(mapped.record);
            }

            if page_len < self.page_limit as usize {
                break;
            }
        }

        crate::metrics::MALFORMED_METRIC_VALUES_TOTAL.inc_by(malformed_values as u64);

        Ok(YearFetch {
            records,
            malformed_values,
            pages,
        })
    }

    async fn fetch_page(
        &self,
        fin_year: &str,
        offset: u64,
    ) -> Result<Vec<Map<String, Value>>, AppError> {
        let limit = self.page_limit.to_string();
        let mut query: Vec<(&str, String)> = vec![
            ("api-key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("limit", limit),
            ("filters[state_name]", self.state_name.clone()),
            ("filters[fin_year]", fin_year.to_string()),
        ];
        if offset > 0 {
            query.push(("offset", offset.to_string()));
        }

        let started = Instant::now();
        let result = self
            .http_client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await;
        crate::metrics::UPSTREAM_REQUEST_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                crate::metrics::UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&["error"])
                    .inc();
                return Err(error.into());
            }
        };

        let status = response.status();
        crate::metrics::UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[status.as_str()])
            .inc();

        if status != StatusCode::OK {
            return Err(AppError::Upstream(format!(
                "data.gov.in returned {} for {}",
                status, fin_year
            )));
        }

        let page: ResourcePage = response.json().await?;
        tracing::debug!(
            fin_year,
            offset,
            records = page.records.as_ref().map_or(0, Vec::len),
            "Fetched data.gov.in page"
        );

        Ok(page.records.unwrap_or_default())
    }
}
