//! API request and response DTOs

use serde::{Deserialize, Serialize};

use crate::data::DistrictSummary;

/// `{ "message": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response of `POST /fetch_tn_data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub message: String,
    /// True when served from the staleness cache without any upstream call
    pub cached: bool,
}

/// Query string of `GET /get_data`
#[derive(Debug, Clone, Deserialize)]
pub struct GetDataQuery {
    pub state_name: Option<String>,
    /// Defaults to "All"
    pub fin_year: Option<String>,
}

/// Response of `GET /get_data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse {
    pub data: Vec<DistrictSummary>,
}
