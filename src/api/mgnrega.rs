//! MGNREGA endpoints
//!
//! - GET /
//! - POST /fetch_tn_data
//! - GET /get_data

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::{get, post},
};

use super::dto::{DataResponse, FetchResponse, GetDataQuery, MessageResponse};
use crate::AppState;
use crate::error::AppError;
use crate::service::FetchOutcome;

const CACHED_MESSAGE: &str = "Using cached data (from memory)";

/// Create MGNREGA router
///
/// Routes:
/// - GET / - Liveness marker
/// - POST /fetch_tn_data - Cache-gated refresh from data.gov.in
/// - GET /get_data - Stored district data for a state and year
pub fn mgnrega_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/fetch_tn_data", post(fetch_tn_data))
        .route("/get_data", get(get_data))
}

/// GET /
async fn home() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "MGNREGA Tamil Nadu backend active".to_string(),
    })
}

/// POST /fetch_tn_data
///
/// Returns 200 even when every year failed upstream; the message then
/// reports 0 records.
async fn fetch_tn_data(State(state): State<AppState>) -> Result<Json<FetchResponse>, AppError> {
    let outcome = state.ingest.fetch_and_store().await?;

    let response = match outcome {
        FetchOutcome::Cached { .. } => FetchResponse {
            message: CACHED_MESSAGE.to_string(),
            cached: true,
        },
        FetchOutcome::Fetched(report) => FetchResponse {
            message: format!(
                "{} {} records stored successfully",
                report.total, state.config.upstream.state_label
            ),
            cached: false,
        },
    };

    Ok(Json(response))
}

/// GET /get_data
///
/// Query: ?state_name=Tamil&fin_year=2023-2024 (fin_year defaults to "All")
async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<GetDataQuery>,
) -> Result<Json<DataResponse>, AppError> {
    let state_name = query
        .state_name
        .ok_or_else(|| AppError::Validation("state_name is required".to_string()))?;

    let data = state
        .records
        .get(&state_name, query.fin_year.as_deref())
        .await?;

    Ok(Json(DataResponse { data }))
}
