//! Common test utilities for E2E tests

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use mgnrega::{AppState, config};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Canned answer for one financial year
#[derive(Debug, Clone)]
pub enum MockYear {
    Records(Vec<Value>),
    Status(u16),
    /// 200 with this exact body, sent as JSON
    Body(String),
}

#[derive(Default)]
struct MockState {
    years: Mutex<HashMap<String, MockYear>>,
    requests: Mutex<Vec<HashMap<String, String>>>,
}

/// Stand-in for the data.gov.in resource API
///
/// Years without a canned answer return an empty `records` array.
pub struct MockUpstream {
    pub addr: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/resource/mgnrega", get(resource))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn resource_url(&self) -> String {
        format!("{}/resource/mgnrega", self.addr)
    }

    pub fn set_year(&self, fin_year: &str, answer: MockYear) {
        self.state
            .years
            .lock()
            .unwrap()
            .insert(fin_year.to_string(), answer);
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Query parameters of every request, in arrival order
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn resource(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let fin_year = params.get("filters[fin_year]").cloned().unwrap_or_default();
    state.requests.lock().unwrap().push(params);

    let answer = state.years.lock().unwrap().get(&fin_year).cloned();
    match answer {
        Some(MockYear::Status(code)) => {
            let status = StatusCode::from_u16(code).unwrap();
            (status, Json(json!({ "error": "mock failure" }))).into_response()
        }
        Some(MockYear::Records(records)) => Json(json!({
            "total": records.len(),
            "count": records.len(),
            "records": records,
        }))
        .into_response(),
        Some(MockYear::Body(body)) => {
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        None => Json(json!({ "total": 0, "count": 0, "records": [] })).into_response(),
    }
}

/// A district record as data.gov.in sends it (numbers as strings)
pub fn upstream_record(district: &str, fin_year: &str) -> Value {
    json!({
        "state_name": "TAMIL NADU",
        "district_name": district,
        "fin_year": fin_year,
        "month": "Dec",
        "Approved_Labour_Budget": "125000",
        "Average_Wage_rate_per_day_per_person": "281.5",
        "Average_days_of_employment_provided_per_Household": "48",
        "Total_Households_Worked": "61234",
        "Total_Individuals_Worked": "70311",
        "Total_Exp": "18234.77",
        "Wages": "15321.1",
        "Women_Persondays": "2300450",
    })
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub upstream: MockUpstream,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Test configuration pointing at `upstream` and a temporary database
pub fn test_config(temp_dir: &TempDir, upstream: &MockUpstream) -> config::AppConfig {
    let mut config = config::AppConfig::default();
    config.server.port = 0;
    config.database.path = temp_dir.path().join("test.db");
    config.upstream.base_url = upstream.resource_url();
    config.upstream.api_key = "test-api-key".to_string();
    config.upstream.timeout_seconds = Some(10);
    config
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        let upstream = MockUpstream::start().await;
        Self::with_upstream(upstream, |_| {}).await
    }

    /// Create a test server against a prepared upstream
    ///
    /// `configure` can adjust the configuration before startup.
    pub async fn with_upstream(
        upstream: MockUpstream,
        configure: impl FnOnce(&mut config::AppConfig),
    ) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir, &upstream);
        configure(&mut config);

        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = mgnrega::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            upstream,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST /fetch_tn_data and return the JSON body
    pub async fn fetch(&self) -> Value {
        let response = self
            .client
            .post(self.url("/fetch_tn_data"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    /// GET /get_data and return the JSON body
    pub async fn get_data(&self, state_name: &str, fin_year: Option<&str>) -> Value {
        let mut query = vec![("state_name", state_name)];
        if let Some(fin_year) = fin_year {
            query.push(("fin_year", fin_year));
        }

        let response = self
            .client
            .get(self.url("/get_data"))
            .query(&query)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}
