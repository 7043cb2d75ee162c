//! MGNREGA - Tamil Nadu rural employment statistics backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - GET /, POST /fetch_tn_data, GET /get_data                 │
//! │  - /health, /metrics                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Cache-gated ingest from data.gov.in                       │
//! │  - Filtered district queries                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │          Data Layer          │ │         Upstream           │
//! │  - SQLite (sqlx)             │ │  - data.gov.in client      │
//! │  - Fetch staleness cache     │ │  - Record mapping          │
//! └──────────────────────────────┘ └────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Business logic layer
//! - `upstream`: data.gov.in client
//! - `data`: Database and cache layer
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod upstream;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like database pool, the fetch cache, and services.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Staleness cache for `POST /fetch_tn_data`
    pub fetch_cache: Arc<data::FetchCache>,

    /// Fetch-and-store pipeline
    pub ingest: Arc<service::IngestService>,

    /// Read side for `GET /get_data`
    pub records: Arc<service::RecordService>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database (creating the table if needed)
    /// 2. Initialize the fetch cache
    /// 3. Build the HTTP client and data.gov.in client
    /// 4. Wire services
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to SQLite database
        let db = Arc::new(data::Database::connect(&config.database.path).await?);
        tracing::info!("Database connected");

        // 2. Initialize cache
        let fetch_cache = Arc::new(data::FetchCache::new(config.cache_ttl()));
        tracing::info!(
            ttl_seconds = config.cache.ttl_seconds,
            "Fetch cache initialized"
        );

        // 3. Initialize HTTP client
        let mut http_builder = reqwest::Client::builder().user_agent("mgnrega-backend/0.1.0");
        if let Some(timeout) = config.upstream.timeout() {
            http_builder = http_builder.timeout(timeout);
        }
        let http_client = http_builder
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;
        let upstream = upstream::DataGovClient::new(http_client, &config.upstream);

        // 4. Wire services
        let ingest = Arc::new(service::IngestService::new(
            db.clone(),
            upstream,
            fetch_cache.clone(),
            config.upstream.years.clone(),
        ));
        let records = Arc::new(service::RecordService::new(db.clone()));

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db,
            fetch_cache,
            ingest,
            records,
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.cors);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::mgnrega_router())
        .with_state(state)
        .merge(api::metrics_router())
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
}

/// CORS for the configured frontend origins, with credentials
///
/// Methods and headers are mirrored from the preflight request because
/// wildcards are not allowed together with credentials.
fn build_cors_layer(cors: &config::CorsConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%error, %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> error::AppError {
    error::AppError::NotFound
}
