//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default data.gov.in resource holding district-wise MGNREGA statistics
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://api.data.gov.in/resource/ee03643a-ee4c-48c2-ac30-9f2ff26ab722";

/// Public data.gov.in key the dashboard has always shipped with
pub const DEFAULT_UPSTREAM_API_KEY: &str = "579b464db66ec23bdd0000012ebcd9f379884598719738fb876815ef";

/// Financial years fetched on every refresh, oldest first
pub const DEFAULT_FIN_YEARS: [&str; 7] = [
    "2018-2019",
    "2019-2020",
    "2020-2021",
    "2021-2022",
    "2022-2023",
    "2023-2024",
    "2024-2025",
];

/// Frontends allowed to call the API from a browser
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://mgnrega-frontend-nw6c.vercel.app",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8000)
    pub port: u16,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// data.gov.in client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Resource endpoint
    pub base_url: String,
    /// `api-key` query parameter
    pub api_key: String,
    /// Value sent as `filters[state_name]`
    pub state_name: String,
    /// Human readable state name used in responses
    pub state_label: String,
    /// Financial years to fetch, in order
    pub years: Vec<String>,
    /// `limit` query parameter (records per page)
    pub page_limit: u32,
    /// Pages to follow per year; 1 means a single request per year
    pub max_pages: u32,
    /// Per-request timeout. Unset means no timeout.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Fetch cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Staleness window in seconds (default: 21600 = 6h)
    pub ttl_seconds: u64,
}

/// Cross-origin configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                path: PathBuf::from("data/mgnrega.db"),
            },
            upstream: UpstreamConfig {
                base_url: DEFAULT_UPSTREAM_URL.to_string(),
                api_key: DEFAULT_UPSTREAM_API_KEY.to_string(),
                state_name: "TAMIL NADU".to_string(),
                state_label: "Tamil Nadu".to_string(),
                years: DEFAULT_FIN_YEARS.iter().map(|y| y.to_string()).collect(),
                page_limit: 1000,
                max_pages: 1,
                timeout_seconds: None,
            },
            cache: CacheConfig {
                ttl_seconds: 6 * 60 * 60,
            },
            cors: CorsConfig {
                allowed_origins: DEFAULT_ALLOWED_ORIGINS
                    .iter()
                    .map(|o| o.to_string())
                    .collect(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (MGNREGA__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let defaults = Self::default();

        let config = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default(
                "database.path",
                defaults.database.path.to_string_lossy().to_string(),
            )?
            .set_default("upstream.base_url", defaults.upstream.base_url)?
            .set_default("upstream.api_key", defaults.upstream.api_key)?
            .set_default("upstream.state_name", defaults.upstream.state_name)?
            .set_default("upstream.state_label", defaults.upstream.state_label)?
            .set_default("upstream.years", defaults.upstream.years)?
            .set_default("upstream.page_limit", defaults.upstream.page_limit as i64)?
            .set_default("upstream.max_pages", defaults.upstream.max_pages as i64)?
            .set_default("cache.ttl_seconds", defaults.cache.ttl_seconds as i64)?
            .set_default("cors.allowed_origins", defaults.cors.allowed_origins)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("MGNREGA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upstream.years")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Staleness window of the fetch cache
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache.ttl_seconds as i64)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        url::Url::parse(&self.upstream.base_url).map_err(|e| {
            AppError::Config(format!(
                "upstream.base_url is not a valid URL ({}): {}",
                self.upstream.base_url, e
            ))
        })?;

        if self.upstream.years.is_empty() {
            return Err(AppError::Config(
                "upstream.years must list at least one financial year".to_string(),
            ));
        }

        if self.upstream.page_limit == 0 {
            return Err(AppError::Config(
                "upstream.page_limit must be greater than 0".to_string(),
            ));
        }

        if self.upstream.max_pages == 0 {
            return Err(AppError::Config(
                "upstream.max_pages must be greater than 0".to_string(),
            ));
        }

        if self.cache.ttl_seconds == 0 {
            return Err(AppError::Config(
                "cache.ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("cors.allowed_origins is empty; browsers will be denied cross-origin access");
        }

        Ok(())
    }
}
