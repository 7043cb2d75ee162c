//! Data layer module
//!
//! Handles all data persistence and caching:
//! - SQLite database operations
//! - Fetch staleness cache (volatile)

mod cache;
mod database;
mod models;

pub use cache::{CacheEntry, FetchCache};
pub use database::Database;
pub use models::*;
