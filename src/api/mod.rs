//! API layer
//!
//! HTTP handlers for:
//! - MGNREGA data endpoints
//! - Metrics (Prometheus)

mod dto;
mod mgnrega;
pub mod metrics;

pub use dto::*;

pub use metrics::metrics_router;
pub use mgnrega::mgnrega_router;
