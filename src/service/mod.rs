//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the database, the fetch cache and the upstream client.

mod ingest;
mod records;

pub use ingest::{FetchOutcome, FetchReport, IngestService};
pub use records::RecordService;
