//! Upstream statistics source
//!
//! Client for the data.gov.in resource API and the mapping of its loosely
//! typed records onto stored rows.

mod client;
mod record;

pub use client::{DataGovClient, YearFetch};
pub use record::{MalformedField, MappedRecord, MetricValue, map_record};
