//! Container inspection and track extraction.

mod mkvextract;
mod probe;
mod types;

pub use mkvextract::{extract_payloads, extract_timecodes, read_delay_millis};
pub use probe::{catalog_for, parse_catalog};
pub use types::{ExtractionError, ExtractionResult};
