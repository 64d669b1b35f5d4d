//! Pipeline step implementations.
//!
//! Each step handles one phase of the conversion pipeline, in order:
//! Inspect → Select → Extract → Convert → Remux.

mod convert;
mod extract;
mod inspect;
mod remux;
mod select;

pub use convert::ConvertStep;
pub use extract::ExtractStep;
pub use inspect::InspectStep;
pub use remux::RemuxStep;
pub use select::SelectStep;
