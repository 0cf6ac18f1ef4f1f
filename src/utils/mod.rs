//! Shared utility functions.
//!
//! - `json`: dot-path lookup into response bodies
//! - `text`: description normalization
//! - `identity`: stable record identifiers
//! - `format`: human-readable durations for run reports

mod format;
mod identity;
pub(crate) mod json;
mod text;

pub use format::format_duration;
pub use identity::{record_id, RECORD_NAMESPACE};
pub use text::{normalize_description, LINE_BREAK_MARKER};
