//! Stable record identifiers.

use uuid::Uuid;

/// Namespace for record identifiers (the RFC 4122 URL namespace).
pub const RECORD_NAMESPACE: Uuid = Uuid::NAMESPACE_URL;

/// Derive a record identifier from an upstream source id.
///
/// Name-based (v5) UUID of the id's string form. Depends on nothing else in
/// the entry, so edited titles or descriptions keep their identifier across
/// re-scrapes.
pub fn record_id(source_id: &str) -> String {
    Uuid::new_v5(&RECORD_NAMESPACE, source_id.as_bytes()).to_string()
}
