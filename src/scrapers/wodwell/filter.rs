//! Promotional entry filtering.

use crate::models::RawEntry;

/// Why an entry was classified as promotional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdKind {
    Direct,
    External,
}

/// Classify an entry as content (`None`) or promotional.
pub fn ad_kind(entry: &RawEntry) -> Option<AdKind> {
    if entry.has_ad_marker() {
        Some(AdKind::Direct)
    } else if entry.has_external_ad_marker() {
        Some(AdKind::External)
    } else {
        None
    }
}

/// Running count of filtered promotional entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdFilter {
    filtered: u64,
}

impl AdFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ad kind (and counts the entry) when it should be dropped.
    pub fn reject(&mut self, entry: &RawEntry) -> Option<AdKind> {
        let kind = ad_kind(entry)?;
        self.filtered += 1;
        Some(kind)
    }

    pub fn filtered(&self) -> u64 {
        self.filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: serde_json::Value) -> RawEntry {
        RawEntry::from_value(value).unwrap()
    }

    #[test]
    fn test_ad_kind() {
        assert_eq!(ad_kind(&entry(json!({"is_ad": true}))), Some(AdKind::Direct));
        assert_eq!(
            ad_kind(&entry(json!({"is_external_ad": 1}))),
            Some(AdKind::External)
        );
        assert_eq!(
            ad_kind(&entry(json!({"is_ad": 1, "is_external_ad": 1}))),
            Some(AdKind::Direct)
        );
        assert_eq!(ad_kind(&entry(json!({"wod_id": 3}))), None);
    }

    #[test]
    fn test_filter_counts_one_per_ad_entry() {
        let mut filter = AdFilter::new();
        assert_eq!(
            filter.reject(&entry(json!({"is_ad": true, "is_external_ad": true}))),
            Some(AdKind::Direct)
        );
        assert_eq!(
            filter.reject(&entry(json!({"is_external_ad": true}))),
            Some(AdKind::External)
        );
        assert_eq!(filter.reject(&entry(json!({"wod_id": 9, "title": "Helen"}))), None);
        assert_eq!(filter.filtered(), 2);
    }
}
