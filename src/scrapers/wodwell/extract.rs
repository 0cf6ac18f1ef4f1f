//! Per-entry extraction: raw upstream entries to typed records.

use tracing::{debug, warn};

use super::filter::AdFilter;
use super::score_types::{classify, Classification};
use crate::models::entry::json_kind;
use crate::models::{PageResult, RawEntry, Record, ScoreTypesField, DATA_SOURCE};
use crate::utils::{normalize_description, record_id};

/// A locally recovered extraction problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionWarning {
    /// Score-type label outside the known vocabulary.
    UnknownScoreType { source_id: String, label: String },
    /// Score-type field that could not be read as markup.
    MalformedScoreTypes { source_id: String, detail: String },
    /// Response or entry structure that does not match the expected shape.
    UnexpectedShape { detail: String },
}

/// Output of extracting one page.
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Records in arrival order.
    pub records: Vec<Record>,
    /// Promotional entries dropped.
    pub ads: u64,
    pub warnings: Vec<ExtractionWarning>,
}

/// Extract all content entries of a page.
///
/// Promotional entries are dropped and counted. Entries that cannot yield an
/// identifier are skipped with a warning; every other problem degrades to a
/// default value on the affected field.
pub fn extract_page(page: &PageResult) -> PageExtraction {
    let mut out = PageExtraction::default();
    let mut filter = AdFilter::new();

    if let Some(ref detail) = page.shape_warning {
        warn!(page = page.page, detail = %detail, "Unexpected page shape");
        out.warnings.push(ExtractionWarning::UnexpectedShape {
            detail: detail.clone(),
        });
    }

    for (index, value) in page.entries.iter().enumerate() {
        let kind = json_kind(value);
        let entry = match RawEntry::from_value(value.clone()) {
            Some(entry) => entry,
            None => {
                let detail = format!("entry {} is {}, not an object", index, kind);
                warn!(page = page.page, detail = %detail, "Skipping entry");
                out.warnings
                    .push(ExtractionWarning::UnexpectedShape { detail });
                continue;
            }
        };

        if let Some(kind) = filter.reject(&entry) {
            debug!(page = page.page, index, kind = ?kind, "Filtered promotional entry");
            continue;
        }

        match extract_entry(&entry) {
            Ok((record, warnings)) => {
                for warning in &warnings {
                    log_warning(page.page, warning);
                }
                out.warnings.extend(warnings);
                out.records.push(record);
            }
            Err(warning) => {
                log_warning(page.page, &warning);
                out.warnings.push(warning);
            }
        }
    }

    out.ads = filter.filtered();
    out
}

/// Turn one non-promotional entry into a record.
///
/// Fails only when the entry has no usable source id.
pub fn extract_entry(
    entry: &RawEntry,
) -> Result<(Record, Vec<ExtractionWarning>), ExtractionWarning> {
    let source_id = entry
        .source_id()
        .ok_or_else(|| ExtractionWarning::UnexpectedShape {
            detail: "entry has no usable wod_id".to_string(),
        })?;

    let classification = classify_field(entry.score_types());

    let mut warnings = Vec::new();
    if let Some(detail) = classification.malformed {
        warnings.push(ExtractionWarning::MalformedScoreTypes {
            source_id: source_id.clone(),
            detail,
        });
    }
    for label in classification.unknown_labels {
        warnings.push(ExtractionWarning::UnknownScoreType {
            source_id: source_id.clone(),
            label,
        });
    }

    let record = Record {
        id: record_id(&source_id),
        title: entry.title().cloned(),
        facets: classification.facets,
        description: normalize_description(entry.workout()),
        uploaded_at: entry.date().cloned(),
        datasource: DATA_SOURCE.to_string(),
    };

    Ok((record, warnings))
}

fn classify_field(field: ScoreTypesField<'_>) -> Classification {
    match field {
        ScoreTypesField::Absent => Classification::default(),
        ScoreTypesField::Markup(fragment) => classify(fragment),
        ScoreTypesField::Invalid(value) => {
            Classification::malformed(format!("score_types is {}", json_kind(value)))
        }
    }
}

fn log_warning(page: u32, warning: &ExtractionWarning) {
    match warning {
        ExtractionWarning::UnknownScoreType { source_id, label } => warn!(
            page,
            source_id = %source_id,
            label = %label,
            "Unrecognized score type label"
        ),
        ExtractionWarning::MalformedScoreTypes { source_id, detail } => warn!(
            page,
            source_id = %source_id,
            detail = %detail,
            "Malformed score types fragment"
        ),
        ExtractionWarning::UnexpectedShape { detail } => {
            warn!(page, detail = %detail, "Skipping entry")
        }
    }
}
