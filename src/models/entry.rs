//! Raw upstream entries and page fetch outcomes.

use serde_json::{Map, Value};

use crate::utils::json::extract_path;

/// Path of the entry array inside a successful page response.
pub const ENTRIES_PATH: &str = "data.wods";

/// One semi-structured workout entry as supplied upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    fields: Map<String, Value>,
}

/// The `score_types` field of an entry, as found upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreTypesField<'a> {
    /// Field missing or null.
    Absent,
    /// Markup fragment (possibly empty).
    Markup(&'a str),
    /// Present but not a string.
    Invalid(&'a Value),
}

impl RawEntry {
    /// Wrap a JSON value, returning `None` when it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Source id in string form. Numbers keep their JSON rendering.
    pub fn source_id(&self) -> Option<String> {
        match self.fields.get("wod_id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Title as supplied, whatever its JSON type.
    pub fn title(&self) -> Option<&Value> {
        self.passthrough("title")
    }

    /// Upstream-formatted description.
    pub fn workout(&self) -> Option<&str> {
        self.fields.get("workout").and_then(Value::as_str)
    }

    /// Upload date as supplied, whatever its JSON type.
    pub fn date(&self) -> Option<&Value> {
        self.passthrough("date")
    }

    fn passthrough(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn score_types(&self) -> ScoreTypesField<'_> {
        match self.fields.get("score_types") {
            None | Some(Value::Null) => ScoreTypesField::Absent,
            Some(Value::String(s)) => ScoreTypesField::Markup(s),
            Some(other) => ScoreTypesField::Invalid(other),
        }
    }

    /// Direct-ad marker. Presence alone counts, whatever the value.
    pub fn has_ad_marker(&self) -> bool {
        self.fields.contains_key("is_ad")
    }

    /// External-ad marker. Presence alone counts, whatever the value.
    pub fn has_external_ad_marker(&self) -> bool {
        self.fields.contains_key("is_external_ad")
    }
}

/// Why a page body could not be turned into a [`PageResult`].
#[derive(Debug, thiserror::Error)]
pub enum PageDecodeError {
    #[error("Response body is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response has no boolean 'success' flag")]
    MissingSuccessFlag,
}

/// Outcome of one page fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Page index that was requested.
    pub page: u32,
    /// Upstream success flag. `false` is the end-of-data signal.
    pub success: bool,
    /// Entries in arrival order. Not necessarily objects.
    pub entries: Vec<Value>,
    /// Set when a successful response had no entry array.
    pub shape_warning: Option<String>,
}

impl PageResult {
    /// Decode a page response body.
    pub fn parse(page: u32, body: &str) -> Result<Self, PageDecodeError> {
        let data: Value = serde_json::from_str(body)?;

        let success = data
            .get("success")
            .and_then(Value::as_bool)
            .ok_or(PageDecodeError::MissingSuccessFlag)?;

        if !success {
            return Ok(Self {
                page,
                success,
                entries: Vec::new(),
                shape_warning: None,
            });
        }

        let (entries, shape_warning) = match extract_path(&data, ENTRIES_PATH) {
            Value::Array(arr) => (arr.clone(), None),
            Value::Null => (
                Vec::new(),
                Some(format!("no '{}' array in successful response", ENTRIES_PATH)),
            ),
            other => (
                Vec::new(),
                Some(format!(
                    "'{}' is {} instead of an array",
                    ENTRIES_PATH,
                    json_kind(other)
                )),
            ),
        };

        Ok(Self {
            page,
            success,
            entries,
            shape_warning,
        })
    }
}

/// Short name of a JSON value's kind for log messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> RawEntry {
        RawEntry::from_value(value).unwrap()
    }

    #[test]
    fn test_source_id_forms() {
        assert_eq!(entry(json!({"wod_id": 1234})).source_id(), Some("1234".into()));
        assert_eq!(entry(json!({"wod_id": "88"})).source_id(), Some("88".into()));
        assert_eq!(entry(json!({"wod_id": ""})).source_id(), None);
        assert_eq!(entry(json!({"wod_id": null})).source_id(), None);
        assert_eq!(entry(json!({"title": "x"})).source_id(), None);
    }

    #[test]
    fn test_passthrough_fields_keep_json_type() {
        let e = entry(json!({"title": 1234, "date": 1583312400, "workout": null}));
        assert_eq!(e.title(), Some(&json!(1234)));
        assert_eq!(e.date(), Some(&json!(1583312400)));
        assert_eq!(entry(json!({"title": null})).title(), None);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(RawEntry::from_value(json!([1, 2])).is_none());
        assert!(RawEntry::from_value(json!("ad")).is_none());
    }

    #[test]
    fn test_score_types_field() {
        assert_eq!(entry(json!({})).score_types(), ScoreTypesField::Absent);
        assert_eq!(
            entry(json!({"score_types": null})).score_types(),
            ScoreTypesField::Absent
        );
        assert_eq!(
            entry(json!({"score_types": ""})).score_types(),
            ScoreTypesField::Markup("")
        );
        assert!(matches!(
            entry(json!({"score_types": 3})).score_types(),
            ScoreTypesField::Invalid(_)
        ));
    }

    #[test]
    fn test_ad_markers_by_presence() {
        assert!(entry(json!({"is_ad": false})).has_ad_marker());
        assert!(entry(json!({"is_external_ad": null})).has_external_ad_marker());
        assert!(!entry(json!({"wod_id": 1})).has_ad_marker());
    }

    #[test]
    fn test_parse_success_page() {
        let body = r#"{"success": true, "data": {"wods": [{"wod_id": 1}, {"wod_id": 2}]}}"#;
        let page = PageResult::parse(3, body).unwrap();
        assert!(page.success);
        assert_eq!(page.page, 3);
        assert_eq!(page.entries.len(), 2);
        assert!(page.shape_warning.is_none());
    }

    #[test]
    fn test_parse_end_of_data() {
        let page = PageResult::parse(7, r#"{"success": false, "data": "no more"}"#).unwrap();
        assert!(!page.success);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn test_parse_success_without_entries_warns() {
        let page = PageResult::parse(0, r#"{"success": true, "data": {}}"#).unwrap();
        assert!(page.success);
        assert!(page.entries.is_empty());
        assert!(page.shape_warning.unwrap().contains("data.wods"));

        let page = PageResult::parse(0, r#"{"success": true, "data": {"wods": {}}}"#).unwrap();
        assert!(page.shape_warning.unwrap().contains("an object"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            PageResult::parse(0, "<html>oops</html>"),
            Err(PageDecodeError::Json(_))
        ));
        assert!(matches!(
            PageResult::parse(0, r#"{"data": {"wods": []}}"#),
            Err(PageDecodeError::MissingSuccessFlag)
        ));
        assert!(matches!(
            PageResult::parse(0, r#"{"success": "yes"}"#),
            Err(PageDecodeError::MissingSuccessFlag)
        ));
    }
}
