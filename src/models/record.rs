//! Finalized workout records.
//!
//! A record is the output unit of the extraction pipeline. Its serialized
//! field names match the JSON-lines export consumed downstream, so they
//! must not change without a coordinated migration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data-source tag stamped on every record.
pub const DATA_SOURCE: &str = "wodwell";

/// Score-type facets of a workout.
///
/// Closed-world: a facet that is not signalled upstream is `false`,
/// never unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFacets {
    /// Scored "For Load".
    #[serde(rename = "load_score")]
    pub load: bool,
    /// Scored "For Time".
    #[serde(rename = "time_score")]
    pub time: bool,
    /// Scored "For Rounds/Reps (AMRAP)".
    #[serde(rename = "amrap_score")]
    pub rounds_reps: bool,
}

impl ScoreFacets {
    /// True when no facet is set.
    pub fn is_empty(&self) -> bool {
        !(self.load || self.time || self.rounds_reps)
    }
}

/// A typed, classified workout record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier derived from the upstream source id.
    #[serde(rename = "wod_id")]
    pub id: String,
    /// Title as supplied upstream, in its original JSON type.
    #[serde(rename = "wod_title")]
    pub title: Option<Value>,
    #[serde(flatten)]
    pub facets: ScoreFacets,
    /// Description with line-break markup normalized to newlines.
    #[serde(rename = "workout_description")]
    pub description: String,
    /// Upload timestamp, passed through verbatim (string or number).
    #[serde(rename = "upload_timestamp")]
    pub uploaded_at: Option<Value>,
    #[serde(rename = "meta_datasource")]
    pub datasource: String,
}
