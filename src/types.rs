use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::pipeline::validate::ValidationReport;

/// Geographic point as returned by the milestone source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub lat: f64,
    pub lon: f64,
    #[serde(deserialize_with = "source_id_from_number_or_string")]
    pub id: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl RawRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceId {
    Numeric(u64),
    Text(String),
}

/// OSM ids arrive as JSON numbers; saved fixtures sometimes carry them as strings.
pub(crate) fn source_id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SourceId::deserialize(deserializer)? {
        SourceId::Numeric(id) => id.to_string(),
        SourceId::Text(id) => id,
    })
}

/// Outcome of the merge pass for a single marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeState {
    /// Never visited as the current element (always the case for index 0)
    #[default]
    Unevaluated,
    /// Visited and no other marker shares its distance
    Lone,
    /// Absorbed a same-distance partner
    Merged,
}

impl MergeState {
    pub fn is_unevaluated(&self) -> bool {
        matches!(self, MergeState::Unevaluated)
    }
}

/// Serialized as the optional `double` flag of the report
mod double_flag {
    use super::MergeState;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(state: &MergeState, serializer: S) -> Result<S::Ok, S::Error> {
        match state {
            MergeState::Unevaluated => serializer.serialize_none(),
            MergeState::Lone => serializer.serialize_bool(false),
            MergeState::Merged => serializer.serialize_bool(true),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MergeState, D::Error> {
        Ok(match Option::<bool>::deserialize(deserializer)? {
            None => MergeState::Unevaluated,
            Some(false) => MergeState::Lone,
            Some(true) => MergeState::Merged,
        })
    }
}

/// A kilometer post along a motorway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// (latitude, longitude) in degrees
    pub coords: (f64, f64),
    /// Kilometer-post value; NaN when the source tag was not a number
    pub distance: f64,
    /// Source node id, or `a;b` once two posts have been merged
    #[serde(rename = "osm_id")]
    pub source_id: String,
    /// `fixme` or `note` annotation left by a mapper
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicious: Option<String>,
    #[serde(
        rename = "double",
        default,
        skip_serializing_if = "MergeState::is_unevaluated",
        with = "double_flag"
    )]
    pub merge_state: MergeState,
}

impl Marker {
    pub fn new(coords: (f64, f64), distance: f64, source_id: impl Into<String>) -> Self {
        Self {
            coords,
            distance,
            source_id: source_id.into(),
            suspicious: None,
            merge_state: MergeState::Unevaluated,
        }
    }

    pub fn is_suspicious(&self) -> bool {
        self.suspicious.is_some()
    }
}

/// Expected kilometer posts `[start, end]`, written as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Posts that must be present: `start <= i < end`. Empty when `start >= end`.
    pub fn expected_posts(&self) -> std::ops::Range<i64> {
        self.start..self.end
    }

    /// Whether a marker distance lies inside the range, both bounds included
    pub fn contains(&self, distance: f64) -> bool {
        self.start as f64 <= distance && distance <= self.end as f64
    }
}

impl From<[i64; 2]> for Range {
    fn from([start, end]: [i64; 2]) -> Self {
        Self { start, end }
    }
}

impl From<Range> for [i64; 2] {
    fn from(range: Range) -> Self {
        [range.start, range.end]
    }
}

/// One entry of the motorway list file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorwayConfig {
    pub name: String,
    pub ranges: Vec<Range>,
    /// Posts are expected in pairs, one per carriageway
    #[serde(default)]
    pub are_doubles: bool,
}

/// Findings for one motorway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorwayReport {
    pub name: String,
    pub ranges: Vec<Range>,
    pub warnings: ValidationReport,
}

/// Everything a single run produced, as written to the output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub date: DateTime<Utc>,
    pub data: Vec<MotorwayReport>,
}
