use crate::types::{Marker, MergeState, RawRecord};

/// Map raw records onto markers, one for one and in order.
///
/// Unparsable distances become NaN; dropping them is left to
/// [`retain_valid_distances`].
pub fn preprocess_records(records: &[RawRecord]) -> Vec<Marker> {
    records.iter().map(preprocess_record).collect()
}

fn preprocess_record(record: &RawRecord) -> Marker {
    Marker {
        coords: (record.lat, record.lon),
        distance: parse_distance(record.tag("distance")),
        source_id: record.id.clone(),
        suspicious: annotation(record),
        merge_state: MergeState::Unevaluated,
    }
}

/// Lenient numeric coercion of the `distance` tag.
///
/// Missing tag, garbage or a non-finite value gives NaN, a blank value counts as zero.
pub fn parse_distance(value: Option<&str>) -> f64 {
    let Some(value) = value else {
        return f64::NAN;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(distance) if distance.is_finite() => distance,
        _ => f64::NAN,
    }
}

fn annotation(record: &RawRecord) -> Option<String> {
    ["fixme", "note"]
        .iter()
        .filter_map(|key| record.tag(key))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Drop markers whose distance could not be parsed, returning how many were removed
pub fn retain_valid_distances(markers: &mut Vec<Marker>) -> usize {
    let before = markers.len();
    markers.retain(|marker| !marker.distance.is_nan());
    before - markers.len()
}
