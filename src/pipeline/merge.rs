use tracing::debug;

use crate::constants::{DEFAULT_MERGE_DISTANCE_M, SOURCE_ID_SEPARATOR};
use crate::error::{MilestoneError, Result};
use crate::pipeline::geo::{midpoint, surface_distance_m};
use crate::types::{Marker, MergeState};

/// Configuration for collapsing double posts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeConfig {
    /// Same-distance posts further apart than this are left alone
    pub max_distance_m: f64,
}

impl MergeConfig {
    /// Rejects negative and non-finite thresholds; a NaN threshold would merge every pair
    pub fn new(max_distance_m: f64) -> Result<Self> {
        if !max_distance_m.is_finite() || max_distance_m < 0.0 {
            return Err(MilestoneError::Config(format!(
                "merge distance must be a non-negative number of meters, got {}",
                max_distance_m
            )));
        }
        Ok(Self { max_distance_m })
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_distance_m: DEFAULT_MERGE_DISTANCE_M,
        }
    }
}

/// Counters collected during a merge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Pairs collapsed into one marker
    pub merged: usize,
    /// Markers with no same-distance partner
    pub lone: usize,
    /// Same-distance pairs rejected because they were too far apart
    pub too_far: usize,
}

/// Collapse pairs of markers that share a distance and stand close together.
///
/// Walks the list from the last index down to 1. For each marker not yet
/// merged, the lowest other index with the same distance is the partner; when
/// the two are within `max_distance_m`, the partner moves to the midpoint,
/// takes both ids and the current marker is removed. Only already visited
/// (higher) indices shift on removal. Index 0 is never the current element, so
/// it keeps `Unevaluated` unless it absorbs a partner.
pub fn merge_close_milestones(markers: &mut Vec<Marker>, config: &MergeConfig) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for i in (1..markers.len()).rev() {
        if markers[i].merge_state == MergeState::Merged {
            continue;
        }

        let distance = markers[i].distance;
        let Some(j) = markers
            .iter()
            .enumerate()
            .position(|(k, candidate)| k != i && candidate.distance == distance)
        else {
            markers[i].merge_state = MergeState::Lone;
            summary.lone += 1;
            continue;
        };

        let current_coords = markers[i].coords;
        let found_coords = markers[j].coords;
        let separation = surface_distance_m(current_coords, found_coords);
        if separation > config.max_distance_m {
            debug!(
                "Posts {} and {} share km {} but are {:.0} m apart",
                markers[j].source_id, markers[i].source_id, distance, separation
            );
            summary.too_far += 1;
            continue;
        }

        let current = markers.remove(i);
        let j = if j > i { j - 1 } else { j };
        let found = &mut markers[j];
        found.coords = midpoint(found_coords, current_coords);
        found.merge_state = MergeState::Merged;
        found.source_id = format!("{}{}{}", found.source_id, SOURCE_ID_SEPARATOR, current.source_id);
        summary.merged += 1;
    }

    summary
}
