use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{Marker, MergeState, Range};

/// Findings for one motorway's marker list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Expected posts with no marker
    pub missing: Vec<i64>,
    /// Expected posts that were already accounted for by an earlier range
    pub duplicated: Vec<i64>,
    /// Marker distances outside every declared range
    pub out_of_range: Vec<f64>,
    /// Distances of unpaired markers on motorways with double posts
    pub single: Vec<f64>,
    /// The validated list itself
    pub milestones: Vec<Marker>,
}

impl ValidationReport {
    /// Total number of reported problems, markers themselves excluded
    pub fn finding_count(&self) -> usize {
        self.missing.len() + self.duplicated.len() + self.out_of_range.len() + self.single.len()
    }

    pub fn is_clean(&self) -> bool {
        self.finding_count() == 0
    }

    pub fn suspicious_count(&self) -> usize {
        self.milestones.iter().filter(|m| m.is_suspicious()).count()
    }
}

/// Check a merged marker list against the motorway's expected posts.
///
/// Never fails: every anomaly ends up in one of the report lists.
pub fn validate_milestones(milestones: Vec<Marker>, ranges: &[Range], are_doubles: bool) -> ValidationReport {
    let mut missing = Vec::new();
    let mut duplicated = Vec::new();
    let mut seen = HashSet::new();

    for range in ranges {
        for post in range.expected_posts() {
            if !milestones.iter().any(|m| m.distance == post as f64) {
                missing.push(post);
                continue;
            }

            if !seen.insert(post) {
                duplicated.push(post);
            }
        }
    }

    let out_of_range = milestones
        .iter()
        .map(|m| m.distance)
        .filter(|&distance| !ranges.iter().any(|range| range.contains(distance)))
        .collect();

    let single = if are_doubles {
        milestones
            .iter()
            .filter(|m| m.merge_state == MergeState::Lone)
            .map(|m| m.distance)
            .collect()
    } else {
        Vec::new()
    };

    ValidationReport {
        missing,
        duplicated,
        out_of_range,
        single,
        milestones,
    }
}
