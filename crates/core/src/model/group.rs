use std::collections::HashMap;
use std::fmt;
use std::ops::AddAssign;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::trace::ComponentId;

/// Component id → display name, scoped to the file(s) it was built from.
pub type ComponentNameMap = HashMap<ComponentId, String>;

/// Component display name → accumulated duration in milliseconds, in the
/// order names were first seen (file, root, commit, pair).
pub type DurationTotals = IndexMap<String, f64>;

/// Commit timing figures. Either the totals of one file or the per-file
/// average of a group, depending on which function produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedTimes {
    pub total_duration: f64,
    pub total_effect_duration: f64,
    pub total_passive_effect_duration: f64,
}

impl AggregatedTimes {
    pub const ZERO: Self = Self {
        total_duration: 0.0,
        total_effect_duration: 0.0,
        total_passive_effect_duration: 0.0,
    };

    pub fn divided_by(self, divisor: f64) -> Self {
        Self {
            total_duration: self.total_duration / divisor,
            total_effect_duration: self.total_effect_duration / divisor,
            total_passive_effect_duration: self.total_passive_effect_duration / divisor,
        }
    }
}

impl AddAssign for AggregatedTimes {
    fn add_assign(&mut self, rhs: Self) {
        self.total_duration += rhs.total_duration;
        self.total_effect_duration += rhs.total_effect_duration;
        self.total_passive_effect_duration += rhs.total_passive_effect_duration;
    }
}

/// Totals of a single file together with its commit count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitTotals {
    #[serde(flatten)]
    pub times: AggregatedTimes,
    pub commit_count: usize,
}

/// Per-file summary kept alongside a group for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub file_name: String,
    pub total_duration: f64,
    pub commit_count: usize,
}

/// Stable group identifier. Never reused within one registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named measurement set: one or more trace files averaged together.
///
/// `loading_error` and the derived data are mutually exclusive: a group
/// carrying an error has every derived collection empty and no summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub group_name: String,
    pub file_names: Vec<String>,
    pub loading_error: Option<String>,
    pub file_stats: Vec<FileStats>,
    pub average_summary: Option<AggregatedTimes>,
    pub component_name_map: ComponentNameMap,
    /// Sorted, deduplicated names from `component_name_map`.
    pub available_component_names: Vec<String>,
    pub actual_duration_totals: DurationTotals,
    pub self_duration_totals: DurationTotals,
}

impl Group {
    /// A fresh group. The summary starts at zero rather than `None` so it
    /// renders before any file is loaded.
    pub fn new(id: GroupId, group_name: impl Into<String>) -> Self {
        Self {
            average_summary: Some(AggregatedTimes::ZERO),
            ..Self::empty(id, group_name.into())
        }
    }

    /// Copy of this group with all loaded data and any error dropped.
    pub fn cleared(&self) -> Self {
        Self::empty(self.id, self.group_name.clone())
    }

    /// Copy of this group in the error state.
    pub fn with_error(&self, message: impl Into<String>) -> Self {
        Self {
            loading_error: Some(message.into()),
            ..self.cleared()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loading_error.is_none() && !self.file_names.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.file_names.len()
    }

    fn empty(id: GroupId, group_name: String) -> Self {
        Self {
            id,
            group_name,
            file_names: Vec::new(),
            loading_error: None,
            file_stats: Vec::new(),
            average_summary: None,
            component_name_map: ComponentNameMap::new(),
            available_component_names: Vec::new(),
            actual_duration_totals: DurationTotals::new(),
            self_duration_totals: DurationTotals::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_group_has_zero_summary() {
        let group = Group::new(GroupId(3), "Group 4");
        assert_eq!(group.average_summary, Some(AggregatedTimes::ZERO));
        assert!(group.loading_error.is_none());
        assert!(!group.is_loaded());
    }

    #[test]
    fn error_state_drops_data() {
        let mut group = Group::new(GroupId(0), "baseline");
        group.file_names.push("a.json".into());
        group
            .actual_duration_totals
            .insert("Button".into(), 4.0);

        let failed = group.with_error("bad file");
        assert_eq!(failed.loading_error.as_deref(), Some("bad file"));
        assert_eq!(failed.group_name, "baseline");
        assert!(failed.file_names.is_empty());
        assert!(failed.actual_duration_totals.is_empty());
        assert!(failed.average_summary.is_none());
    }

    #[test]
    fn commit_totals_serialize_flat() {
        let totals = CommitTotals {
            times: AggregatedTimes {
                total_duration: 25.0,
                total_effect_duration: 2.0,
                total_passive_effect_duration: 1.0,
            },
            commit_count: 4,
        };
        let value = serde_json::to_value(totals).unwrap();
        assert_eq!(value["totalDuration"], 25.0);
        assert_eq!(value["commitCount"], 4);
    }
}
