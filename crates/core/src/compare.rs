//! Baseline-relative views over a set of groups: total commit time per
//! group, one component's time per group, and per-group component rankings.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{AggregatedTimes, DurationTotals, Group, GroupId};

/// Which per-component totals to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationMetric {
    /// Time including descendants.
    Actual,
    /// Time excluding descendants.
    #[serde(rename = "self")]
    SelfTime,
}

impl DurationMetric {
    pub fn totals(self, group: &Group) -> &DurationTotals {
        match self {
            DurationMetric::Actual => &group.actual_duration_totals,
            DurationMetric::SelfTime => &group.self_duration_totals,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationMetric::Actual => "Actual",
            DurationMetric::SelfTime => "Self",
        }
    }
}

/// One row of a component ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedComponent {
    pub name: String,
    pub duration: f64,
}

/// All components of a group, slowest first. Ties keep the order in which
/// the components were first seen.
pub fn rank_components(group: &Group, metric: DurationMetric) -> Vec<RankedComponent> {
    let mut entries: Vec<RankedComponent> = metric
        .totals(group)
        .iter()
        .map(|(name, duration)| RankedComponent {
            name: name.clone(),
            duration: *duration,
        })
        .collect();
    entries.sort_by(|a, b| b.duration.total_cmp(&a.duration));
    entries
}

/// The `limit` slowest components of a group.
pub fn top_components(group: &Group, metric: DurationMetric, limit: usize) -> Vec<RankedComponent> {
    let mut entries = rank_components(group, metric);
    entries.truncate(limit);
    entries
}

/// Direction of a difference against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Faster,
    Slower,
    Unchanged,
}

/// Difference of one group's value against the baseline's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineDiff {
    pub diff_ms: f64,
    /// Zero when the baseline value is not positive.
    pub diff_percent: f64,
    pub trend: Trend,
}

impl BaselineDiff {
    pub fn between(value: f64, baseline: f64) -> Self {
        let diff_ms = value - baseline;
        let diff_percent = if baseline > 0.0 {
            diff_ms / baseline * 100.0
        } else {
            0.0
        };
        let trend = if diff_ms < 0.0 {
            Trend::Faster
        } else if diff_ms > 0.0 {
            Trend::Slower
        } else {
            Trend::Unchanged
        };
        Self {
            diff_ms,
            diff_percent,
            trend,
        }
    }
}

/// One group's value in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub group_id: GroupId,
    pub group_name: String,
    pub value: f64,
    pub is_baseline: bool,
    /// `None` for the baseline itself and when no baseline is selected.
    pub diff: Option<BaselineDiff>,
}

/// Compare average total commit time across groups.
///
/// Only groups with a non-zero average take part. The baseline value is 0
/// when `baseline` names a group that is not part of the comparison.
pub fn compare_groups(groups: &[Arc<Group>], baseline: Option<GroupId>) -> Vec<ComparisonRow> {
    let comparable: Vec<(&Group, f64)> = groups
        .iter()
        .filter_map(|group| {
            let total = group.average_summary?.total_duration;
            (total != 0.0).then_some((group.as_ref(), total))
        })
        .collect();
    build_rows(&comparable, baseline)
}

/// Compare one component's time across every group. Groups that never
/// rendered the component count as 0.
pub fn compare_component(
    groups: &[Arc<Group>],
    component: &str,
    metric: DurationMetric,
    baseline: Option<GroupId>,
) -> Vec<ComparisonRow> {
    let values: Vec<(&Group, f64)> = groups
        .iter()
        .map(|group| {
            let value = metric.totals(group).get(component).copied().unwrap_or(0.0);
            (group.as_ref(), value)
        })
        .collect();
    build_rows(&values, baseline)
}

fn build_rows(values: &[(&Group, f64)], baseline: Option<GroupId>) -> Vec<ComparisonRow> {
    let baseline_value = baseline
        .and_then(|id| values.iter().find(|(group, _)| group.id == id))
        .map_or(0.0, |(_, value)| *value);

    values
        .iter()
        .map(|(group, value)| {
            let is_baseline = baseline == Some(group.id);
            let diff = match baseline {
                Some(_) if !is_baseline => Some(BaselineDiff::between(*value, baseline_value)),
                _ => None,
            };
            ComparisonRow {
                group_id: group.id,
                group_name: group.group_name.clone(),
                value: *value,
                is_baseline,
                diff,
            }
        })
        .collect()
}

/// Split of a commit-time summary into stacked segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectBreakdown {
    /// Commit time not spent in effects, never negative.
    pub render: f64,
    pub layout_effects: f64,
    pub passive_effects: f64,
}

impl From<AggregatedTimes> for EffectBreakdown {
    fn from(times: AggregatedTimes) -> Self {
        let effects = times.total_effect_duration + times.total_passive_effect_duration;
        Self {
            render: (times.total_duration - effects).max(0.0),
            layout_effects: times.total_effect_duration,
            passive_effects: times.total_passive_effect_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: u64, name: &str, total: Option<f64>, actual: &[(&str, f64)]) -> Arc<Group> {
        let mut group = Group::new(GroupId(id), name);
        group.average_summary = total.map(|total_duration| AggregatedTimes {
            total_duration,
            ..AggregatedTimes::ZERO
        });
        group.actual_duration_totals = actual
            .iter()
            .map(|(name, ms)| (name.to_string(), *ms))
            .collect();
        Arc::new(group)
    }

    #[test]
    fn ranks_slowest_first() {
        let g = group(
            0,
            "a",
            None,
            &[("List", 5.0), ("App", 15.0), ("Button", 13.5), ("Header", 5.0)],
        );
        let ranked = rank_components(&g, DurationMetric::Actual);
        let names: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["App", "Button", "List", "Header"]);

        let top = top_components(&g, DurationMetric::Actual, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].duration, 13.5);

        assert!(rank_components(&g, DurationMetric::SelfTime).is_empty());
    }

    #[test]
    fn compares_against_baseline() {
        let groups = vec![
            group(0, "before", Some(40.0), &[]),
            group(1, "after", Some(30.0), &[]),
            group(2, "worse", Some(50.0), &[]),
        ];
        let rows = compare_groups(&groups, Some(GroupId(0)));
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_baseline);
        assert!(rows[0].diff.is_none());

        let after = rows[1].diff.unwrap();
        assert_eq!(after.diff_ms, -10.0);
        assert_eq!(after.diff_percent, -25.0);
        assert_eq!(after.trend, Trend::Faster);

        let worse = rows[2].diff.unwrap();
        assert_eq!(worse.diff_percent, 25.0);
        assert_eq!(worse.trend, Trend::Slower);
    }

    #[test]
    fn skips_groups_without_data() {
        let groups = vec![
            group(0, "fresh", Some(0.0), &[]),
            group(1, "failed", None, &[]),
            group(2, "loaded", Some(12.0), &[]),
        ];
        let rows = compare_groups(&groups, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_name, "loaded");
        assert!(rows[0].diff.is_none());
    }

    #[test]
    fn missing_baseline_compares_against_zero() {
        let groups = vec![group(0, "only", Some(12.0), &[])];
        let rows = compare_groups(&groups, Some(GroupId(7)));
        let diff = rows[0].diff.unwrap();
        assert_eq!(diff.diff_ms, 12.0);
        assert_eq!(diff.diff_percent, 0.0);
    }

    #[test]
    fn component_comparison_defaults_to_zero() {
        let groups = vec![
            group(0, "base", None, &[("Button", 10.0)]),
            group(1, "next", None, &[("List", 3.0)]),
        ];
        let rows = compare_component(&groups, "Button", DurationMetric::Actual, Some(GroupId(0)));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, 0.0);
        let diff = rows[1].diff.unwrap();
        assert_eq!(diff.diff_percent, -100.0);
        assert_eq!(diff.trend, Trend::Faster);
    }

    #[test]
    fn breakdown_clamps_render_time() {
        let breakdown = EffectBreakdown::from(AggregatedTimes {
            total_duration: 2.0,
            total_effect_duration: 1.5,
            total_passive_effect_duration: 1.0,
        });
        assert_eq!(breakdown.render, 0.0);
        assert_eq!(breakdown.layout_effects, 1.5);

        let breakdown = EffectBreakdown::from(AggregatedTimes {
            total_duration: 10.0,
            total_effect_duration: 2.0,
            total_passive_effect_duration: 1.0,
        });
        assert_eq!(breakdown.render, 7.0);
    }
}
