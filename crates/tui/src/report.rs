use std::collections::BTreeSet;
use std::io::{self, Write};
use std::sync::Arc;

use profdiff_core::compare::{
    ComparisonRow, DurationMetric, EffectBreakdown, RankedComponent, Trend, compare_component,
    compare_groups, top_components,
};
use profdiff_core::model::{Group, GroupId};
use serde::Serialize;

/// What to show besides the per-group summaries.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub metric: DurationMetric,
    pub baseline: Option<GroupId>,
    pub component: Option<String>,
    pub top: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupReport<'a> {
    #[serde(flatten)]
    group: &'a Group,
    breakdown: Option<EffectBreakdown>,
    top_components: Vec<RankedComponent>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComponentReport<'a> {
    name: &'a str,
    metric: DurationMetric,
    rows: Vec<ComparisonRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    baseline: Option<GroupId>,
    groups: Vec<GroupReport<'a>>,
    comparison: Vec<ComparisonRow>,
    component: Option<ComponentReport<'a>>,
}

pub fn write_json<W: Write>(
    out: &mut W,
    groups: &[Arc<Group>],
    options: &ReportOptions,
) -> anyhow::Result<()> {
    let report = Report {
        baseline: options.baseline,
        groups: groups
            .iter()
            .map(|group| GroupReport {
                group: group.as_ref(),
                breakdown: group.average_summary.map(EffectBreakdown::from),
                top_components: top_components(group, options.metric, options.top),
            })
            .collect(),
        comparison: compare_groups(groups, options.baseline),
        component: options.component.as_deref().map(|name| ComponentReport {
            name,
            metric: options.metric,
            rows: compare_component(groups, name, options.metric, options.baseline),
        }),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_text<W: Write>(
    out: &mut W,
    groups: &[Arc<Group>],
    options: &ReportOptions,
) -> io::Result<()> {
    for group in groups {
        write_group(out, group, options)?;
        writeln!(out)?;
    }

    let baseline_name = options
        .baseline
        .and_then(|id| groups.iter().find(|g| g.id == id))
        .map(|g| g.group_name.as_str());

    let rows = compare_groups(groups, options.baseline);
    writeln!(
        out,
        "Average commit time (baseline: {})",
        baseline_name.unwrap_or("none")
    )?;
    if rows.is_empty() {
        writeln!(out, "  no group has data yet")?;
    }
    write_rows(out, &rows)?;

    if let Some(name) = &options.component {
        writeln!(out)?;
        writeln!(
            out,
            "Component {name} ({} duration)",
            options.metric.label().to_lowercase()
        )?;
        if !is_known_component(groups, name) {
            writeln!(out, "  no group has a component named {name}")?;
            let available = available_names(groups);
            if !available.is_empty() {
                writeln!(out, "  available: {}", available.join(", "))?;
            }
        }
        write_rows(
            out,
            &compare_component(groups, name, options.metric, options.baseline),
        )?;
    }
    Ok(())
}

/// Whether any group declares a component with this display name.
pub fn is_known_component(groups: &[Arc<Group>], name: &str) -> bool {
    groups
        .iter()
        .any(|group| group.available_component_names.iter().any(|n| n == name))
}

/// Sorted, deduplicated component names across all groups.
pub fn available_names(groups: &[Arc<Group>]) -> Vec<&str> {
    groups
        .iter()
        .flat_map(|group| &group.available_component_names)
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn write_group<W: Write>(out: &mut W, group: &Group, options: &ReportOptions) -> io::Result<()> {
    writeln!(out, "{} (id {})", group.group_name, group.id)?;

    if let Some(error) = &group.loading_error {
        return writeln!(out, "  error: {error}");
    }
    if !group.is_loaded() {
        return writeln!(out, "  no files loaded");
    }

    for stats in &group.file_stats {
        writeln!(
            out,
            "  {:<32} {:>10} {:>5} commits",
            stats.file_name,
            format_ms(stats.total_duration),
            stats.commit_count
        )?;
    }

    if let Some(summary) = group.average_summary {
        let breakdown = EffectBreakdown::from(summary);
        writeln!(
            out,
            "  average over {} file(s): {} (render {}, layout effects {}, passive effects {})",
            group.file_count(),
            format_ms(summary.total_duration),
            format_ms(breakdown.render),
            format_ms(breakdown.layout_effects),
            format_ms(breakdown.passive_effects),
        )?;
    }

    let ranked = top_components(group, options.metric, options.top);
    if !ranked.is_empty() {
        writeln!(
            out,
            "  top {} by {} duration:",
            ranked.len(),
            options.metric.label().to_lowercase()
        )?;
        for (rank, entry) in ranked.iter().enumerate() {
            writeln!(
                out,
                "    #{:<3} {:<28} {:>10}",
                rank + 1,
                entry.name,
                format_ms(entry.duration)
            )?;
        }
    }
    Ok(())
}

fn write_rows<W: Write>(out: &mut W, rows: &[ComparisonRow]) -> io::Result<()> {
    for row in rows {
        writeln!(
            out,
            "  {:<24} {:>10}  {}",
            row.group_name,
            format_ms(row.value),
            describe_diff(row)
        )?;
    }
    Ok(())
}

/// "baseline", "-" or e.g. "+15.00 ms (+60.0%) slower".
pub fn describe_diff(row: &ComparisonRow) -> String {
    match row.diff {
        None if row.is_baseline => "baseline".to_string(),
        None => "-".to_string(),
        Some(diff) => {
            let verdict = match diff.trend {
                Trend::Faster => "faster",
                Trend::Slower => "slower",
                Trend::Unchanged => "unchanged",
            };
            format!(
                "{:+.2} ms ({:+.1}%) {verdict}",
                diff.diff_ms, diff.diff_percent
            )
        }
    }
}

pub fn format_ms(ms: f64) -> String {
    format!("{ms:.2} ms")
}
