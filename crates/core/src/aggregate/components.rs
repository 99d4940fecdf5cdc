use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{ComponentId, ComponentNameMap, DurationTotals, TraceFile};

/// Map every named component id declared in the file's snapshots.
///
/// Roots are visited in file order and later entries overwrite earlier
/// ones, so an id declared by several roots keeps the last name seen.
/// Nodes without a display name are skipped.
pub fn extract_component_map(file: &TraceFile) -> ComponentNameMap {
    let mut map = ComponentNameMap::new();
    for root in &file.roots {
        for (id, node) in &root.snapshot {
            if let Some(name) = &node.display_name {
                map.insert(*id, name.clone());
            }
        }
    }
    map
}

/// Component names across a whole group, for presentation and selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedComponentNames {
    pub map: ComponentNameMap,
    pub sorted_names: Vec<String>,
}

/// Merge the component maps of several files, later files winning on id
/// collisions.
///
/// The merged map is only fit for listing names. Ids are not comparable
/// across files, so duration lookups must go through each file's own map
/// (see [`calculate_component_stats`]).
pub fn merge_component_names(files: &[TraceFile]) -> MergedComponentNames {
    let mut map = ComponentNameMap::new();
    for file in files {
        map.extend(extract_component_map(file));
    }

    let sorted_names = map
        .values()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    MergedComponentNames { map, sorted_names }
}

/// Per-component durations of a group, averaged per file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStats {
    pub actual_duration_totals: DurationTotals,
    pub self_duration_totals: DurationTotals,
}

/// Sum each component's actual and self durations over every commit of
/// every file, then divide by the number of files.
///
/// Each file resolves ids through its own snapshot map. Pairs whose id has
/// no name in that file are dropped.
pub fn calculate_component_stats(files: &[TraceFile]) -> ComponentStats {
    let mut stats = ComponentStats::default();

    for file in files {
        let names = extract_component_map(file);
        for commit in file.roots.iter().flat_map(|root| &root.commits) {
            accumulate(&mut stats.actual_duration_totals, &names, &commit.actual_durations);
            accumulate(&mut stats.self_duration_totals, &names, &commit.self_durations);
        }
    }

    let file_count = files.len().max(1) as f64;
    for total in stats
        .actual_duration_totals
        .values_mut()
        .chain(stats.self_duration_totals.values_mut())
    {
        *total /= file_count;
    }

    stats
}

fn accumulate(
    totals: &mut DurationTotals,
    names: &ComponentNameMap,
    durations: &[(ComponentId, f64)],
) {
    for (id, ms) in durations {
        if let Some(name) = names.get(id) {
            *totals.entry(name.clone()).or_insert(0.0) += ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommitRecord, RootTrace, SnapshotNode};

    fn root(names: &[(u64, &str)], commits: Vec<CommitRecord>) -> RootTrace {
        RootTrace {
            commits,
            snapshot: names
                .iter()
                .map(|(id, name)| (*id, SnapshotNode::named(*name)))
                .collect(),
        }
    }

    fn commit(actual: &[(u64, f64)], self_: &[(u64, f64)]) -> CommitRecord {
        CommitRecord {
            actual_durations: actual.to_vec(),
            self_durations: self_.to_vec(),
            ..Default::default()
        }
    }

    fn file(roots: Vec<RootTrace>) -> TraceFile {
        TraceFile {
            version: serde_json::json!(5),
            roots,
        }
    }

    #[test]
    fn extracts_named_components() {
        let trace = file(vec![root(
            &[(1, "App"), (2, "Header"), (3, "Button"), (4, "List")],
            vec![],
        )]);
        let map = extract_component_map(&trace);
        assert_eq!(map.len(), 4);
        assert_eq!(map[&1], "App");
        assert_eq!(map[&2], "Header");
        assert_eq!(map[&3], "Button");
        assert_eq!(map[&4], "List");
    }

    #[test]
    fn unnamed_nodes_and_bare_roots_contribute_nothing() {
        let mut with_anonymous = root(&[(1, "App")], vec![]);
        with_anonymous.snapshot.push((2, SnapshotNode::default()));
        let trace = file(vec![with_anonymous, RootTrace::default()]);

        let map = extract_component_map(&trace);
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn later_root_wins_on_duplicate_id() {
        let trace = file(vec![
            root(&[(7, "First")], vec![]),
            root(&[(7, "Second")], vec![]),
        ]);
        assert_eq!(extract_component_map(&trace)[&7], "Second");
    }

    #[test]
    fn merged_names_are_sorted_and_deduplicated() {
        let a = file(vec![root(&[(1, "Zeta"), (2, "Alpha"), (3, "Alpha")], vec![])]);
        let b = file(vec![root(&[(1, "Mid")], vec![])]);

        let merged = merge_component_names(&[a, b]);
        assert_eq!(merged.map[&1], "Mid");
        assert_eq!(merged.sorted_names, vec!["Alpha", "Mid"]);
    }

    #[test]
    fn single_file_totals_are_plain_sums() {
        let trace = file(vec![root(
            &[(1, "App"), (3, "Button")],
            vec![
                commit(&[(1, 10.0), (3, 5.0)], &[(1, 2.0), (3, 3.0)]),
                commit(&[(3, 5.0)], &[(3, 5.0)]),
            ],
        )]);
        let stats = calculate_component_stats(&[trace]);
        assert_eq!(stats.actual_duration_totals["Button"], 10.0);
        assert_eq!(stats.self_duration_totals["Button"], 8.0);
        assert_eq!(stats.actual_duration_totals["App"], 10.0);
    }

    #[test]
    fn unresolvable_ids_are_dropped() {
        let trace = file(vec![root(
            &[],
            vec![commit(&[(1, 10.0), (2, 4.0)], &[(1, 6.0)])],
        )]);
        let stats = calculate_component_stats(&[trace]);
        assert!(stats.actual_duration_totals.is_empty());
        assert!(stats.self_duration_totals.is_empty());
    }

    #[test]
    fn ids_resolve_per_file() {
        // Id 1 is "Button" in the first capture and "Modal" in the second.
        let a = file(vec![root(&[(1, "Button")], vec![commit(&[(1, 6.0)], &[])])]);
        let b = file(vec![root(&[(1, "Modal")], vec![commit(&[(1, 10.0)], &[])])]);

        let stats = calculate_component_stats(&[a, b]);
        assert_eq!(stats.actual_duration_totals.len(), 2);
        assert_eq!(stats.actual_duration_totals["Button"], 3.0);
        assert_eq!(stats.actual_duration_totals["Modal"], 5.0);
    }

    #[test]
    fn totals_keep_first_seen_order() {
        let a = file(vec![root(
            &[(1, "Zeta"), (2, "Alpha")],
            vec![commit(&[(1, 1.0), (2, 2.0)], &[(2, 1.0), (1, 1.0)])],
        )]);
        let b = file(vec![root(
            &[(5, "Mid"), (1, "Alpha")],
            vec![commit(&[(5, 4.0), (1, 3.0)], &[])],
        )]);

        let stats = calculate_component_stats(&[a, b]);
        let actual: Vec<_> = stats.actual_duration_totals.keys().collect();
        assert_eq!(actual, vec!["Zeta", "Alpha", "Mid"]);
        let self_: Vec<_> = stats.self_duration_totals.keys().collect();
        assert_eq!(self_, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn no_files_no_stats() {
        assert_eq!(calculate_component_stats(&[]), ComponentStats::default());
    }
}
