//! Pure reductions from parsed trace files to per-file and per-group
//! figures. Nothing here allocates beyond its result or touches I/O.

pub mod commits;
pub mod components;

pub use commits::{aggregate_commit_times, calculate_average_times};
pub use components::{
    ComponentStats, MergedComponentNames, calculate_component_stats, extract_component_map,
    merge_component_names,
};
