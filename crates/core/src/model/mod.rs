pub mod group;
pub mod trace;

pub use group::{
    AggregatedTimes, CommitTotals, ComponentNameMap, DurationTotals, FileStats, Group, GroupId,
};
pub use trace::{
    CommitRecord, ComponentId, LoadedTrace, RootTrace, SnapshotEntry, SnapshotNode, TraceFile,
};
