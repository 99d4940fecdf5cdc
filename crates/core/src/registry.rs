use std::sync::Arc;

use thiserror::Error;

use crate::aggregate::{
    aggregate_commit_times, calculate_average_times, calculate_component_stats,
    merge_component_names,
};
use crate::model::{FileStats, Group, GroupId, LoadedTrace};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no group with id {0}")]
    UnknownId(GroupId),
    #[error("no group at position {0}")]
    UnknownIndex(usize),
}

/// Addresses a group either by its stable id or by its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRef {
    Id(GroupId),
    Index(usize),
}

impl From<GroupId> for GroupRef {
    fn from(id: GroupId) -> Self {
        GroupRef::Id(id)
    }
}

impl From<usize> for GroupRef {
    fn from(index: usize) -> Self {
        GroupRef::Index(index)
    }
}

/// Owns the list of measurement groups and every write to it.
///
/// Groups are handed out as `Arc<Group>` snapshots. A write never touches
/// a snapshot already handed out; it swaps in a new `Group` instead.
///
/// The registry always holds at least one group: removing the last one
/// immediately adds a default group in its place.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<Arc<Group>>,
    /// One past the highest id ever assigned.
    next_id: u64,
}

impl GroupRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            groups: Vec::new(),
            next_id: 0,
        };
        registry.add_group();
        registry
    }

    pub fn groups(&self) -> &[Arc<Group>] {
        &self.groups
    }

    pub fn group(&self, target: impl Into<GroupRef>) -> Option<Arc<Group>> {
        let pos = self.position(target.into()).ok()?;
        Some(Arc::clone(&self.groups[pos]))
    }

    /// Append an empty group named after its position, e.g. "Group 3".
    pub fn add_group(&mut self) -> GroupId {
        let max_plus_one = self
            .groups
            .iter()
            .map(|g| g.id.0 + 1)
            .max()
            .unwrap_or(0);
        let id = GroupId(max_plus_one.max(self.next_id));
        self.next_id = id.0 + 1;

        let name = format!("Group {}", self.groups.len() + 1);
        tracing::debug!(%id, %name, "group added");
        self.groups.push(Arc::new(Group::new(id, name)));
        id
    }

    /// Remove the group with `id`. Unknown ids are ignored. Returns whether
    /// a group was removed.
    pub fn remove_group(&mut self, id: GroupId) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        let removed = self.groups.len() != before;
        if removed {
            tracing::debug!(%id, "group removed");
        }
        if self.groups.is_empty() {
            self.add_group();
        }
        removed
    }

    pub fn rename_group(
        &mut self,
        target: impl Into<GroupRef>,
        name: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        self.replace(target.into(), |g| Group {
            group_name: name,
            ..g.clone()
        })
        .map(drop)
    }

    /// Drop the group's loaded files and derived data, keeping id and name.
    pub fn clear_group(&mut self, target: impl Into<GroupRef>) -> Result<(), RegistryError> {
        self.replace(target.into(), Group::cleared).map(drop)
    }

    /// Replace the group's data with aggregates of `files` and clear any
    /// previous loading error.
    pub fn ingest(
        &mut self,
        target: impl Into<GroupRef>,
        files: Vec<LoadedTrace>,
    ) -> Result<Arc<Group>, RegistryError> {
        let pos = self.position(target.into())?;

        let (file_names, traces): (Vec<String>, Vec<_>) = files
            .into_iter()
            .map(|loaded| (loaded.file_name, loaded.trace))
            .unzip();

        let file_stats = file_names
            .iter()
            .zip(&traces)
            .map(|(file_name, trace)| {
                let totals = aggregate_commit_times(trace);
                FileStats {
                    file_name: file_name.clone(),
                    total_duration: totals.times.total_duration,
                    commit_count: totals.commit_count,
                }
            })
            .collect();
        let average_summary = calculate_average_times(&traces);
        let merged = merge_component_names(&traces);
        let stats = calculate_component_stats(&traces);

        let current = &self.groups[pos];
        tracing::debug!(
            id = %current.id,
            files = file_names.len(),
            avg_duration = average_summary.total_duration,
            components = merged.sorted_names.len(),
            "group ingested"
        );

        let updated = Arc::new(Group {
            id: current.id,
            group_name: current.group_name.clone(),
            file_names,
            loading_error: None,
            file_stats,
            average_summary: Some(average_summary),
            component_name_map: merged.map,
            available_component_names: merged.sorted_names,
            actual_duration_totals: stats.actual_duration_totals,
            self_duration_totals: stats.self_duration_totals,
        });
        self.groups[pos] = Arc::clone(&updated);
        Ok(updated)
    }

    /// Put the group into the error state, dropping any loaded data.
    pub fn report_error(
        &mut self,
        target: impl Into<GroupRef>,
        message: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let message = message.into();
        let group = self.replace(target.into(), |g| g.with_error(message))?;
        tracing::warn!(
            id = %group.id,
            error = group.loading_error.as_deref().unwrap_or_default(),
            "group failed to load"
        );
        Ok(())
    }

    fn position(&self, target: GroupRef) -> Result<usize, RegistryError> {
        match target {
            GroupRef::Id(id) => self
                .groups
                .iter()
                .position(|g| g.id == id)
                .ok_or(RegistryError::UnknownId(id)),
            GroupRef::Index(index) if index < self.groups.len() => Ok(index),
            GroupRef::Index(index) => Err(RegistryError::UnknownIndex(index)),
        }
    }

    fn replace(
        &mut self,
        target: GroupRef,
        update: impl FnOnce(&Group) -> Group,
    ) -> Result<Arc<Group>, RegistryError> {
        let pos = self.position(target)?;
        let updated = Arc::new(update(&self.groups[pos]));
        self.groups[pos] = Arc::clone(&updated);
        Ok(updated)
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}
