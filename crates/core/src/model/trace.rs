use serde::{Deserialize, Deserializer, Serialize};

/// Numeric fiber identity. Only meaningful inside the trace file that
/// declared it; two files may number the same component differently.
pub type ComponentId = u64;

/// A snapshot entry as exported by React DevTools: `[fiberID, node]`.
pub type SnapshotEntry = (ComponentId, SnapshotNode);

/// One React DevTools profiler export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceFile {
    /// Export format version, kept as written. Only its presence is checked.
    pub version: serde_json::Value,
    #[serde(rename = "dataForRoots")]
    pub roots: Vec<RootTrace>,
}

/// Recorded activity of a single render root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootTrace {
    #[serde(rename = "commitData", default, deserialize_with = "nullable_vec")]
    pub commits: Vec<CommitRecord>,
    /// Component tree snapshot. Absent in early export versions; malformed
    /// snapshot data is treated the same as absent.
    #[serde(rename = "snapshots", default, deserialize_with = "lenient_snapshots")]
    pub snapshot: Vec<SnapshotEntry>,
}

/// The part of a snapshot node this crate reads. Other node fields
/// (children, key, type, ...) are ignored on parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

impl SnapshotNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
        }
    }
}

/// A single render + commit cycle.
///
/// Timing fields are kept optional so that exports missing them still
/// parse; read them through the `*_ms` accessors, which default to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive_effect_duration: Option<f64>,
    #[serde(
        rename = "fiberActualDurations",
        default,
        deserialize_with = "nullable_vec"
    )]
    pub actual_durations: Vec<(ComponentId, f64)>,
    #[serde(
        rename = "fiberSelfDurations",
        default,
        deserialize_with = "nullable_vec"
    )]
    pub self_durations: Vec<(ComponentId, f64)>,
}

impl CommitRecord {
    pub fn duration_ms(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    pub fn effect_duration_ms(&self) -> f64 {
        self.effect_duration.unwrap_or(0.0)
    }

    pub fn passive_effect_duration_ms(&self) -> f64 {
        self.passive_effect_duration.unwrap_or(0.0)
    }
}

/// A parsed trace paired with the name of the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrace {
    pub file_name: String,
    pub trace: TraceFile,
}

impl LoadedTrace {
    pub fn new(file_name: impl Into<String>, trace: TraceFile) -> Self {
        Self {
            file_name: file_name.into(),
            trace,
        }
    }
}

/// `null` and a missing key both mean "no entries".
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_snapshots<'de, D>(deserializer: D) -> Result<Vec<SnapshotEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default())
}
