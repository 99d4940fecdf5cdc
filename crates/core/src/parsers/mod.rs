pub mod react;

use std::path::Path;

use rayon::prelude::*;
use thiserror::Error;

use crate::model::LoadedTrace;

pub use react::{TraceParseError, parse_trace_file};

/// Why a batch of trace files could not be loaded. The `Display` output is
/// what ends up as a group's loading error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no trace files selected")]
    NoFiles,
    #[error("failed to read {file_name}: {source}")]
    Read {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file_name}: {source}")]
    Parse {
        file_name: String,
        #[source]
        source: TraceParseError,
    },
}

impl LoadError {
    pub fn file_name(&self) -> Option<&str> {
        match self {
            LoadError::NoFiles => None,
            LoadError::Read { file_name, .. } | LoadError::Parse { file_name, .. } => {
                Some(file_name)
            }
        }
    }
}

/// Parse in-memory bytes, attributing failures to `file_name`.
pub fn parse_named(file_name: impl Into<String>, data: &[u8]) -> Result<LoadedTrace, LoadError> {
    let file_name = file_name.into();
    match parse_trace_file(data) {
        Ok(trace) => {
            tracing::trace!(file = %file_name, roots = trace.roots.len(), "parsed trace");
            Ok(LoadedTrace { file_name, trace })
        }
        Err(source) => Err(LoadError::Parse { file_name, source }),
    }
}

/// Read and parse one trace file from disk.
pub fn load_file(path: &Path) -> Result<LoadedTrace, LoadError> {
    let file_name = display_name(path);
    let data = std::fs::read(path).map_err(|source| LoadError::Read {
        file_name: file_name.clone(),
        source,
    })?;
    tracing::debug!(file = %file_name, bytes = data.len(), "read trace file");
    parse_named(file_name, &data)
}

/// Load a whole batch, reading files in parallel on the rayon pool.
///
/// All or nothing: the first failing file (in input order) fails the batch,
/// so a group is never fed a partial selection. Results keep input order.
pub fn load_batch<P>(paths: &[P]) -> Result<Vec<LoadedTrace>, LoadError>
where
    P: AsRef<Path> + Sync,
{
    if paths.is_empty() {
        return Err(LoadError::NoFiles);
    }

    let results: Vec<Result<LoadedTrace, LoadError>> = paths
        .par_iter()
        .map(|path| load_file(path.as_ref()))
        .collect();
    results.into_iter().collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
