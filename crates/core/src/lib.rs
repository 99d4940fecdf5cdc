//! Aggregation and comparison engine for React DevTools profiler exports.
//!
//! Trace files are parsed into [`model::TraceFile`]s, reduced per file and
//! per group by [`aggregate`], and stored in a [`registry::GroupRegistry`].
//! [`compare`] derives baseline-relative views from the stored groups.

pub mod aggregate;
pub mod compare;
pub mod model;
pub mod parsers;
pub mod registry;

pub use registry::{GroupRef, GroupRegistry, RegistryError};
