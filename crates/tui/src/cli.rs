//! Command-line arguments.

use std::path::PathBuf;
use std::str::FromStr;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use profdiff_core::compare::DurationMetric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text report on stdout (default)
    Text,
    /// JSON report on stdout
    Json,
    /// Interactive terminal view
    Tui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Component time including children
    Actual,
    /// Component time excluding children
    #[value(name = "self")]
    SelfTime,
}

impl From<MetricArg> for DurationMetric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::Actual => DurationMetric::Actual,
            MetricArg::SelfTime => DurationMetric::SelfTime,
        }
    }
}

/// One `--group` argument: an optional name and the files measured for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: Option<String>,
    pub files: Vec<PathBuf>,
}

impl FromStr for GroupSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, files) = match s.split_once('=') {
            Some(("", _)) => return Err(format!("empty group name in `{s}`")),
            Some((name, files)) => (Some(name.to_string()), files),
            None => (None, s),
        };
        let files = files
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .collect();
        Ok(Self { name, files })
    }
}

#[derive(Parser, Debug)]
#[command(name = "profdiff")]
#[command(version)]
#[command(
    about = "Compare React DevTools profiler exports across groups of runs",
    long_about = None
)]
pub struct Cli {
    /// Group of trace files as `[NAME=]a.json,b.json` (repeat for each group)
    #[arg(short, long = "group", value_name = "[NAME=]FILES", required = true)]
    pub groups: Vec<GroupSpec>,

    /// Position (1-based) of the group the others are compared against
    #[arg(
        short,
        long,
        value_name = "N",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub baseline: Option<usize>,

    /// Component duration used for rankings and component comparison
    #[arg(short, long, value_enum, default_value = "actual")]
    pub metric: MetricArg,

    /// Compare this component across all groups
    #[arg(short, long, value_name = "NAME")]
    pub component: Option<String>,

    /// Number of components listed per group
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub top: usize,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log aggregation steps to stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}
