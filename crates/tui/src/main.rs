mod cli;
mod renderer;
mod report;

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use profdiff_core::GroupRegistry;
use profdiff_core::model::GroupId;
use profdiff_core::parsers::load_batch;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, GroupSpec, OutputFormat};
use crate::report::ReportOptions;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// One group per spec, in command-line order. The first spec fills the
/// registry's default group.
///
/// A group whose files fail to load keeps its error and the run goes on,
/// so the report still covers the other groups.
fn build_registry(specs: &[GroupSpec]) -> Result<GroupRegistry> {
    let mut registry = GroupRegistry::new();

    for (index, spec) in specs.iter().enumerate() {
        if index > 0 {
            registry.add_group();
        }
        if let Some(name) = &spec.name {
            registry.rename_group(index, name.as_str())?;
        }
        if spec.files.is_empty() {
            tracing::debug!(index, "group has no files, leaving it empty");
            continue;
        }
        match load_batch(&spec.files) {
            Ok(traces) => {
                registry.ingest(index, traces)?;
            }
            Err(err) => {
                tracing::debug!(index, file = err.file_name(), "group batch rejected");
                registry.report_error(index, err.to_string())?;
            }
        }
    }
    Ok(registry)
}

fn resolve_baseline(registry: &GroupRegistry, position: Option<usize>) -> Result<Option<GroupId>> {
    let Some(position) = position else {
        return Ok(None);
    };
    match registry.groups().get(position.saturating_sub(1)) {
        Some(group) => Ok(Some(group.id)),
        None => bail!(
            "--baseline {position} is out of range ({} group(s) given)",
            registry.groups().len()
        ),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = build_registry(&cli.groups)?;
    if let Some(name) = &cli.component
        && !report::is_known_component(registry.groups(), name)
    {
        tracing::warn!(component = %name, "no group has a component with this name");
    }
    let options = ReportOptions {
        metric: cli.metric.into(),
        baseline: resolve_baseline(&registry, cli.baseline)?,
        component: cli.component,
        top: cli.top,
    };

    match cli.format {
        OutputFormat::Text => {
            let mut out = io::stdout().lock();
            report::write_text(&mut out, registry.groups(), &options)
                .context("failed to write report")?;
            out.flush()?;
        }
        OutputFormat::Json => {
            let mut out = io::stdout().lock();
            report::write_json(&mut out, registry.groups(), &options)?;
            out.flush()?;
        }
        OutputFormat::Tui => renderer::render_tui(&registry, &options)?,
    }
    Ok(())
}
