//! Dataset commands: listing, bundles, subsets, profiles

use std::io::Write;

use anyhow::{Context, Result};
use prism_core::{InsightService, TableLoader};

use super::core::Output;

pub fn cmd_datasets<L: TableLoader>(
    service: &InsightService<L>,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let names = service
        .read_dataset_names()
        .context("Failed to list datasets")?;
    if names.is_empty() {
        tracing::warn!(
            data_dir = %service.config().data_dir.display(),
            "No datasets found"
        );
    }
    output.emit(out, &names)
}

pub fn cmd_bundle<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let bundle = service
        .data_by_name(name)
        .with_context(|| format!("Failed to load dataset '{}'", name))?;
    output.emit(out, &bundle)
}

pub fn cmd_subset<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    sid: i64,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let subset = service
        .resolve(name, sid)
        .with_context(|| format!("Failed to resolve subspace {} of '{}'", sid, name))?;
    output.emit(out, &subset)
}

pub fn cmd_info<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let info = service
        .data_info(name)
        .with_context(|| format!("Failed to profile dataset '{}'", name))?;
    output.emit(out, &info)
}

pub fn cmd_attributes<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let map = service
        .attribute_map(name)
        .with_context(|| format!("Failed to map attributes of '{}'", name))?;
    output.emit(out, &map)
}

pub fn cmd_slices<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let slices = service
        .feature_attribution(name)
        .with_context(|| format!("Failed to compute feature shares of '{}'", name))?;
    output.emit(out, &slices)
}
