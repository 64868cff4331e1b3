//! Ranking commands

use std::io::Write;

use anyhow::{Context, Result};
use prism_core::{InsightService, TableLoader};

use super::core::Output;

pub fn cmd_rank_records<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let ranked = service
        .insight_count_for_record(name)
        .with_context(|| format!("Failed to rank records of '{}'", name))?;
    output.emit(out, &ranked)
}

pub fn cmd_rank_subspaces<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let ranked = service
        .insight_count_for_subspace(name)
        .with_context(|| format!("Failed to rank subspaces of '{}'", name))?;
    output.emit(out, &ranked)
}

pub fn cmd_rank_memberships<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let ranked = service
        .subspace_count_for_record(name)
        .with_context(|| format!("Failed to rank memberships of '{}'", name))?;
    output.emit(out, &ranked)
}
