//! Insight command

use std::io::Write;

use anyhow::{Context, Result};
use prism_core::{InsightOutcome, InsightService, TableLoader};

use super::core::Output;

/// Recompute one insight; "nothing to render" outcomes are printed, not errors
pub fn cmd_insight<L: TableLoader>(
    service: &InsightService<L>,
    name: &str,
    iid: i64,
    output: &Output,
    out: &mut impl Write,
) -> Result<()> {
    let outcome = service
        .insight_by_iid(iid, name)
        .with_context(|| format!("Failed to compute insight {} of '{}'", iid, name))?;

    match &outcome {
        InsightOutcome::Rendered(result) => {
            tracing::debug!(iid, sentence = %result.sentence, "Insight rendered");
        }
        InsightOutcome::NothingToRender { reason, .. } => {
            tracing::warn!(iid, ?reason, "Nothing to render");
        }
    }
    output.emit(out, &outcome)
}
