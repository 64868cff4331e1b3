//! Insight Engine - recomputes a catalogued insight over its subspace

use tracing::debug;

use crate::config::EngineSettings;
use crate::models::{InsightEntry, Subspace};
use crate::table::Table;
use crate::Result;

use super::describe::describe_subspace;
use super::types::{InsightDetail, InsightKind, InsightOutcome, InsightResult, NoRenderReason};
use super::{aggregate, cluster, trend};

/// Everything needed to compute one insight
pub struct InsightContext<'a> {
    pub entry: &'a InsightEntry,
    /// Subspace feature columns, in file order
    pub features: &'a [String],
    pub subspace: &'a Subspace,
    /// Records of the insight's subspace (no `cid`)
    pub subset: &'a Table,
    /// The whole record table, used for counterpart subsets
    pub record: &'a Table,
}

impl<'a> InsightContext<'a> {
    /// Phrases describing the insight's own subspace
    pub fn phrases(&self) -> Vec<String> {
        describe_subspace(self.features, &self.subspace.cells)
    }

    pub fn measure(&self) -> &'a str {
        self.entry.measure.trim()
    }

    pub fn breakdown(&self) -> &'a str {
        self.entry.breakdown.trim()
    }
}

/// Numbers plus narration produced by one kind
pub(crate) struct Rendered {
    pub detail: InsightDetail,
    pub sentence: String,
}

/// Computes insight statistics and sentences
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    settings: EngineSettings,
}

impl InsightEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Compute one insight
    ///
    /// Unknown kinds and empty subsets are reported as
    /// [`InsightOutcome::NothingToRender`], not as errors.
    pub fn compute(&self, ctx: &InsightContext<'_>) -> Result<InsightOutcome> {
        let entry = ctx.entry;
        let phrases = ctx.phrases();

        let rendered = match &entry.kind {
            InsightKind::Unsupported(kind) => {
                debug!(iid = entry.iid, kind = %kind, "Unsupported insight kind");
                return Ok(InsightOutcome::NothingToRender {
                    iid: entry.iid,
                    reason: NoRenderReason::UnsupportedKind { kind: kind.clone() },
                });
            }
            _ if ctx.subset.is_empty() => {
                debug!(iid = entry.iid, sid = entry.sid, "Insight subspace has no records");
                return Ok(InsightOutcome::NothingToRender {
                    iid: entry.iid,
                    reason: NoRenderReason::EmptySubset { sid: entry.sid },
                });
            }
            InsightKind::Top1 => aggregate::top1(ctx, &phrases, self.settings.top_n)?,
            InsightKind::Trend => trend::trend(ctx, &phrases)?,
            InsightKind::Correlation => trend::correlation(ctx, &phrases)?,
            InsightKind::ChangePoint | InsightKind::Outlier => aggregate::point(ctx, &phrases)?,
            InsightKind::Attribution => aggregate::attribution(ctx, &phrases)?,
            InsightKind::CrossMeasureCorrelation => cluster::cross_measure(ctx, &phrases)?,
            InsightKind::Clustering => cluster::clustering(ctx, &phrases, &self.settings)?,
        };
        debug!(
            iid = entry.iid,
            kind = %entry.kind,
            rows = ctx.subset.len(),
            "Insight computed"
        );

        Ok(InsightOutcome::Rendered(InsightResult {
            iid: entry.iid,
            insight_name: entry.kind.clone(),
            sentence: rendered.sentence,
            detail: rendered.detail,
        }))
    }
}
