//! Aggregate Ranking Service - insight density over records and subspaces
//!
//! Every ranking is a stable sort, so rows with equal counts keep ascending
//! id order. Position in the returned vector is the rank.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::insights::describe_subspace;
use crate::models::{InsightTable, SidCidTable, SubspaceTable};
use crate::sentence::compose;
use crate::table::{Table, Value};

/// Insights touching one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordInsightCount {
    pub cid: i64,
    pub iids: Vec<i64>,
    pub iid_count: usize,
}

/// Insights catalogued for one subspace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubspaceInsightCount {
    pub sid: i64,
    pub iids: Vec<i64>,
    pub iid_count: usize,
    pub wildcard_count: usize,
    /// Constrained columns as a phrase list ("Year is 2012 and Brand is BMW")
    pub description: String,
    /// Feature column → subspace cell
    #[serde(flatten)]
    pub subspace: BTreeMap<String, Value>,
}

/// Subspaces containing one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSubspaceCount {
    pub cid: i64,
    pub sids: Vec<i64>,
    pub sid_count: usize,
}

/// Rank records by how many insights cover them
pub fn insight_count_per_record(
    insight: &InsightTable,
    sid_cid: &SidCidTable,
) -> Vec<RecordInsightCount> {
    let members = sid_cid.by_sid();
    let mut by_cid: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for entry in insight.iter() {
        for cid in members.get(&entry.sid).into_iter().flatten() {
            by_cid.entry(*cid).or_default().push(entry.iid);
        }
    }

    let mut ranked: Vec<RecordInsightCount> = by_cid
        .into_iter()
        .map(|(cid, iids)| RecordInsightCount {
            cid,
            iid_count: iids.len(),
            iids,
        })
        .collect();
    ranked.sort_by(|a, b| b.iid_count.cmp(&a.iid_count));
    ranked
}

/// Wildcard count of every subspace, keyed by sid
pub fn wildcard_counts(subspace: &SubspaceTable) -> HashMap<i64, usize> {
    subspace
        .iter()
        .map(|s| (s.sid, s.wildcard_count()))
        .collect()
}

/// Rank subspaces by insight count, more general subspaces first on ties
///
/// Insights whose sid has no subspace row are left out.
pub fn insight_count_per_subspace(
    insight: &InsightTable,
    subspace: &SubspaceTable,
) -> Vec<SubspaceInsightCount> {
    let mut by_sid: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for entry in insight.iter() {
        by_sid.entry(entry.sid).or_default().push(entry.iid);
    }
    let wildcards = wildcard_counts(subspace);
    let features = subspace.features();

    let mut ranked: Vec<SubspaceInsightCount> = by_sid
        .into_iter()
        .filter_map(|(sid, iids)| {
            let row = subspace.get(sid)?;
            Some(SubspaceInsightCount {
                sid,
                iid_count: iids.len(),
                iids,
                wildcard_count: wildcards.get(&sid).copied().unwrap_or(0),
                description: compose(&describe_subspace(features, &row.cells)),
                subspace: features.iter().cloned().zip(row.cells.iter().cloned()).collect(),
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.iid_count
            .cmp(&a.iid_count)
            .then_with(|| b.wildcard_count.cmp(&a.wildcard_count))
    });
    ranked
}

/// Rank records by how many subspaces contain them
pub fn subspace_count_per_record(
    record: &Table,
    sid_cid: &SidCidTable,
) -> Result<Vec<RecordSubspaceCount>> {
    let known: HashSet<i64> = record
        .column("cid")?
        .into_iter()
        .filter_map(Value::as_id)
        .collect();

    let mut by_cid: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for row in sid_cid.rows().iter().filter(|r| known.contains(&r.cid)) {
        by_cid.entry(row.cid).or_default().push(row.sid);
    }

    let mut ranked: Vec<RecordSubspaceCount> = by_cid
        .into_iter()
        .map(|(cid, sids)| RecordSubspaceCount {
            cid,
            sid_count: sids.len(),
            sids,
        })
        .collect();
    ranked.sort_by(|a, b| b.sid_count.cmp(&a.sid_count));
    Ok(ranked)
}
