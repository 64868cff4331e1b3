//! Subspace resolution: which records a subspace covers

use std::collections::HashMap;

use crate::error::Result;
use crate::models::SidCidTable;
use crate::table::{Table, Value};

/// Records of subspace `sid`, in membership order, without the `cid` column
///
/// Membership rows pointing at unknown cases are skipped. An unknown `sid`
/// gives an empty table with the record's remaining columns.
pub fn resolve_subspace(record: &Table, sid_cid: &SidCidTable, sid: i64) -> Result<Table> {
    let cid_idx = record.column_index("cid")?;
    let row_of: HashMap<i64, usize> = record
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row[cid_idx].as_id().map(|cid| (cid, i)))
        .collect();

    let indices: Vec<usize> = sid_cid
        .cids_of(sid)
        .filter_map(|cid| row_of.get(&cid).copied())
        .collect();

    tracing::debug!(sid, rows = indices.len(), "Resolved subspace");
    record.take(&indices).drop_column("cid")
}

/// Records matching every `(column, value)` equality; wildcards match anything
///
/// Each value is read as the record column's type first, so a written
/// `"007"` matches text `"007"` in a code column and `"2012"` matches the
/// integer 2012 in a year column.
pub fn filter_by_constraints(record: &Table, constraints: &[(String, Value)]) -> Result<Table> {
    let mut active = Vec::with_capacity(constraints.len());
    for (column, value) in constraints {
        if value.is_wildcard() {
            continue;
        }
        let idx = record.column_index(column)?;
        active.push((idx, record.column_types()[idx].coerce(value)));
    }
    Ok(record.filter(|row| active.iter().all(|(idx, value)| &row[*idx] == value)))
}
