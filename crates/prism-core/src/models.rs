//! Typed views over the five dataset tables
//!
//! The loader hands back generic [`Table`]s; these wrappers validate the
//! columns each table must carry and expose typed rows. The raw table is kept
//! alongside so bundles can pass it through untouched.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::insights::InsightKind;
use crate::table::{Table, Value};

/// Column prefix for the counterpart-subspace override columns
pub const CORRELATED_PREFIX: &str = "Correlated ";

fn id_at(row: &[Value], idx: usize, column: &str, table: &str) -> Result<i64> {
    row[idx].as_id().ok_or_else(|| {
        Error::InvalidData(format!(
            "{} table: '{}' must be an integer id, got '{}'",
            table, column, row[idx]
        ))
    })
}

/// Cell text with integral floats written without a fraction
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Wildcard => None,
        Value::Float(f) if f.is_nan() => None,
        Value::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        Value::Str(s) if s.trim().is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// One row of the subspace table
#[derive(Debug, Clone, PartialEq)]
pub struct Subspace {
    pub sid: i64,
    /// One cell per feature column, wildcard or concrete value (text as
    /// written when loaded through `parse_dataset_table`)
    pub cells: Vec<Value>,
}

impl Subspace {
    /// Number of unconstrained columns (higher = more general)
    pub fn wildcard_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_wildcard()).count()
    }
}

/// The subspace table: feature columns plus `sid`
#[derive(Debug, Clone)]
pub struct SubspaceTable {
    table: Table,
    features: Vec<String>,
    rows: Vec<Subspace>,
    by_sid: HashMap<i64, usize>,
}

impl SubspaceTable {
    pub fn from_table(table: Table) -> Result<Self> {
        let sid_idx = table.column_index("sid")?;
        let features: Vec<String> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != sid_idx)
            .map(|(_, c)| c.clone())
            .collect();

        let mut rows = Vec::with_capacity(table.len());
        let mut by_sid = HashMap::with_capacity(table.len());
        for row in table.rows() {
            let sid = id_at(row, sid_idx, "sid", "subspace")?;
            let cells = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != sid_idx)
                .map(|(_, v)| v.clone())
                .collect();
            if by_sid.insert(sid, rows.len()).is_some() {
                return Err(Error::InvalidData(format!("Duplicate subspace sid {}", sid)));
            }
            rows.push(Subspace { sid, cells });
        }

        Ok(Self {
            table,
            features,
            rows,
            by_sid,
        })
    }

    /// Attribute columns, in file order
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn get(&self, sid: i64) -> Option<&Subspace> {
        self.by_sid.get(&sid).map(|&i| &self.rows[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subspace> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

/// Membership of a case in a subspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidCid {
    pub sid: i64,
    pub cid: i64,
}

/// The resolved subspace membership relation
#[derive(Debug, Clone, Default)]
pub struct SidCidTable {
    rows: Vec<SidCid>,
}

impl SidCidTable {
    pub fn new(rows: Vec<SidCid>) -> Self {
        Self { rows }
    }

    pub fn from_table(table: &Table) -> Result<Self> {
        let sid_idx = table.column_index("sid")?;
        let cid_idx = table.column_index("cid")?;
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                Ok(SidCid {
                    sid: id_at(row, sid_idx, "sid", "sid_cid")?,
                    cid: id_at(row, cid_idx, "cid", "sid_cid")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SidCid] {
        &self.rows
    }

    /// Case ids of one subspace, in table order
    pub fn cids_of(&self, sid: i64) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().filter(move |r| r.sid == sid).map(|r| r.cid)
    }

    /// sid → case ids, each list in table order
    pub fn by_sid(&self) -> HashMap<i64, Vec<i64>> {
        let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in &self.rows {
            map.entry(row.sid).or_default().push(row.cid);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A catalogued insight
#[derive(Debug, Clone, PartialEq)]
pub struct InsightEntry {
    pub iid: i64,
    pub sid: i64,
    pub kind: InsightKind,
    /// Free-form category label from the `insight_type` column
    pub category: Option<String>,
    pub breakdown: String,
    /// Raw text of `breakdown_value`; see `coerce_breakdown_value`
    pub breakdown_value: Option<String>,
    pub measure: String,
    /// `Correlated <attr>` override cells keyed by attribute name
    pub correlated: Vec<(String, Value)>,
}

impl InsightEntry {
    /// Measure names (two for cross-measure kinds)
    pub fn measures(&self) -> Vec<&str> {
        self.measure.split(';').map(str::trim).collect()
    }

    /// Override cell for an attribute; `None` when the column is absent
    pub fn correlated_value(&self, attribute: &str) -> Option<&Value> {
        self.correlated
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, v)| v)
    }
}

/// The insight catalogue
#[derive(Debug, Clone)]
pub struct InsightTable {
    table: Table,
    rows: Vec<InsightEntry>,
    by_iid: HashMap<i64, usize>,
}

impl InsightTable {
    pub fn from_table(table: Table) -> Result<Self> {
        let iid_idx = table.column_index("iid")?;
        let sid_idx = table.column_index("sid")?;
        let kind_idx = table.column_index("insight")?;
        let breakdown_idx = table.column_index("breakdown")?;
        let measure_idx = table.column_index("measure")?;
        let category_idx = table.column_index("insight_type").ok();
        let value_idx = table.column_index("breakdown_value").ok();
        let correlated_cols: Vec<(usize, String)> = table
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                c.strip_prefix(CORRELATED_PREFIX)
                    .map(|attr| (i, attr.to_string()))
            })
            .collect();

        let mut rows = Vec::with_capacity(table.len());
        let mut by_iid = HashMap::with_capacity(table.len());
        for row in table.rows() {
            let iid = id_at(row, iid_idx, "iid", "insight")?;
            let entry = InsightEntry {
                iid,
                sid: id_at(row, sid_idx, "sid", "insight")?,
                kind: InsightKind::parse(&row[kind_idx].to_string()),
                category: category_idx.and_then(|i| cell_text(&row[i])),
                breakdown: row[breakdown_idx].to_string(),
                breakdown_value: value_idx.and_then(|i| cell_text(&row[i])),
                measure: row[measure_idx].to_string(),
                correlated: correlated_cols
                    .iter()
                    .map(|(i, attr)| (attr.clone(), row[*i].clone()))
                    .collect(),
            };
            if by_iid.insert(iid, rows.len()).is_some() {
                return Err(Error::InvalidData(format!("Duplicate insight iid {}", iid)));
            }
            rows.push(entry);
        }

        Ok(Self {
            table,
            rows,
            by_iid,
        })
    }

    pub fn get(&self, iid: i64) -> Option<&InsightEntry> {
        self.by_iid.get(&iid).map(|&i| &self.rows[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &InsightEntry> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Distinct insight kind names, first-seen order
    pub fn kind_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.rows {
            let name = entry.kind.as_str().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Distinct categories, first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for category in self.rows.iter().filter_map(|e| e.category.as_ref()) {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }

    /// Every measure column any insight names (cross-measure specs split)
    pub fn measure_columns(&self) -> Vec<String> {
        let mut measures: Vec<String> = Vec::new();
        for entry in &self.rows {
            for m in entry.measures() {
                if !measures.iter().any(|x| x == m) {
                    measures.push(m.to_string());
                }
            }
        }
        measures
    }
}

/// All five tables of one dataset
#[derive(Debug, Clone)]
pub struct Tables {
    pub record: Table,
    pub subspace: SubspaceTable,
    pub sid_cid: SidCidTable,
    pub insight: InsightTable,
    pub edge: Table,
}
