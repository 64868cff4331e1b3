//! In-memory tables of typed scalar cells
//!
//! Tables are loaded once per cache epoch and never mutated afterwards. Every
//! derivation (filters, projections, group-by sums) produces a fresh table or
//! vector.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Cell marker meaning "unconstrained" in subspace and override columns
pub const WILDCARD: &str = "*";

/// A single typed cell
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Wildcard,
}

impl Value {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Value::Wildcard)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Blank text or NaN: a cell with no value
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the cell as an integer id (`sid`, `cid`, `iid`)
    pub fn as_id(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Int(_) | Value::Float(_) => 0,
            Value::Str(_) => 1,
            Value::Wildcard => 2,
        }
    }

    /// JSON form used when rendering tables as records
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Wildcard => serde_json::Value::String(WILDCARD.to_string()),
        }
    }
}

// Numbers compare numerically across Int/Float, then strings, then wildcards.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Wildcard, Value::Wildcard) => Ordering::Equal,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.type_rank().cmp(&b.type_rank()),
            },
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Integral floats keep a trailing ".0" so they read differently from ints
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::Wildcard => write!(f, "{}", WILDCARD),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Wildcard => serializer.serialize_str(WILDCARD),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        if s == WILDCARD {
            Value::Wildcard
        } else {
            Value::Str(s.to_string())
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// Inferred type of a column (wildcard cells are ignored during inference)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Int,
    Float,
    Str,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }

    /// Infer a column type from raw cell text
    fn infer<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> Self {
        let present = cells.filter(|c| *c != WILDCARD && !c.trim().is_empty());
        let mut any = false;
        let mut all_int = true;
        for cell in present {
            any = true;
            if cell.trim().parse::<i64>().is_err() {
                all_int = false;
                if cell.trim().parse::<f64>().is_err() {
                    return ColumnType::Str;
                }
            }
        }
        if !any {
            return ColumnType::Str;
        }
        if all_int {
            ColumnType::Int
        } else {
            ColumnType::Float
        }
    }

    /// Re-read `value` as a cell of this column type
    ///
    /// Text is parsed the way a loaded cell would be; numbers meeting a text
    /// column compare by their written form. Wildcards pass through.
    pub fn coerce(&self, value: &Value) -> Value {
        match (self, value) {
            (_, Value::Wildcard) => Value::Wildcard,
            (_, Value::Str(raw)) => self.parse_cell(raw),
            (ColumnType::Str, number) => Value::Str(number.to_string()),
            (_, number) => number.clone(),
        }
    }

    fn parse_cell(&self, raw: &str) -> Value {
        if raw == WILDCARD {
            return Value::Wildcard;
        }
        let trimmed = raw.trim();
        match self {
            ColumnType::Int => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or(Value::Float(f64::NAN)),
            ColumnType::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or(Value::Float(f64::NAN)),
            ColumnType::Str => Value::Str(raw.to_string()),
        }
    }
}

/// One aggregated group from [`Table::group_sum`]
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSum {
    pub key: Value,
    pub sums: Vec<Value>,
}

impl GroupSum {
    /// Sum at `index` as a float (NaN only if the sum itself is undefined)
    pub fn sum_f64(&self, index: usize) -> f64 {
        self.sums
            .get(index)
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN)
    }
}

/// An ordered, column-typed table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from already-typed rows
    pub fn new(columns: Vec<String>, types: Vec<ColumnType>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if columns.len() != types.len() {
            return Err(Error::InvalidData(format!(
                "{} columns but {} column types",
                columns.len(),
                types.len()
            )));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(Error::InvalidData(format!(
                "Row {} has {} cells, expected {}",
                bad,
                rows[bad].len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            types,
            rows,
        })
    }

    /// Build a table from raw text cells, inferring one type per column
    ///
    /// Missing trailing cells are treated as empty strings. Empty cells in
    /// numeric columns become NaN floats (and promote an integer column to
    /// float), mirroring how missing measurements behave in aggregation.
    pub fn from_text(columns: Vec<String>, cells: Vec<Vec<String>>) -> Result<Self> {
        Self::from_text_with(columns, cells, |_| false)
    }

    /// Like [`Table::from_text`], but columns named by `keep_text` stay text
    /// whatever their cells look like (`"007"` stays `"007"`)
    pub fn from_text_with(
        columns: Vec<String>,
        cells: Vec<Vec<String>>,
        keep_text: impl Fn(&str) -> bool,
    ) -> Result<Self> {
        let width = columns.len();
        let cells: Vec<Vec<String>> = cells
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        let mut types = Vec::with_capacity(width);
        for (col, name) in columns.iter().enumerate() {
            if keep_text(name) {
                types.push(ColumnType::Str);
                continue;
            }
            let column_cells = cells.iter().map(|r| r[col].as_str());
            let mut ty = ColumnType::infer(column_cells.clone());
            if ty == ColumnType::Int && column_cells.clone().any(|c| c.trim().is_empty()) {
                ty = ColumnType::Float;
            }
            types.push(ty);
        }

        let rows = cells
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&types)
                    .map(|(cell, ty)| ty.parse_cell(cell))
                    .collect()
            })
            .collect();

        Self::new(columns, types, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::InvalidData(format!("Unknown column: {}", name)))
    }

    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(self.types[self.column_index(name)?])
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.types
    }

    /// All cells of one column, in row order
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Copy of the rows at `indices` (in the given order, duplicates allowed)
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            types: self.types.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Rows for which `predicate` holds
    pub fn filter(&self, predicate: impl Fn(&[Value]) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            types: self.types.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Copy of the table without `name`
    pub fn drop_column(&self, name: &str) -> Result<Table> {
        let idx = self.column_index(name)?;
        let keep = |i: usize| i != idx;
        Ok(Table {
            columns: self
                .columns
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, c)| c.clone())
                .collect(),
            types: self
                .types
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, t)| *t)
                .collect(),
            rows: self
                .rows
                .iter()
                .map(|r| {
                    r.iter()
                        .enumerate()
                        .filter(|(i, _)| keep(*i))
                        .map(|(_, v)| v.clone())
                        .collect()
                })
                .collect(),
        })
    }

    /// Group rows by `by` (keys ascending) and sum each of `measures`
    ///
    /// Rows with a missing key (blank text or NaN) belong to no group.
    /// Integer measure columns produce integer sums; float columns skip NaN
    /// cells. A non-numeric measure column is an error.
    pub fn group_sum(&self, by: &str, measures: &[&str]) -> Result<Vec<GroupSum>> {
        let key_idx = self.column_index(by)?;
        let mut measure_cols = Vec::with_capacity(measures.len());
        for measure in measures {
            let idx = self.column_index(measure)?;
            if !self.types[idx].is_numeric() {
                return Err(Error::InvalidData(format!(
                    "Measure column '{}' is not numeric",
                    measure
                )));
            }
            measure_cols.push((idx, self.types[idx]));
        }

        let mut groups: BTreeMap<Value, Vec<Value>> = BTreeMap::new();
        for row in self.rows.iter().filter(|r| !r[key_idx].is_missing()) {
            let sums = groups.entry(row[key_idx].clone()).or_insert_with(|| {
                measure_cols
                    .iter()
                    .map(|(_, ty)| match ty {
                        ColumnType::Int => Value::Int(0),
                        _ => Value::Float(0.0),
                    })
                    .collect()
            });
            for (slot, (idx, _)) in sums.iter_mut().zip(&measure_cols) {
                *slot = add_cells(slot, &row[*idx]);
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, sums)| GroupSum { key, sums })
            .collect())
    }

    /// Render rows as column-name → value maps
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), v.to_json()))
                    .collect()
            })
            .collect()
    }
}

fn add_cells(acc: &Value, cell: &Value) -> Value {
    match (acc, cell) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(*b)
            .map(Value::Int)
            .unwrap_or(Value::Float(*a as f64 + *b as f64)),
        (_, Value::Float(f)) if f.is_nan() => acc.clone(),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Value::Float(x + y),
            _ => acc.clone(),
        },
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_records().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample() -> Table {
        Table::from_text(
            vec!["cid".into(), "Brand".into(), "Sales".into(), "Margin".into()],
            text(&[
                &["1", "BMW", "100", "0.5"],
                &["2", "Ford", "50", "0.25"],
                &["3", "BMW", "150", "1"],
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_column_type_inference() {
        let table = sample();
        assert_eq!(table.column_type("cid").unwrap(), ColumnType::Int);
        assert_eq!(table.column_type("Brand").unwrap(), ColumnType::Str);
        assert_eq!(table.column_type("Sales").unwrap(), ColumnType::Int);
        assert_eq!(table.column_type("Margin").unwrap(), ColumnType::Float);
    }

    #[test]
    fn test_wildcards_ignored_during_inference() {
        let table = Table::from_text(
            vec!["Year".into(), "sid".into()],
            text(&[&["*", "0"], &["2012", "1"]]),
        )
        .unwrap();
        assert_eq!(table.column_type("Year").unwrap(), ColumnType::Int);
        assert!(table.rows()[0][0].is_wildcard());
        assert_eq!(table.rows()[1][0], Value::Int(2012));
    }

    #[test]
    fn test_missing_cells_promote_int_to_float() {
        let table = Table::from_text(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        )
        .unwrap();
        assert_eq!(table.column_type("b").unwrap(), ColumnType::Float);
        assert!(table.rows()[1][1].as_f64().unwrap().is_nan());
    }

    #[test]
    fn test_group_sum_sorted_keys() {
        let groups = sample().group_sum("Brand", &["Sales", "Margin"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, Value::Str("BMW".into()));
        assert_eq!(groups[0].sums[0], Value::Int(250));
        assert!((groups[0].sum_f64(1) - 1.5).abs() < 1e-12);
        assert_eq!(groups[1].key, Value::Str("Ford".into()));
    }

    #[test]
    fn test_group_sum_skips_missing_keys() {
        let table = Table::from_text(
            vec!["Brand".into(), "Year".into(), "Sales".into()],
            text(&[
                &["BMW", "2010", "1"],
                &["", "2011", "2"],
                &["Ford", "", "3"],
            ]),
        )
        .unwrap();

        let by_brand = table.group_sum("Brand", &["Sales"]).unwrap();
        let keys: Vec<&Value> = by_brand.iter().map(|g| &g.key).collect();
        assert_eq!(keys, vec![&Value::Str("BMW".into()), &Value::Str("Ford".into())]);

        // The blank year turns the column into floats with a NaN cell
        let by_year = table.group_sum("Year", &["Sales"]).unwrap();
        assert_eq!(by_year.len(), 2);
        assert_eq!(by_year[1].key, Value::Float(2011.0));
        assert_eq!(by_year[1].sums[0], Value::Int(2));
    }

    #[test]
    fn test_group_sum_rejects_text_measure() {
        let err = sample().group_sum("Sales", &["Brand"]).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_drop_column_and_records() {
        let table = sample().drop_column("cid").unwrap();
        assert_eq!(table.columns(), &["Brand", "Sales", "Margin"]);
        let records = table.to_records();
        assert_eq!(records[0]["Brand"], "BMW");
        assert_eq!(records[0]["Sales"], 100);
        assert!(records[0].get("cid").is_none());
    }

    #[test]
    fn test_from_text_with_keeps_text_columns() {
        let table = Table::from_text_with(
            vec!["Code".into(), "sid".into()],
            text(&[&["007", "0"], &["*", "1"]]),
            |c| c != "sid",
        )
        .unwrap();
        assert_eq!(table.column_type("Code").unwrap(), ColumnType::Str);
        assert_eq!(table.column_type("sid").unwrap(), ColumnType::Int);
        assert_eq!(table.rows()[0][0], Value::Str("007".into()));
        assert!(table.rows()[1][0].is_wildcard());
    }

    #[test]
    fn test_coerce_to_column_type() {
        let raw = Value::Str("007".into());
        assert_eq!(ColumnType::Str.coerce(&raw), Value::Str("007".into()));
        assert_eq!(ColumnType::Int.coerce(&raw), Value::Int(7));
        assert_eq!(ColumnType::Float.coerce(&Value::Str("2.5".into())), Value::Float(2.5));
        assert_eq!(ColumnType::Str.coerce(&Value::Int(2012)), Value::Str("2012".into()));
        assert!(ColumnType::Int.coerce(&Value::Wildcard).is_wildcard());
        assert!(ColumnType::Int.coerce(&Value::Str("A1".into())).is_missing());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(450).to_string(), "450");
        assert_eq!(Value::Float(450.0).to_string(), "450.0");
        assert_eq!(Value::Float(0.35).to_string(), "0.35");
        assert_eq!(Value::Wildcard.to_string(), "*");
    }

    #[test]
    fn test_value_ordering_mixes_numbers() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert!(Value::Int(1) < Value::Float(1.5));
        assert!(Value::Float(99.0) < Value::Str("a".into()));
        assert_ne!(Value::Int(2012), Value::Str("2012".into()));
    }
}
