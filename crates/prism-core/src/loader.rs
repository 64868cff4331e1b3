//! Table loading
//!
//! [`TableLoader`] is the boundary to wherever datasets live. The bundled
//! [`CsvTableLoader`] reads one CSV file per table from a directory layout:
//!
//! ```text
//! <root>/record/record_<name>.csv
//! <root>/subspace/subspace_<name>.csv
//! <root>/sid_cid/sid_cid_<name>.csv
//! <root>/insight/insight_<name>.csv
//! <root>/edge/edge_<name>.csv
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{InsightTable, SidCidTable, SubspaceTable, Tables};
use crate::table::Table;

/// The five tables of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Record,
    Subspace,
    SidCid,
    Insight,
    Edge,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Record => "record",
            TableKind::Subspace => "subspace",
            TableKind::SidCid => "sid_cid",
            TableKind::Insight => "insight",
            TableKind::Edge => "edge",
        }
    }

    pub fn all() -> &'static [TableKind] {
        &[
            TableKind::Record,
            TableKind::Subspace,
            TableKind::SidCid,
            TableKind::Insight,
            TableKind::Edge,
        ]
    }

    /// Whether `column` of this table is read as text regardless of content
    ///
    /// Subspace cells and insight annotations are compared against record
    /// cells later, so they keep their written form until then.
    pub fn keeps_text(&self, column: &str) -> bool {
        match self {
            TableKind::Subspace => column != "sid",
            TableKind::Insight => column != "iid" && column != "sid",
            TableKind::Record | TableKind::SidCid | TableKind::Edge => false,
        }
    }

    /// File name of this table for a dataset
    pub fn file_name(&self, dataset: &str) -> String {
        format!("{}_{}.csv", self.as_str(), dataset)
    }
}

/// Source of dataset tables
pub trait TableLoader: Send + Sync {
    /// Names of every available dataset, sorted
    fn dataset_names(&self) -> Result<Vec<String>>;

    fn load_record(&self, name: &str) -> Result<Table>;

    fn load_subspace(&self, name: &str) -> Result<SubspaceTable>;

    fn load_sid_cid(&self, name: &str) -> Result<SidCidTable>;

    fn load_insight(&self, name: &str) -> Result<InsightTable>;

    fn load_edge(&self, name: &str) -> Result<Table>;

    /// Load all five tables at once
    fn load_tables(&self, name: &str) -> Result<Tables> {
        Ok(Tables {
            record: self.load_record(name)?,
            subspace: self.load_subspace(name)?,
            sid_cid: self.load_sid_cid(name)?,
            insight: self.load_insight(name)?,
            edge: self.load_edge(name)?,
        })
    }
}

fn read_cells<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut cells = Vec::new();
    for result in rdr.records() {
        let record = result?;
        cells.push(record.iter().map(str::to_string).collect());
    }
    Ok((columns, cells))
}

/// Parse a headed CSV stream into a typed table
pub fn parse_table<R: Read>(reader: R) -> Result<Table> {
    let (columns, cells) = read_cells(reader)?;
    Table::from_text(columns, cells)
}

/// Parse one of a dataset's tables, keeping its text columns as text
pub fn parse_dataset_table<R: Read>(kind: TableKind, reader: R) -> Result<Table> {
    let (columns, cells) = read_cells(reader)?;
    Table::from_text_with(columns, cells, |c| kind.keeps_text(c))
}

/// Dataset name from a table file name: the text after the last `_`
/// of everything before the first `.`
fn dataset_name_from_file(file_name: &str) -> Option<&str> {
    let stem = file_name.split('.').next()?;
    let name = stem.rsplit('_').next()?;
    (!name.is_empty()).then_some(name)
}

/// Loads datasets from CSV files under a root directory
#[derive(Debug, Clone)]
pub struct CsvTableLoader {
    root: PathBuf,
}

impl CsvTableLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, kind: TableKind, name: &str) -> PathBuf {
        self.root.join(kind.as_str()).join(kind.file_name(name))
    }

    fn read_table(&self, kind: TableKind, name: &str) -> Result<Table> {
        let path = self.table_path(kind, name);
        if !path.is_file() {
            return Err(Error::DatasetNotFound(format!(
                "{} ({} table missing at {})",
                name,
                kind.as_str(),
                path.display()
            )));
        }
        let table = parse_dataset_table(kind, fs::File::open(&path)?)?;
        debug!(
            dataset = name,
            table = kind.as_str(),
            rows = table.len(),
            "Loaded table"
        );
        Ok(table)
    }
}

impl TableLoader for CsvTableLoader {
    fn dataset_names(&self) -> Result<Vec<String>> {
        let dir = self.root.join(TableKind::Insight.as_str());
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "Insight directory missing, no datasets");
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !file_name.ends_with(".csv") {
                continue;
            }
            if let Some(name) = dataset_name_from_file(file_name) {
                names.push(name.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn load_record(&self, name: &str) -> Result<Table> {
        self.read_table(TableKind::Record, name)
    }

    fn load_subspace(&self, name: &str) -> Result<SubspaceTable> {
        SubspaceTable::from_table(self.read_table(TableKind::Subspace, name)?)
    }

    fn load_sid_cid(&self, name: &str) -> Result<SidCidTable> {
        SidCidTable::from_table(&self.read_table(TableKind::SidCid, name)?)
    }

    fn load_insight(&self, name: &str) -> Result<InsightTable> {
        InsightTable::from_table(self.read_table(TableKind::Insight, name)?)
    }

    fn load_edge(&self, name: &str) -> Result<Table> {
        self.read_table(TableKind::Edge, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnType, Value};
    use crate::test_utils::{write_fixture, FIXTURE_DATASET};

    #[test]
    fn test_parse_table_from_reader() {
        let csv = "cid,Brand,Sales\n1,BMW,100\n2,Ford,50\n";
        let table = parse_table(csv.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["cid", "Brand", "Sales"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_type("Sales").unwrap(), ColumnType::Int);
        assert_eq!(table.rows()[1][1], Value::Str("Ford".into()));
    }

    #[test]
    fn test_parse_table_flexible_rows() {
        let csv = "a,b,c\n1,2\n3,4,5\n";
        let table = parse_table(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_type("c").unwrap(), ColumnType::Float);
    }

    #[test]
    fn test_dataset_tables_keep_written_codes() {
        let csv = "Code,Year,sid\n007,2012,0\n*,*,1\n";
        let subspace = parse_dataset_table(TableKind::Subspace, csv.as_bytes()).unwrap();
        assert_eq!(subspace.rows()[0][0], Value::Str("007".into()));
        assert_eq!(subspace.rows()[0][1], Value::Str("2012".into()));
        assert_eq!(subspace.rows()[0][2], Value::Int(0));
        assert!(subspace.rows()[1][0].is_wildcard());

        let csv = "iid,sid,breakdown_value,Correlated Code\n0,1,02134,007\n";
        let insight = parse_dataset_table(TableKind::Insight, csv.as_bytes()).unwrap();
        assert_eq!(insight.column_type("iid").unwrap(), ColumnType::Int);
        assert_eq!(insight.rows()[0][2], Value::Str("02134".into()));
        assert_eq!(insight.rows()[0][3], Value::Str("007".into()));

        let record = parse_dataset_table(TableKind::Record, "cid,Code\n1,007\n".as_bytes()).unwrap();
        assert_eq!(record.rows()[0][1], Value::Int(7));
    }

    #[test]
    fn test_dataset_name_from_file() {
        assert_eq!(dataset_name_from_file("insight_carSales1.csv"), Some("carSales1"));
        assert_eq!(dataset_name_from_file("insight_my_data.csv"), Some("data"));
        assert_eq!(dataset_name_from_file("insight_.csv"), None);
    }

    #[test]
    fn test_csv_loader_reads_fixture() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path()).unwrap();
        let loader = CsvTableLoader::new(dir.path());

        assert_eq!(loader.dataset_names().unwrap(), vec![FIXTURE_DATASET]);

        let tables = loader.load_tables(FIXTURE_DATASET).unwrap();
        assert_eq!(tables.record.len(), 8);
        assert_eq!(tables.subspace.features(), &["Year", "Brand"]);
        assert!(!tables.sid_cid.is_empty());
        assert!(tables.insight.get(0).is_some());
        assert_eq!(tables.edge.len(), 2);
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path()).unwrap();
        let loader = CsvTableLoader::new(dir.path());

        let err = loader.load_record("nope").unwrap_err();
        assert!(matches!(err, Error::DatasetNotFound(_)));
    }

    #[test]
    fn test_missing_root_has_no_datasets() {
        let loader = CsvTableLoader::new("/nonexistent/prism-data");
        assert!(loader.dataset_names().unwrap().is_empty());
    }
}
