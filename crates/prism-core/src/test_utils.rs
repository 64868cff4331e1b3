//! Test utilities for prism-core
//!
//! Provides the small `cars` dataset used across unit, crate and CLI tests,
//! either as parsed tables or written out as a CSV data directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::config::PrismConfig;
use crate::loader::{parse_dataset_table, CsvTableLoader, TableKind};
use crate::models::{InsightTable, SidCidTable, SubspaceTable, Tables};
use crate::service::InsightService;

/// Name of the fixture dataset
pub const FIXTURE_DATASET: &str = "cars";

pub const RECORD_CSV: &str = "\
cid,Year,Brand,Sales,Profit
1,2010,BMW,100,10
2,2010,Ford,50,4
3,2011,BMW,150,16
4,2011,Ford,60,5
5,2012,BMW,300,28
6,2012,Ford,150,13
7,2013,BMW,350,30
8,2013,Ford,40,6
";

pub const SUBSPACE_CSV: &str = "\
Year,Brand,sid
*,*,0
*,BMW,1
*,Ford,2
2012,*,3
2012,BMW,4
2014,*,5
";

pub const SID_CID_CSV: &str = "\
sid,cid
0,1
0,2
0,3
0,4
0,5
0,6
0,7
0,8
1,1
1,3
1,5
1,7
2,2
2,4
2,6
2,8
3,5
3,6
4,5
";

pub const INSIGHT_CSV: &str = "\
iid,sid,insight,insight_type,breakdown,breakdown_value,measure,Correlated Year,Correlated Brand
0,0,change point,point,Year,2012,Sales,*,*
1,1,trend,shape,Year,*,Sales,*,*
2,0,attribution,compound,Brand,*,Sales,*,*
3,1,correlation,compound,Year,*,Sales,*,Ford
4,0,top1,point,Brand,BMW,Sales,*,*
5,0,cross measure correlation,compound,Year,*,Sales;Profit,*,*
6,0,clustering,compound,Brand,*,Sales;Profit,*,*
7,3,outlier,point,Brand,Ford,Sales,*,*
8,2,unsupported,point,Year,*,Sales,*,*
9,5,top1,point,Brand,*,Sales,*,*
";

pub const EDGE_CSV: &str = "\
source,target
0,1
1,2
";

fn csv_for(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Record => RECORD_CSV,
        TableKind::Subspace => SUBSPACE_CSV,
        TableKind::SidCid => SID_CID_CSV,
        TableKind::Insight => INSIGHT_CSV,
        TableKind::Edge => EDGE_CSV,
    }
}

/// The fixture dataset as parsed tables
pub fn fixture_tables() -> Tables {
    let parse = |kind| parse_dataset_table(kind, csv_for(kind).as_bytes()).unwrap();
    Tables {
        record: parse(TableKind::Record),
        subspace: SubspaceTable::from_table(parse(TableKind::Subspace)).unwrap(),
        sid_cid: SidCidTable::from_table(&parse(TableKind::SidCid)).unwrap(),
        insight: InsightTable::from_table(parse(TableKind::Insight)).unwrap(),
        edge: parse(TableKind::Edge),
    }
}

/// Write the fixture dataset under `root` in the CSV loader layout
pub fn write_fixture(root: &Path) -> std::io::Result<()> {
    for kind in TableKind::all() {
        let dir = root.join(kind.as_str());
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(kind.file_name(FIXTURE_DATASET)), csv_for(*kind))?;
    }
    Ok(())
}

/// A temporary data directory holding the fixture dataset
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_fixture(dir.path()).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default config pointed at this directory
    pub fn config(&self) -> PrismConfig {
        PrismConfig::default().with_data_dir(self.path())
    }

    pub fn service(&self) -> InsightService<CsvTableLoader> {
        InsightService::from_config(self.config())
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}
