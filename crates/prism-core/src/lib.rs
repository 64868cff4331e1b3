//! Prism Core Library
//!
//! Insight statistics over datasets partitioned into subspaces:
//! - Typed tables and a CSV directory loader behind a trait
//! - Time-bounded memoization of loaded tables
//! - Subspace resolution (which records a subspace covers)
//! - The insight statistics engine and its sentence composer
//! - Insight-density rankings over records and subspaces
//! - Dataset profiling (column summaries, attribute maps, value shares)

pub mod cache;
pub mod config;
pub mod error;
pub mod insights;
pub mod loader;
pub mod models;
pub mod profile;
pub mod ranking;
pub mod resolver;
pub mod sentence;
pub mod service;
pub mod stats;
pub mod table;

/// Fixture datasets for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use cache::{DataAccessor, TtlCache};
pub use config::{ClusteringSettings, EngineSettings, PrismConfig, ProfileSettings};
pub use error::{Error, Result};
pub use insights::{
    InsightContext, InsightDetail, InsightEngine, InsightKind, InsightOutcome, InsightResult,
    NoRenderReason,
};
pub use loader::{CsvTableLoader, TableKind, TableLoader};
pub use models::{InsightEntry, InsightTable, SidCid, SidCidTable, Subspace, SubspaceTable, Tables};
pub use profile::{DataBundle, DataInfo, FeatureSlices};
pub use ranking::{RecordInsightCount, RecordSubspaceCount, SubspaceInsightCount};
pub use service::InsightService;
pub use table::{ColumnType, Table, Value};
