//! Insight Service - the operations exposed over a dataset directory

use std::collections::BTreeMap;

use tracing::info;

use crate::cache::DataAccessor;
use crate::config::PrismConfig;
use crate::error::{Error, Result};
use crate::insights::{InsightContext, InsightEngine, InsightOutcome};
use crate::loader::{CsvTableLoader, TableLoader};
use crate::profile::{self, DataBundle, DataInfo, FeatureSlices};
use crate::ranking::{self, RecordInsightCount, RecordSubspaceCount, SubspaceInsightCount};
use crate::resolver::resolve_subspace;
use crate::table::Table;

pub struct InsightService<L> {
    accessor: DataAccessor<L>,
    engine: InsightEngine,
    config: PrismConfig,
}

impl InsightService<CsvTableLoader> {
    /// Service over the CSV directory named by the config
    pub fn from_config(config: PrismConfig) -> Self {
        let loader = CsvTableLoader::new(&config.data_dir);
        Self::new(loader, config)
    }
}

impl<L: TableLoader> InsightService<L> {
    pub fn new(loader: L, config: PrismConfig) -> Self {
        Self {
            accessor: DataAccessor::new(loader, config.cache_ttl),
            engine: InsightEngine::new(config.engine.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PrismConfig {
        &self.config
    }

    pub fn accessor(&self) -> &DataAccessor<L> {
        &self.accessor
    }

    pub fn read_dataset_names(&self) -> Result<Vec<String>> {
        self.accessor.loader().dataset_names()
    }

    pub fn data_by_name(&self, name: &str) -> Result<DataBundle> {
        let record = self.accessor.record(name)?;
        let insight = self.accessor.insight(name)?;
        let edge = self.accessor.edge(name)?;
        let subspace = self.accessor.subspace(name)?;
        Ok(DataBundle::new(&record, &insight, &edge, &subspace))
    }

    pub fn insight_count_for_record(&self, name: &str) -> Result<Vec<RecordInsightCount>> {
        let insight = self.accessor.insight(name)?;
        let sid_cid = self.accessor.sid_cid(name)?;
        Ok(ranking::insight_count_per_record(&insight, &sid_cid))
    }

    pub fn insight_count_for_subspace(&self, name: &str) -> Result<Vec<SubspaceInsightCount>> {
        let insight = self.accessor.insight(name)?;
        let subspace = self.accessor.subspace(name)?;
        Ok(ranking::insight_count_per_subspace(&insight, &subspace))
    }

    pub fn subspace_count_for_record(&self, name: &str) -> Result<Vec<RecordSubspaceCount>> {
        let record = self.accessor.record(name)?;
        let sid_cid = self.accessor.sid_cid(name)?;
        ranking::subspace_count_per_record(&record, &sid_cid)
    }

    /// Records of one subspace, without `cid`
    pub fn resolve(&self, name: &str, sid: i64) -> Result<Table> {
        let record = self.accessor.record(name)?;
        let sid_cid = self.accessor.sid_cid(name)?;
        resolve_subspace(&record, &sid_cid, sid)
    }

    /// Recompute one catalogued insight
    pub fn insight_by_iid(&self, iid: i64, name: &str) -> Result<InsightOutcome> {
        let insights = self.accessor.insight(name)?;
        let entry = insights
            .get(iid)
            .ok_or_else(|| Error::NotFound(format!("Insight {} in dataset {}", iid, name)))?;
        let subspaces = self.accessor.subspace(name)?;
        let subspace = subspaces.get(entry.sid).ok_or_else(|| {
            Error::InvalidData(format!(
                "Insight {} refers to unknown subspace {}",
                iid, entry.sid
            ))
        })?;
        let record = self.accessor.record(name)?;
        let subset = self.resolve(name, entry.sid)?;

        let ctx = InsightContext {
            entry,
            features: subspaces.features(),
            subspace,
            subset: &subset,
            record: &record,
        };
        let outcome = self.engine.compute(&ctx)?;
        info!(
            dataset = name,
            iid,
            kind = %entry.kind,
            rendered = outcome.is_rendered(),
            "Insight computed"
        );
        Ok(outcome)
    }

    pub fn data_info(&self, name: &str) -> Result<DataInfo> {
        let record = self.accessor.record(name)?;
        let insight = self.accessor.insight(name)?;
        profile::data_info(
            name,
            self.config.description_for(name),
            &record,
            &insight,
            &self.config.profile,
        )
    }

    pub fn attribute_map(&self, name: &str) -> Result<BTreeMap<String, BTreeMap<String, usize>>> {
        let record = self.accessor.record(name)?;
        let subspace = self.accessor.subspace(name)?;
        profile::attribute_map(&record, subspace.features())
    }

    pub fn feature_attribution(&self, name: &str) -> Result<Vec<FeatureSlices>> {
        let record = self.accessor.record(name)?;
        let subspace = self.accessor.subspace(name)?;
        profile::feature_attribution(&record, subspace.features())
    }
}
