//! Time-bounded memoization of loaded tables
//!
//! Entries are keyed by dataset name and shared as `Arc`s. Two callers that
//! miss at the same time may both run the producer; the later insert wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::Result;
use crate::loader::{TableKind, TableLoader};
use crate::models::{InsightTable, SidCidTable, SubspaceTable};
use crate::table::Table;

#[derive(Debug)]
struct CacheEntry<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.loaded_at.elapsed() >= ttl
    }
}

/// A keyed memo whose entries expire after a fixed TTL
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A panicking producer never holds the lock, so poisoning is recoverable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Fresh cached value for `key`, if any
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.read()
            .get(key)
            .filter(|e| !e.is_expired(self.ttl))
            .map(|e| Arc::clone(&e.value))
    }

    /// Return the cached value or run `producer` and remember its result
    ///
    /// Errors are returned as-is and never cached.
    pub fn memoize<F>(&self, key: &str, producer: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.get(key) {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        debug!(key, "Cache miss");
        let value = Arc::new(producer()?);

        let mut entries = self.write();
        let ttl = self.ttl;
        entries.retain(|_, e| !e.is_expired(ttl));
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: Arc::clone(&value),
                loaded_at: Instant::now(),
            },
        );
        Ok(value)
    }

    pub fn invalidate(&self, key: &str) {
        self.write().remove(key);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of stored entries, expired ones included until the next insert
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loader front that memoizes each table kind separately
pub struct DataAccessor<L> {
    loader: L,
    record: TtlCache<Table>,
    subspace: TtlCache<SubspaceTable>,
    sid_cid: TtlCache<SidCidTable>,
    insight: TtlCache<InsightTable>,
    edge: TtlCache<Table>,
}

impl<L: TableLoader> DataAccessor<L> {
    pub fn new(loader: L, ttl: Duration) -> Self {
        Self {
            loader,
            record: TtlCache::new(ttl),
            subspace: TtlCache::new(ttl),
            sid_cid: TtlCache::new(ttl),
            insight: TtlCache::new(ttl),
            edge: TtlCache::new(ttl),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn record(&self, name: &str) -> Result<Arc<Table>> {
        self.record.memoize(name, || {
            let table = self.loader.load_record(name)?;
            log_load(name, TableKind::Record, table.len());
            Ok(table)
        })
    }

    pub fn subspace(&self, name: &str) -> Result<Arc<SubspaceTable>> {
        self.subspace.memoize(name, || {
            let table = self.loader.load_subspace(name)?;
            log_load(name, TableKind::Subspace, table.len());
            Ok(table)
        })
    }

    pub fn sid_cid(&self, name: &str) -> Result<Arc<SidCidTable>> {
        self.sid_cid.memoize(name, || {
            let table = self.loader.load_sid_cid(name)?;
            log_load(name, TableKind::SidCid, table.len());
            Ok(table)
        })
    }

    pub fn insight(&self, name: &str) -> Result<Arc<InsightTable>> {
        self.insight.memoize(name, || {
            let table = self.loader.load_insight(name)?;
            log_load(name, TableKind::Insight, table.len());
            Ok(table)
        })
    }

    pub fn edge(&self, name: &str) -> Result<Arc<Table>> {
        self.edge.memoize(name, || {
            let table = self.loader.load_edge(name)?;
            log_load(name, TableKind::Edge, table.len());
            Ok(table)
        })
    }

    /// Drop every memoized table of one dataset
    pub fn invalidate(&self, name: &str) {
        self.record.invalidate(name);
        self.subspace.invalidate(name);
        self.sid_cid.invalidate(name);
        self.insight.invalidate(name);
        self.edge.invalidate(name);
    }
}

fn log_load(name: &str, kind: TableKind, rows: usize) {
    info!(dataset = name, table = kind.as_str(), rows, "Dataset table loaded");
}
