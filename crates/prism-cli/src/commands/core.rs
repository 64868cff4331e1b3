//! Shared command utilities
//!
//! This module contains:
//! - `open_service` - Build the insight service from config and flags
//! - `Output` - JSON writer honoring `--compact`

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use prism_core::{CsvTableLoader, InsightService, PrismConfig};
use serde::Serialize;

/// Load config (file, environment, then flags) and open the dataset directory
pub fn open_service(
    data_dir: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<InsightService<CsvTableLoader>> {
    let mut config = PrismConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Opening dataset directory"
    );
    Ok(InsightService::from_config(config))
}

/// JSON output settings
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    compact: bool,
}

impl Output {
    pub fn new(compact: bool) -> Self {
        Self { compact }
    }

    /// Write `value` as JSON followed by a newline
    pub fn emit<T: Serialize + ?Sized>(&self, out: &mut impl Write, value: &T) -> Result<()> {
        if self.compact {
            serde_json::to_writer(&mut *out, value)
        } else {
            serde_json::to_writer_pretty(&mut *out, value)
        }
        .context("Failed to serialize output")?;
        writeln!(out).context("Failed to write output")?;
        Ok(())
    }
}
