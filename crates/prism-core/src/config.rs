//! Engine configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded in layers, later layers winning:
//! 1. Embedded defaults (compiled into binary)
//! 2. Override file (explicit path, else ~/.local/share/prism/config/prism.toml)
//! 3. Environment (`PRISM_DATA_DIR`, `PRISM_CACHE_TTL_SECS`)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/prism.toml");

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "PRISM_DATA_DIR";

/// Environment variable overriding the cache TTL in seconds
pub const CACHE_TTL_ENV: &str = "PRISM_CACHE_TTL_SECS";

/// Density-based clustering parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringSettings {
    pub eps: f64,
    pub min_samples: usize,
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            eps: 0.3,
            min_samples: 5,
        }
    }
}

/// Knobs for the insight statistics engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Groups kept for `top1`
    pub top_n: usize,
    /// Noise breakdown values named in clustering sentences
    pub max_noise_examples: usize,
    pub clustering: ClusteringSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            max_noise_examples: 2,
            clustering: ClusteringSettings::default(),
        }
    }
}

/// Knobs for column profiling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSettings {
    pub kde_grid_size: usize,
    pub kde_cut: f64,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            kde_grid_size: 200,
            kde_cut: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrismConfig {
    /// Root holding the per-table directories
    pub data_dir: PathBuf,
    /// How long a loaded table stays memoized
    pub cache_ttl: Duration,
    pub engine: EngineSettings,
    pub profile: ProfileSettings,
    /// Human descriptions per dataset name
    pub descriptions: HashMap<String, String>,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_ttl: Duration::from_secs(50),
            engine: EngineSettings::default(),
            profile: ProfileSettings::default(),
            descriptions: HashMap::new(),
        }
    }
}

impl PrismConfig {
    /// Load defaults, the override file, then environment overrides
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = load_config(override_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (injectable for tests)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|s| !s.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(ttl) = lookup(CACHE_TTL_ENV).filter(|s| !s.trim().is_empty()) {
            let secs = ttl.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds", CACHE_TTL_ENV))
            })?;
            self.cache_ttl = Duration::from_secs(secs);
        }
        Ok(())
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn description_for(&self, name: &str) -> &str {
        self.descriptions.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("prism").join("config").join("prism.toml"))
}

/// Load configuration (override first, then embedded default)
fn load_config(override_path: Option<&Path>) -> Result<PrismConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    let mut config = parse_config(DEFAULT_CONFIG)?;
    if let Some(path) = path {
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "Loaded config override");
        merge_config(&mut config, &content)?;
    } else if let Some(explicit) = override_path {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            explicit.display()
        )));
    }
    Ok(config)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    cache: Option<RawCache>,
    engine: Option<RawEngine>,
    clustering: Option<RawClustering>,
    profile: Option<RawProfile>,
    descriptions: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawEngine {
    top_n: Option<usize>,
    max_noise_examples: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawClustering {
    eps: Option<f64>,
    min_samples: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    kde_grid_size: Option<usize>,
    kde_cut: Option<f64>,
}

/// Parse config from TOML content on top of built-in defaults
fn parse_config(content: &str) -> Result<PrismConfig> {
    let mut config = PrismConfig::default();
    merge_config(&mut config, content)?;
    Ok(config)
}

fn merge_config(config: &mut PrismConfig, content: &str) -> Result<()> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    if let Some(dir) = raw.data.and_then(|d| d.dir) {
        config.data_dir = dir;
    }
    if let Some(ttl) = raw.cache.and_then(|c| c.ttl_secs) {
        config.cache_ttl = Duration::from_secs(ttl);
    }
    if let Some(engine) = raw.engine {
        if let Some(top_n) = engine.top_n {
            config.engine.top_n = top_n;
        }
        if let Some(max) = engine.max_noise_examples {
            config.engine.max_noise_examples = max;
        }
    }
    if let Some(clustering) = raw.clustering {
        if let Some(eps) = clustering.eps {
            if eps <= 0.0 {
                return Err(Error::Config("clustering.eps must be positive".into()));
            }
            config.engine.clustering.eps = eps;
        }
        if let Some(min_samples) = clustering.min_samples {
            config.engine.clustering.min_samples = min_samples.max(1);
        }
    }
    if let Some(profile) = raw.profile {
        if let Some(grid) = profile.kde_grid_size {
            config.profile.kde_grid_size = grid;
        }
        if let Some(cut) = profile.kde_cut {
            config.profile.kde_cut = cut;
        }
    }
    if let Some(descriptions) = raw.descriptions {
        config.descriptions.extend(descriptions);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(50));
        assert_eq!(config.engine.top_n, 10);
        assert_eq!(config.engine.clustering, ClusteringSettings::default());
        assert_eq!(config.profile.kde_grid_size, 200);
        assert_eq!(config.description_for("carSales1"), "Describe vehicle sales.");
        assert_eq!(config.description_for("unknown"), "");
    }

    #[test]
    fn test_override_merges_over_defaults() {
        let mut config = parse_config(DEFAULT_CONFIG).unwrap();
        merge_config(
            &mut config,
            r#"
            [clustering]
            eps = 0.5

            [descriptions]
            cars = "Fixture cars"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.clustering.eps, 0.5);
        assert_eq!(config.engine.clustering.min_samples, 5);
        assert_eq!(config.description_for("cars"), "Fixture cars");
        assert_eq!(config.description_for("Census"), "Describe demographic information.");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_config("[cache\nttl_secs = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = parse_config("[clustering]\neps = -1.0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PrismConfig::default();
        config
            .apply_env(|key| match key {
                DATA_DIR_ENV => Some("/srv/prism".to_string()),
                CACHE_TTL_ENV => Some("5".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/prism"));
        assert_eq!(config.cache_ttl, Duration::from_secs(5));

        let err = config
            .apply_env(|key| (key == CACHE_TTL_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let err = load_config(Some(Path::new("/nonexistent/prism.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
