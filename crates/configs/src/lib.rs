//! # configs
//!
//! Engine configuration: index pagination, page-cache layout, and the
//! default capacity settings handed to newly created boards. Loaded from
//! an optional `engine.toml` plus `TEXTBOARD__`-prefixed environment
//! variables (e.g. `TEXTBOARD__INDEX__PAGE_SIZE=15`).

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub index: IndexConfig,
    pub cache: CacheConfig,
    pub board_defaults: BoardDefaults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Threads per board-index page.
    pub page_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root directory of the disk-resident page cache.
    pub root: PathBuf,
}

/// Capacity settings applied to boards that don't override them.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BoardDefaults {
    pub max_threads_on_board: u32,
    pub bump_limit: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data/pages"),
        }
    }
}

impl Default for BoardDefaults {
    fn default() -> Self {
        Self {
            max_threads_on_board: 100,
            bump_limit: 300,
        }
    }
}

impl EngineConfig {
    /// Loads `engine.toml` (optional) and environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let cfg: Self = Config::builder()
            .add_source(File::with_name("engine").required(false))
            .add_source(Environment::with_prefix("TEXTBOARD").separator("__"))
            .build()?
            .try_deserialize()?;
        debug!(?cfg, "engine configuration loaded");
        Ok(cfg)
    }

    /// Parses configuration from a TOML string; used by tests and
    /// embedders that manage their own files.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()?)
    }
}
