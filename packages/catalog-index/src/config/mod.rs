//! Configuration
//!
//! Layered, lowest precedence first:
//! 1. Defaults (`latestgames.db`, 5000 ms busy timeout, game catalog)
//! 2. YAML file (schema v1)
//! 3. Environment (`LG_DB`, `LG_BUSY_TIMEOUT_MS`)
//! 4. Explicit overrides from the caller (CLI flags)
//!
//! # Examples
//!
//! ```rust,ignore
//! use catalog_index::config::EnsureConfig;
//!
//! let config = EnsureConfig::from_yaml("indexes.yaml")?.apply_env()?;
//! ```
//!
//! ```yaml
//! version: 1
//! database: /var/lib/latestgames/latestgames.db
//! busy_timeout_ms: 10000
//! indexes:
//!   - { name: idx_game_tags_gid, table: game_tags, column: game_id }
//! ```

pub mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::IndexCatalog;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_DB_PATH: &str = "latestgames.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub const ENV_DB_PATH: &str = "LG_DB";
pub const ENV_BUSY_TIMEOUT_MS: &str = "LG_BUSY_TIMEOUT_MS";

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    #[serde(default)]
    pub version: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,

    /// Replaces the built-in catalog when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexes: Option<IndexCatalog>,
}

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EnsureConfig {
    pub database: PathBuf,
    pub busy_timeout: Duration,
    pub catalog: IndexCatalog,
}

impl Default for EnsureConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DB_PATH),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            catalog: IndexCatalog::game_catalog(),
        }
    }
}

impl EnsureConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(text)?;
        Self::default().merge_file(file)
    }

    fn merge_file(mut self, file: ConfigFileV1) -> ConfigResult<Self> {
        match file.version {
            None => return Err(ConfigError::MissingVersion),
            Some(CONFIG_VERSION) => {}
            Some(found) => {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: vec![CONFIG_VERSION],
                })
            }
        }

        if let Some(database) = file.database {
            self.database = database;
        }
        if let Some(ms) = file.busy_timeout_ms {
            self.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(catalog) = file.indexes {
            self.catalog = catalog;
        }
        Ok(self)
    }

    /// Apply `LG_DB` / `LG_BUSY_TIMEOUT_MS` from the process environment
    pub fn apply_env(self) -> ConfigResult<Self> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply environment overrides from an arbitrary lookup
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(db) = lookup(ENV_DB_PATH) {
            let db = db.trim();
            if db.is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var: ENV_DB_PATH.to_string(),
                    value: db.to_string(),
                    reason: "path must not be empty".to_string(),
                });
            }
            self.database = PathBuf::from(db);
        }

        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: ENV_BUSY_TIMEOUT_MS.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            self.busy_timeout = Duration::from_millis(ms);
        }

        Ok(self)
    }

    /// Resolve every layer: defaults, the optional YAML file, environment
    /// overrides from `lookup`, then `db_override` (the `--db` flag).
    pub fn resolve(
        config_path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
        db_override: Option<&Path>,
    ) -> ConfigResult<Self> {
        let config = match config_path {
            Some(path) => Self::from_yaml(path)?,
            None => Self::default(),
        };
        let config = config.apply_env_from(lookup)?;
        Ok(match db_override {
            Some(db) => config.with_database(db),
            None => config,
        })
    }

    /// Database path set by the caller, highest precedence
    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let busy_timeout_ms = u64::try_from(self.busy_timeout.as_millis()).map_err(|_| {
            ConfigError::InvalidField {
                field: "busy_timeout_ms".to_string(),
                reason: "does not fit in 64 bits".to_string(),
            }
        })?;
        let file = ConfigFileV1 {
            version: Some(CONFIG_VERSION),
            database: Some(self.database.clone()),
            busy_timeout_ms: Some(busy_timeout_ms),
            indexes: Some(self.catalog.clone()),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
