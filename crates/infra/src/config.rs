//! Store configuration, read from the process environment.
//!
//! | Variable              | Meaning                              | Default                |
//! |-----------------------|--------------------------------------|------------------------|
//! | `STOCKROOM_BACKEND`   | `json`, `sqlite` or `memory`         | `json`                 |
//! | `STOCKROOM_DATA_FILE` | JSON inventory path                  | `products.json`        |
//! | `DATABASE_URL`        | SQLite URL for the `sqlite` backend  | `sqlite://stockroom.db` |

use core::str::FromStr;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::product_store::{
    InMemoryProductStore, JsonFileStore, ProductStore, SqliteProductStore, StoreResult,
};

pub const BACKEND_VAR: &str = "STOCKROOM_BACKEND";
pub const DATA_FILE_VAR: &str = "STOCKROOM_DATA_FILE";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

const DEFAULT_DATA_FILE: &str = "products.json";
const DEFAULT_DATABASE_URL: &str = "sqlite://stockroom.db";

/// Persistence strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Json,
    Sqlite,
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            "memory" => Ok(Backend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown backend {0:?}; expected one of: json, sqlite, memory")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub data_file: PathBuf,
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Json,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            backend: get(BACKEND_VAR)
                .map(|v| v.parse::<Backend>())
                .transpose()?
                .unwrap_or(defaults.backend),
            data_file: get(DATA_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.data_file),
            database_url: get(DATABASE_URL_VAR).unwrap_or(defaults.database_url),
        })
    }

    /// Open the configured store.
    pub fn open(&self) -> StoreResult<Box<dyn ProductStore>> {
        let store: Box<dyn ProductStore> = match self.backend {
            Backend::Json => {
                info!(path = %self.data_file.display(), "using JSON file store");
                Box::new(JsonFileStore::new(self.data_file.clone()))
            }
            Backend::Sqlite => {
                info!(url = %self.database_url, "using SQLite store");
                Box::new(SqliteProductStore::connect(&self.database_url)?)
            }
            Backend::Memory => {
                info!("using in-memory store");
                Box::new(InMemoryProductStore::new())
            }
        };
        Ok(store)
    }
}
