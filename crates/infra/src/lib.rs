//! Infrastructure layer: product stores and their configuration.

pub mod config;
pub mod product_store;

pub use config::{Backend, ConfigError, StoreConfig};
pub use product_store::{
    InMemoryProductStore, JsonFileStore, ProductStore, SqliteProductStore, StoreError, StoreResult,
};
