//! Product persistence boundary.
//!
//! `ProductStore` is the CRUD interface consumed by the menu; each backend
//! implements it over one storage strategy and never mixes them.

pub mod in_memory;
pub mod json_file;
pub mod sqlite;
pub mod r#trait;

#[cfg(test)]
pub(crate) mod contract;

pub use in_memory::InMemoryProductStore;
pub use json_file::JsonFileStore;
pub use sqlite::SqliteProductStore;
pub use r#trait::{ProductStore, StoreError, StoreResult};
