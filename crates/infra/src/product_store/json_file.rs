//! File-backed product store.
//!
//! The whole inventory lives in one JSON object mapping product code to record:
//!
//! ```json
//! {
//!   "100001": { "code": "100001", "name": "Laptop", "price": 1200.0,
//!               "quantity": 5, "supplier": "Acme", "warranty": 2 }
//! }
//! ```
//!
//! Every operation loads the whole file and every write rewrites it. There is
//! no locking: two processes racing on the same file can lose updates.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use stockroom_core::Entity;
use stockroom_products::{Price, Product, ProductCode, ProductRecord};

use super::r#trait::{ProductStore, StoreError, StoreResult, log_list_outcome, log_outcome};

const BACKEND: &str = "json";

/// Decoded file contents, keyed by code text.
pub type Inventory = BTreeMap<String, ProductRecord>;

/// Product store persisted as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole inventory. A missing file is an empty inventory.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> StoreResult<Inventory> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("inventory file missing, starting empty");
                return Ok(Inventory::new());
            }
            Err(e) => {
                return Err(StoreError::storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            StoreError::corrupt(format!("{} is not valid JSON: {e}", self.path.display()))
        })?;
        if !value.is_object() {
            return Err(StoreError::corrupt(format!(
                "{} must contain a JSON object keyed by product code",
                self.path.display()
            )));
        }

        serde_json::from_value(value).map_err(|e| {
            StoreError::corrupt(format!("malformed record in {}: {e}", self.path.display()))
        })
    }

    /// Rewrite the whole inventory: write a sibling temp file, then rename it over the target.
    ///
    /// The temp file is removed on every failure path.
    #[instrument(skip(self, inventory), fields(path = %self.path.display(), records = inventory.len()))]
    fn save(&self, inventory: &Inventory) -> StoreResult<()> {
        let mut text = serde_json::to_string_pretty(inventory)
            .map_err(|e| StoreError::storage(format!("failed to encode inventory: {e}")))?;
        text.push('\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
            StoreError::storage(format!("failed to create temp file in {}: {e}", dir.display()))
        })?;

        tmp.write_all(text.as_bytes())
            .map_err(|e| StoreError::storage(format!("failed to write {}: {e}", tmp.path().display())))?;
        tmp.persist(&self.path).map_err(|e| {
            StoreError::storage(format!("failed to replace {}: {}", self.path.display(), e.error))
        })?;
        Ok(())
    }

    fn decode(key: &str, record: ProductRecord) -> StoreResult<Product> {
        if record.code != key {
            return Err(StoreError::corrupt(format!(
                "record stored under {key} has code {}",
                record.code
            )));
        }
        record
            .into_product()
            .map_err(|e| StoreError::undecodable(key, e))
    }
}

impl ProductStore for JsonFileStore {
    fn create(&self, product: &Product) -> StoreResult<()> {
        let result = (|| -> StoreResult<()> {
            let mut inventory = self.load()?;
            let key = product.id().to_string();
            if inventory.contains_key(&key) {
                return Err(StoreError::Conflict(product.code().clone()));
            }
            inventory.insert(key, product.to_record());
            self.save(&inventory)
        })();
        log_outcome(BACKEND, "create", product.code(), &result);
        result
    }

    fn read(&self, code: &ProductCode) -> StoreResult<Option<Product>> {
        let result = self.load().and_then(|mut inventory| {
            inventory
                .remove(code.as_str())
                .map(|record| Self::decode(code.as_str(), record))
                .transpose()
        });
        log_outcome(BACKEND, "read", code, &result);
        result
    }

    fn update_price(&self, code: &ProductCode, price: Price) -> StoreResult<()> {
        let result = (|| -> StoreResult<()> {
            let mut inventory = self.load()?;
            let record = inventory
                .get_mut(code.as_str())
                .ok_or_else(|| StoreError::NotFound(code.clone()))?;
            record.price = price.amount();
            self.save(&inventory)
        })();
        log_outcome(BACKEND, "update_price", code, &result);
        result
    }

    fn delete(&self, code: &ProductCode) -> StoreResult<()> {
        let result = (|| -> StoreResult<()> {
            let mut inventory = self.load()?;
            if inventory.remove(code.as_str()).is_none() {
                return Err(StoreError::NotFound(code.clone()));
            }
            self.save(&inventory)
        })();
        log_outcome(BACKEND, "delete", code, &result);
        result
    }

    fn list(&self) -> StoreResult<Vec<Product>> {
        let result: StoreResult<Vec<Product>> = self.load().and_then(|inventory| {
            inventory
                .into_iter()
                .map(|(key, record)| Self::decode(&key, record))
                .collect()
        });
        log_list_outcome(BACKEND, &result);
        result
    }
}
