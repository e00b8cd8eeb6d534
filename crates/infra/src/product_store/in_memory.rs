use std::collections::BTreeMap;
use std::sync::RwLock;

use stockroom_core::Entity;
use stockroom_products::{Price, Product, ProductCode};

use super::r#trait::{ProductStore, StoreError, StoreResult, log_list_outcome, log_outcome};

const BACKEND: &str = "memory";

/// In-memory product store.
///
/// Intended for tests/dev. Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<BTreeMap<ProductCode, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::storage("lock poisoned")
    }
}

impl ProductStore for InMemoryProductStore {
    fn create(&self, product: &Product) -> StoreResult<()> {
        let result = (|| -> StoreResult<()> {
            let mut products = self.products.write().map_err(|_| Self::poisoned())?;
            let id = product.id();
            if products.contains_key(id) {
                return Err(StoreError::Conflict(id.clone()));
            }
            products.insert(id.clone(), product.clone());
            Ok(())
        })();
        log_outcome(BACKEND, "create", product.code(), &result);
        result
    }

    fn read(&self, code: &ProductCode) -> StoreResult<Option<Product>> {
        let result = self
            .products
            .read()
            .map(|products| products.get(code).cloned())
            .map_err(|_| Self::poisoned());
        log_outcome(BACKEND, "read", code, &result);
        result
    }

    fn update_price(&self, code: &ProductCode, price: Price) -> StoreResult<()> {
        let result = (|| -> StoreResult<()> {
            let mut products = self.products.write().map_err(|_| Self::poisoned())?;
            let product = products
                .get_mut(code)
                .ok_or_else(|| StoreError::NotFound(code.clone()))?;
            product.replace_price(price);
            Ok(())
        })();
        log_outcome(BACKEND, "update_price", code, &result);
        result
    }

    fn delete(&self, code: &ProductCode) -> StoreResult<()> {
        let result = (|| -> StoreResult<()> {
            let mut products = self.products.write().map_err(|_| Self::poisoned())?;
            products
                .remove(code)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(code.clone()))
        })();
        log_outcome(BACKEND, "delete", code, &result);
        result
    }

    fn list(&self) -> StoreResult<Vec<Product>> {
        let result: StoreResult<Vec<Product>> = self
            .products
            .read()
            .map(|products| products.values().cloned().collect())
            .map_err(|_| Self::poisoned());
        log_list_outcome(BACKEND, &result);
        result
    }
}
