use thiserror::Error;
use tracing::{error, info, warn};

use stockroom_core::DomainError;
use stockroom_products::{Price, Product, ProductCode};

/// Result type returned by every store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Product store operation error.
///
/// `NotFound` and `Conflict` are expected outcomes of a well-formed request and
/// leave storage untouched. `CorruptData` and `Storage` are faults: the first
/// means stored data could not be decoded into a product, the second covers
/// I/O, connection and SQL failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(ProductCode),

    #[error("product {0} already exists")]
    Conflict(ProductCode),

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptData(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for failures of the storage itself rather than of the request.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::CorruptData(_) | Self::Storage(_))
    }

    /// Wrap a reconstruction failure of the stored record `key`.
    pub(crate) fn undecodable(key: &str, err: DomainError) -> Self {
        Self::CorruptData(format!("stored product {key} is invalid: {err}"))
    }
}

/// CRUD boundary of the inventory.
///
/// Implementations are interchangeable and synchronous. Each call is a single
/// request: it either fully applies or leaves storage unchanged.
pub trait ProductStore {
    /// Insert a new product. Fails with `Conflict` if the code is taken.
    fn create(&self, product: &Product) -> StoreResult<()>;

    /// Look a product up by code. A missing code is `Ok(None)`, not an error.
    fn read(&self, code: &ProductCode) -> StoreResult<Option<Product>>;

    /// Replace the stored price. Fails with `NotFound` if the code is absent.
    fn update_price(&self, code: &ProductCode, price: Price) -> StoreResult<()>;

    /// Remove a product and its category data. Fails with `NotFound` if absent.
    fn delete(&self, code: &ProductCode) -> StoreResult<()>;

    /// Every stored product, ordered by code.
    fn list(&self) -> StoreResult<Vec<Product>>;
}

/// Log the outcome of a store operation at a level matching its kind.
pub(crate) fn log_outcome<T>(
    backend: &'static str,
    operation: &'static str,
    code: &ProductCode,
    result: &StoreResult<T>,
) {
    match result {
        Ok(_) => info!(backend, operation, code = %code, "store operation succeeded"),
        Err(err) if !err.is_fault() => {
            warn!(backend, operation, code = %code, error = %err, "store operation rejected")
        }
        Err(err) => error!(backend, operation, code = %code, error = %err, "store operation failed"),
    }
}

/// Log the outcome of a `list` call.
pub(crate) fn log_list_outcome(backend: &'static str, result: &StoreResult<Vec<Product>>) {
    match result {
        Ok(products) => info!(
            backend,
            operation = "list",
            count = products.len(),
            "store operation succeeded"
        ),
        Err(err) => error!(backend, operation = "list", error = %err, "store operation failed"),
    }
}
