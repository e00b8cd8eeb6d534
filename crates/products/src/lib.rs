//! Product model: validated fields, category variants and the flat record form.
//!
//! This crate is pure domain logic (no IO, no storage). Stores live in
//! `stockroom-infra` and speak to this crate through [`ProductRecord`] or the
//! typed constructors.

pub mod fields;
pub mod product;
pub mod record;

pub use fields::{
    CODE_LEN, DATE_FORMAT, ExpirationDate, PRICE_SCALE, Price, ProductCode, ProductName, Quantity,
    Warranty,
};
pub use product::{
    Category, CategoryInput, CreateProduct, ExpirationInput, Product, ProductFields,
};
pub use record::ProductRecord;
