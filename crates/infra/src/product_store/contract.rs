//! Behaviour every `ProductStore` implementation must share.
//!
//! Each backend's test module runs these checks against a fresh store.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use stockroom_products::{
    Category, ExpirationDate, Price, Product, ProductCode, ProductFields, ProductName, Quantity,
    Warranty,
};

use super::{ProductStore, StoreError};

/// Shared sink for log lines emitted while a test runs.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a plain-text subscriber and return everything it logged.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

fn fields(code: &str, name: &str, price: &str) -> ProductFields {
    ProductFields {
        code: ProductCode::parse(code).unwrap(),
        name: ProductName::parse(name).unwrap(),
        price: Price::parse(price).unwrap(),
        quantity: Quantity::new(5),
        supplier: "Acme".to_string(),
    }
}

fn code(raw: &str) -> ProductCode {
    ProductCode::parse(raw).unwrap()
}

pub fn laptop() -> Product {
    Product::durable(fields("100001", "Laptop", "1200.00"), Warranty::years(2))
}

pub fn milk() -> Product {
    Product::restore(
        fields("200002", "Milk", "1.25"),
        Category::Perishable {
            expiration_date: ExpirationDate::from_date(NaiveDate::from_ymd_opt(2030, 3, 7).unwrap()),
        },
    )
}

pub fn widget() -> Product {
    Product::base(fields("300003", "Widget", "0"))
}

/// Create, read, update price, delete, read again.
pub fn durable_lifecycle(store: &dyn ProductStore) {
    let laptop = laptop();
    store.create(&laptop).unwrap();
    assert_eq!(store.read(laptop.code()).unwrap(), Some(laptop.clone()));

    let new_price = Price::new(Decimal::new(99999, 2)).unwrap();
    store.update_price(laptop.code(), new_price).unwrap();
    let updated = store.read(laptop.code()).unwrap().unwrap();
    assert_eq!(updated.price(), new_price);
    assert_eq!(updated.warranty(), Some(Warranty::years(2)));
    assert_eq!(updated.name(), laptop.name());

    store.delete(laptop.code()).unwrap();
    assert_eq!(store.read(laptop.code()).unwrap(), None);
}

pub fn duplicate_create_keeps_original(store: &dyn ProductStore) {
    let original = laptop();
    store.create(&original).unwrap();

    let impostor = Product::durable(fields("100001", "Tablet", "10"), Warranty::years(9));
    match store.create(&impostor) {
        Err(StoreError::Conflict(c)) => assert_eq!(c, *original.code()),
        other => panic!("expected Conflict, got {other:?}"),
    }
    assert_eq!(store.read(original.code()).unwrap(), Some(original));
}

pub fn missing_code_is_reported(store: &dyn ProductStore) {
    store.create(&laptop()).unwrap();
    let before = store.list().unwrap();

    let absent = code("999999");
    assert_eq!(store.read(&absent).unwrap(), None);
    assert_eq!(
        store.update_price(&absent, Price::ZERO),
        Err(StoreError::NotFound(absent.clone()))
    );
    assert_eq!(store.delete(&absent), Err(StoreError::NotFound(absent.clone())));

    assert_eq!(store.list().unwrap(), before);
}

pub fn list_is_ordered_by_code(store: &dyn ProductStore) {
    store.create(&widget()).unwrap();
    store.create(&laptop()).unwrap();
    store.create(&milk()).unwrap();

    let codes: Vec<String> = store
        .list()
        .unwrap()
        .iter()
        .map(|p| p.code().to_string())
        .collect();
    assert_eq!(codes, vec!["100001", "200002", "300003"]);
}

pub fn perishable_and_base_round_trip(store: &dyn ProductStore) {
    let milk = milk();
    let widget = widget();
    store.create(&milk).unwrap();
    store.create(&widget).unwrap();

    assert_eq!(store.read(milk.code()).unwrap(), Some(milk));
    let read_widget = store.read(widget.code()).unwrap().unwrap();
    assert_eq!(read_widget.category(), &Category::Base);
    assert_eq!(read_widget, widget);
}
