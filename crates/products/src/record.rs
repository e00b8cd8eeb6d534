//! Flat storage mapping of a product.
//!
//! The category is never stored explicitly: an `expiration_date` field marks a
//! perishable product, a `warranty` field marks a durable one, and a record with
//! neither is a base product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult};

use crate::fields::{ExpirationDate, Price, ProductCode, ProductName, Quantity, Warranty};
use crate::product::{Category, Product, ProductFields};

/// Flat key/value form of a [`Product`], as written to the JSON inventory file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub code: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<i64>,
    /// `dd/mm/yyyy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

impl ProductRecord {
    /// Rebuild the product variant this record describes.
    ///
    /// Every field format is re-validated; the expiration date may lie in the past.
    pub fn into_product(self) -> DomainResult<Product> {
        let fields = ProductFields {
            code: ProductCode::parse(&self.code)?,
            name: ProductName::parse(&self.name)?,
            price: Price::new(self.price)?,
            quantity: Quantity::try_from(self.quantity)?,
            supplier: self.supplier,
        };

        let category = match (self.expiration_date, self.warranty) {
            (Some(_), Some(_)) => {
                return Err(DomainError::invariant(format!(
                    "record {} carries both expiration_date and warranty",
                    fields.code
                )));
            }
            (Some(raw), None) => Category::Perishable {
                expiration_date: ExpirationDate::parse(&raw)?,
            },
            (None, Some(years)) => Category::Durable {
                warranty: Warranty::try_from(years)?,
            },
            (None, None) => Category::Base,
        };

        Ok(Product::restore(fields, category))
    }
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        let (warranty, expiration_date) = match product.category() {
            Category::Base => (None, None),
            Category::Perishable { expiration_date } => (None, Some(expiration_date.to_string())),
            Category::Durable { warranty } => (Some(i64::from(warranty.value())), None),
        };

        Self {
            code: product.code().to_string(),
            name: product.name().to_string(),
            price: product.price().amount(),
            quantity: i64::from(product.quantity().value()),
            supplier: product.supplier().to_string(),
            warranty,
            expiration_date,
        }
    }
}

impl Product {
    /// Flat mapping of every field, including the category payload.
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord::from(self)
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        record.into_product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fields(code: &str) -> ProductFields {
        ProductFields {
            code: ProductCode::parse(code).unwrap(),
            name: ProductName::parse("Laptop").unwrap(),
            price: Price::parse("1200.00").unwrap(),
            quantity: Quantity::new(5),
            supplier: "Acme".to_string(),
        }
    }

    #[test]
    fn durable_record_has_warranty_only() {
        let product = Product::durable(fields("100001"), Warranty::years(2));
        let value = serde_json::to_value(product.to_record()).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "100001",
                "name": "Laptop",
                "price": 1200.0,
                "quantity": 5,
                "supplier": "Acme",
                "warranty": 2
            })
        );
    }

    #[test]
    fn perishable_record_uses_day_month_year() {
        let expiration = ExpirationDate::from_date(NaiveDate::from_ymd_opt(2030, 3, 7).unwrap());
        let product = Product::restore(
            fields("200002"),
            Category::Perishable {
                expiration_date: expiration,
            },
        );
        let record = product.to_record();
        assert_eq!(record.expiration_date.as_deref(), Some("07/03/2030"));
        assert_eq!(record.warranty, None);
    }

    #[test]
    fn record_without_category_fields_is_base() {
        let record: ProductRecord = serde_json::from_value(json!({
            "code": "300003",
            "name": "Widget",
            "price": 3.5,
            "quantity": 1,
            "supplier": "Acme"
        }))
        .unwrap();
        let product = record.into_product().unwrap();
        assert_eq!(product.category(), &Category::Base);
    }

    #[test]
    fn record_with_both_category_fields_is_rejected() {
        let mut record = Product::durable(fields("100001"), Warranty::years(1)).to_record();
        record.expiration_date = Some("01/01/2030".to_string());
        match record.into_product() {
            Err(DomainError::InvariantViolation(_)) => {}
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn record_with_invalid_fields_is_rejected() {
        let mut record = Product::base(fields("100001")).to_record();
        record.price = Decimal::new(-1, 0);
        assert!(record.clone().into_product().is_err());

        record.price = Decimal::ONE;
        record.quantity = -3;
        assert!(record.clone().into_product().is_err());

        record.quantity = 3;
        record.code = "1".to_string();
        assert!(record.into_product().is_err());
    }

    #[test]
    fn largest_price_reads_back_exactly() {
        let product = Product::base(ProductFields {
            price: Price::new(Price::max()).unwrap(),
            ..fields("100001")
        });
        let json = serde_json::to_string(&product.to_record()).unwrap();
        assert!(json.contains("\"price\":999999999999.99"));

        let record: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.into_product().unwrap(), product);
    }

    #[test]
    fn expired_perishable_record_still_reconstructs() {
        let mut record = Product::base(fields("400004")).to_record();
        record.expiration_date = Some("01/01/2001".to_string());
        let product = record.into_product().unwrap();
        assert_eq!(product.category().label(), "perishable");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn category() -> impl Strategy<Value = Category> {
            prop_oneof![
                Just(Category::Base),
                (0u32..100).prop_map(|y| Category::Durable {
                    warranty: Warranty::years(y)
                }),
                (2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| Category::Perishable {
                    expiration_date: ExpirationDate::from_date(
                        NaiveDate::from_ymd_opt(y, m, d).unwrap()
                    ),
                }),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: mapping a product to its record and back yields an equal product.
            #[test]
            fn record_round_trip_preserves_product(
                code in "[0-9]{6}",
                name in "[A-Za-z][A-Za-z0-9 ]{0,30}[A-Za-z0-9]",
                cents in 0i64..=99_999_999_999_999,
                quantity in 0u32..100_000,
                supplier in "[A-Za-z ]{0,20}",
                category in category(),
            ) {
                let fields = ProductFields {
                    code: ProductCode::parse(&code).unwrap(),
                    name: ProductName::parse(&name).unwrap(),
                    price: Price::new(Decimal::new(cents, 2)).unwrap(),
                    quantity: Quantity::new(quantity),
                    supplier,
                };
                let product = Product::restore(fields, category);

                let json = serde_json::to_string(&product.to_record()).unwrap();
                let record: ProductRecord = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(record.into_product().unwrap(), product);
            }

            /// Property: any price the model accepts reads back from JSON unchanged,
            /// whatever its scale.
            #[test]
            fn accepted_prices_survive_json(
                mantissa in -10_000i64..1_000_000_000_000_000,
                scale in 0u32..=28,
            ) {
                let Ok(price) = Price::new(Decimal::new(mantissa, scale)) else {
                    return Ok(());
                };
                let product = Product::base(ProductFields {
                    price,
                    ..fields("100001")
                });

                let json = serde_json::to_string(&product.to_record()).unwrap();
                let record: ProductRecord = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(record.into_product().unwrap(), product);
            }

            /// Property: codes are accepted iff they are exactly six ASCII digits.
            #[test]
            fn code_validation_matches_six_digits(raw in "[0-9a-z]{0,9}") {
                let expected = raw.len() == 6 && raw.chars().all(|c| c.is_ascii_digit());
                prop_assert_eq!(ProductCode::parse(&raw).is_ok(), expected);
            }

            /// Property: negative prices always fail validation.
            #[test]
            fn negative_prices_are_rejected(cents in i64::MIN / 2..0i64) {
                let raw = Decimal::new(cents, 2).to_string();
                prop_assert!(Price::parse(&raw).unwrap_err().is_validation());
            }
        }
    }
}
