//! Validated product fields.
//!
//! Every field of a product record is a value object that can only be obtained
//! through validation, so a constructed `Product` never holds an invalid value.

use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use stockroom_core::{DomainError, DomainResult, ValueObject};

/// Number of digits in a product code.
pub const CODE_LEN: usize = 6;

/// External text format of expiration dates (`dd/mm/yyyy`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Identifying code of a product: exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductCode(String);

impl ProductCode {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "product code must be numeric, got {raw:?}"
            )));
        }
        if raw.len() != CODE_LEN {
            return Err(DomainError::validation(format!(
                "product code must have exactly {CODE_LEN} digits, got {}",
                raw.len()
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ProductCode {}

impl FromStr for ProductCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for ProductCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product name, never blank. Surrounding whitespace is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductName(String);

impl ProductName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ProductName {}

impl core::fmt::Display for ProductName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decimal places a price may carry.
pub const PRICE_SCALE: u32 = 2;

/// Largest accepted price, in cents.
const MAX_PRICE_CENTS: i64 = 99_999_999_999_999;

/// Unit price in whole cents, from zero up to [`Price::max`].
///
/// The bounds keep every price exactly representable as a JSON number, so a
/// stored price always reads back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Largest accepted price: `999999999999.99`.
    pub fn max() -> Decimal {
        Decimal::new(MAX_PRICE_CENTS, PRICE_SCALE)
    }

    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "price must not be negative, got {amount}"
            )));
        }
        if amount.normalize().scale() > PRICE_SCALE {
            return Err(DomainError::validation(format!(
                "price must have at most {PRICE_SCALE} decimal places, got {amount}"
            )));
        }
        if amount > Self::max() {
            return Err(DomainError::validation(format!(
                "price must not exceed {}, got {amount}",
                Self::max()
            )));
        }
        Ok(Self(amount))
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        let amount = Decimal::from_str(raw).map_err(|e| {
            DomainError::validation(format!("price must be a decimal number, got {raw:?}: {e}"))
        })?;
        Self::new(amount)
    }

    pub fn from_f64(amount: f64) -> DomainResult<Self> {
        let decimal = Decimal::from_f64(amount).ok_or_else(|| {
            DomainError::validation(format!("price must be a finite number, got {amount}"))
        })?;
        Self::new(decimal)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl ValueObject for Price {}

impl TryFrom<&str> for Price {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Price {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Parse a non-negative whole number that must fit in `u32`.
fn parse_count(raw: &str, field: &str) -> DomainResult<u32> {
    let raw = raw.trim();
    let value: i64 = raw
        .parse()
        .map_err(|_| DomainError::validation(format!("{field} must be an integer, got {raw:?}")))?;
    count_from_i64(value, field)
}

fn count_from_i64(value: i64, field: &str) -> DomainResult<u32> {
    if value < 0 {
        return Err(DomainError::validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| DomainError::validation(format!("{field} is too large: {value}")))
}

/// Units in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(units: u32) -> Self {
        Self(units)
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        parse_count(raw, "quantity").map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl ValueObject for Quantity {}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        count_from_i64(value, "quantity").map(Self)
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Warranty duration in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Warranty(u32);

impl Warranty {
    pub fn years(years: u32) -> Self {
        Self(years)
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        parse_count(raw, "warranty").map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl ValueObject for Warranty {}

impl TryFrom<i64> for Warranty {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        count_from_i64(value, "warranty").map(Self)
    }
}

impl core::fmt::Display for Warranty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} year(s)", self.0)
    }
}

/// Expiration date of a perishable product.
///
/// Parsing only checks the calendar form. The "strictly after today" rule is
/// applied separately by [`ExpirationDate::ensure_after`] when a product is
/// created, so items that expired in storage can still be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpirationDate(NaiveDate);

impl ExpirationDate {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse `day/month/year` text, e.g. `31/12/2030` or `1/2/2030`.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Self)
            .map_err(|e| {
                DomainError::validation(format!(
                    "expiration date must be a dd/mm/yyyy calendar date, got {raw:?}: {e}"
                ))
            })
    }

    /// Reject dates that are not strictly after `today`.
    pub fn ensure_after(self, today: NaiveDate) -> DomainResult<Self> {
        if self.0 <= today {
            return Err(DomainError::validation(format!(
                "expiration date {self} must be after {}",
                today.format(DATE_FORMAT)
            )));
        }
        Ok(self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl ValueObject for ExpirationDate {}

impl core::fmt::Display for ExpirationDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}
