//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. In the inventory model
/// every validated field (code, name, price, quantity, warranty, expiration date) is a
/// value object: once parsed it cannot hold an invalid value, and "changing" a field
/// means replacing it with a freshly validated one.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: No identity (two prices of `12.50` are equal)
/// - **Entity**: Has identity (two products with the same code are the same product)
///
/// ## Usage Pattern
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Quantity(u32);
///
/// impl ValueObject for Quantity {}
///
/// assert_eq!(Quantity(5), Quantity(5));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
