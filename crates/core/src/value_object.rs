//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: a `Gstin` or a
/// `DiscountRule` is defined entirely by its attributes. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Rate(Decimal);
///
/// impl ValueObject for Rate {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
