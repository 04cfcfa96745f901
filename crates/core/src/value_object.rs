//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**. They are defined entirely by their
//! attribute values: two store numbers with the same text are the same store
//! number, two week starts on the same Monday are the same week.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Constructors
/// validate once, so holders of a value object can rely on its invariant
/// (e.g. a `WeekStart` is always a Monday) without re-checking.
///
/// ```ignore
/// let a = StoreNumber::parse("100")?;
/// let b = StoreNumber::parse(" 100 ")?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
