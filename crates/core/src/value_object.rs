//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two value
/// objects with the same attribute values are equal. `Grams { 10_500 }` is a
/// value object; a stock item with an id is an entity.
///
/// To "modify" a value object, create a new one with the new values. This
/// keeps them safe to share and lets them behave like primitives.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
