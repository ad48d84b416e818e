// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property identification types.
//!
//! This module provides [`Property<T>`] for type-safe, name-based property keys
//! and [`PropertySlot`] for the compact per-type index a key resolves to.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A type-safe property key.
///
/// Properties are identified by name; the phantom type `T` is the value type
/// the property was registered with. Keys are `const`-constructible so a model
/// can declare them next to its type:
///
/// ```rust
/// use catel_property::Property;
///
/// pub const NAME: Property<Option<String>> = Property::new("Name");
/// pub const AGE: Property<i32> = Property::new("Age");
///
/// assert_eq!(NAME.name(), "Name");
/// assert_eq!(AGE.name(), "Age");
/// ```
///
/// A key does not by itself prove that the property is registered on any
/// type; lookups through a [`TypeMetadata`](crate::TypeMetadata) check both
/// the name and the value type.
pub struct Property<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Creates a property key with the given name.
    #[must_use]
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// Position of a property inside its type's metadata.
///
/// Slots are assigned when a [`TypeMetadata`](crate::TypeMetadata) is built:
/// base-type properties first, in registration order, then the properties of
/// each derived type. Slots are only meaningful together with the metadata
/// that produced them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertySlot(u16);

impl PropertySlot {
    /// Creates a slot from the given index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertySlot").field(&self.0).finish()
    }
}

impl fmt::Display for PropertySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertySlot({})", self.0)
    }
}
