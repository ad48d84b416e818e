// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased property value storage.
//!
//! This module provides [`ErasedValue`] for storing property values of any
//! type in a heterogeneous collection, and the [`PropertyValue`] bound every
//! stored type satisfies.

use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use crate::boxing;

/// Bound for types that can be stored in a model property.
///
/// Equality is required for no-op detection: setting a property to a value
/// equal to its current one changes nothing. Types with reference semantics
/// (shared collections, shared child models) implement `PartialEq` as
/// reference equality.
pub trait PropertyValue: Clone + PartialEq + fmt::Debug + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + 'static> PropertyValue for T {}

/// A type-erased, immutable, shareable property value.
///
/// Cloning an `ErasedValue` shares the underlying allocation. Small primitives
/// (`bool`, `i16`, `i32`, `i64`, `char`) are routed through the process-wide
/// [boxing caches](crate::boxing), so two erased values created from the same
/// primitive usually share one allocation and compare equal by pointer.
///
/// # Example
///
/// ```rust
/// use catel_property::ErasedValue;
///
/// let value = ErasedValue::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
///
/// let same = ErasedValue::new(42_i32);
/// assert!(value.ptr_eq(&same));
/// assert_eq!(value, same);
/// ```
#[derive(Clone)]
pub struct ErasedValue {
    inner: Arc<dyn ErasedValueTrait>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ErasedValue {
    /// Creates a new erased value from a concrete value.
    #[must_use]
    pub fn new<T: PropertyValue>(value: T) -> Self {
        if let Some(boxed) = boxing::cached_erased(&value) {
            return boxed;
        }
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value without copying it.
    #[must_use]
    pub fn from_arc<T: PropertyValue>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the contained value.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the contained value is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attempts to downcast to a reference of type `T`.
    ///
    /// Returns `None` if the contained value is not of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Returns `true` if both values share the same allocation.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.type_id == other.type_id && self.inner.dyn_eq(other.inner.as_any()))
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.dyn_debug(f)
    }
}

/// Trait object for type-erased values that can be compared and printed.
trait ErasedValueTrait: Any {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn Any) -> bool;
    fn dyn_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: PropertyValue> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn dyn_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
