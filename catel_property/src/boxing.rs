// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared boxes for small primitive values.
//!
//! Every stored property value lives behind an [`Arc`]. For the primitives
//! models use most (`bool`, `i16`, `i32`, `i64`, `char`) this module hands out
//! one shared box per distinct value, so repeated writes of the same flag or
//! counter do not allocate and no-op detection can stop at a pointer compare.
//!
//! `bool` uses a fixed pair of boxes. The integer and `char` caches are
//! bounded LRU tables; a value evicted from the table simply gets a fresh box
//! the next time it is requested.
//!
//! ```rust
//! use std::sync::Arc;
//! use catel_property::boxing::{get_boxed_value, get_unboxed_value};
//! use catel_property::ErasedValue;
//!
//! let a = get_boxed_value(true);
//! let b = get_boxed_value(true);
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! // Unboxing accepts any erased value, cached or not.
//! let plain = ErasedValue::from_arc(Arc::new(12_i32));
//! assert_eq!(get_unboxed_value::<i32>(&plain), Ok(12));
//! ```

use core::any::Any;
use core::fmt;
use core::hash::Hash;
use core::num::NonZeroUsize;
use std::sync::{Arc, LazyLock};

use lru::LruCache;
use parking_lot::Mutex;

use crate::error::PropertyError;
use crate::value::{ErasedValue, PropertyValue};

/// Default number of distinct values kept per primitive type.
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => panic!("capacity must be non-zero"),
};

/// A bounded cache of shared boxes for one value type.
///
/// Two calls to [`get_boxed`](Self::get_boxed) with equal values return the
/// same allocation as long as the value has not been evicted in between.
pub struct BoxingCache<T> {
    entries: Mutex<LruCache<T, Arc<T>>>,
}

impl<T: Eq + Hash + Clone> BoxingCache<T> {
    /// Creates a cache that keeps up to `capacity` distinct values.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the shared box for `value`, creating it on a miss.
    pub fn get_boxed(&self, value: T) -> Arc<T> {
        let mut entries = self.entries.lock();
        if let Some(boxed) = entries.get(&value) {
            return Arc::clone(boxed);
        }
        let boxed = Arc::new(value.clone());
        entries.put(value, Arc::clone(&boxed));
        boxed
    }

    /// Returns the number of cached values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the maximum number of cached values.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.lock().cap()
    }
}

impl<T> fmt::Debug for BoxingCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxingCache")
            .field("type", &core::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

/// Primitive types with a process-wide boxing cache.
pub trait Boxable: PropertyValue + Copy + Eq + Hash + Send + Sync {
    /// Returns the shared box for `self`.
    fn get_boxed(self) -> Arc<Self>;
}

static BOOLS: LazyLock<[Arc<bool>; 2]> = LazyLock::new(|| [Arc::new(false), Arc::new(true)]);

impl Boxable for bool {
    fn get_boxed(self) -> Arc<Self> {
        Arc::clone(&BOOLS[usize::from(self)])
    }
}

macro_rules! lru_boxable {
    ($($ty:ty => $cache:ident),* $(,)?) => {
        $(
            static $cache: LazyLock<BoxingCache<$ty>> =
                LazyLock::new(|| BoxingCache::new(DEFAULT_CAPACITY));

            impl Boxable for $ty {
                fn get_boxed(self) -> Arc<Self> {
                    $cache.get_boxed(self)
                }
            }
        )*
    };
}

lru_boxable!(
    i16 => I16_BOXES,
    i32 => I32_BOXES,
    i64 => I64_BOXES,
    char => CHAR_BOXES,
);

/// Returns the shared box for a primitive value.
pub fn get_boxed_value<T: Boxable>(value: T) -> Arc<T> {
    value.get_boxed()
}

/// Reads a primitive back out of an erased value.
///
/// Works for any erased value of type `T`, whether or not it came from a
/// boxing cache.
///
/// # Errors
///
/// Returns [`PropertyError::TypeMismatch`] if `boxed` does not hold a `T`.
pub fn get_unboxed_value<T: Boxable>(boxed: &ErasedValue) -> Result<T, PropertyError> {
    boxed
        .downcast_ref::<T>()
        .copied()
        .ok_or_else(|| PropertyError::TypeMismatch {
            name: String::from("<unboxed value>"),
            expected: boxed.type_name(),
            found: core::any::type_name::<T>(),
        })
}

/// Routes cached primitives to their shared box.
pub(crate) fn cached_erased<T: PropertyValue>(value: &T) -> Option<ErasedValue> {
    let any: &dyn Any = value;
    if let Some(v) = any.downcast_ref::<bool>() {
        return Some(ErasedValue::from_arc(v.get_boxed()));
    }
    if let Some(v) = any.downcast_ref::<i32>() {
        return Some(ErasedValue::from_arc(v.get_boxed()));
    }
    if let Some(v) = any.downcast_ref::<i64>() {
        return Some(ErasedValue::from_arc(v.get_boxed()));
    }
    if let Some(v) = any.downcast_ref::<i16>() {
        return Some(ErasedValue::from_arc(v.get_boxed()));
    }
    if let Some(v) = any.downcast_ref::<char>() {
        return Some(ErasedValue::from_arc(v.get_boxed()));
    }
    None
}
