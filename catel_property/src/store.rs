// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance sparse property storage.
//!
//! This module provides [`PropertyValueStore`], which holds only the values
//! that were explicitly set on one model instance. Everything else falls back
//! to the descriptor default of the instance's [`TypeMetadata`].
//!
//! # Implementation
//!
//! Entries live in a `SmallVec` sorted by [`PropertySlot`] and are found by
//! binary search. Typical models set a handful of properties, so the first
//! eight entries are stored inline.

use smallvec::SmallVec;

use crate::error::PropertyError;
use crate::id::PropertySlot;
use crate::metadata::TypeMetadata;
use crate::value::ErasedValue;

/// Default inline capacity for property entries.
const INLINE_CAPACITY: usize = 8;

/// Sparse storage for the explicitly set values of one instance.
///
/// # Example
///
/// ```rust
/// use catel_property::{ErasedValue, PropertySlot, PropertyValueStore};
///
/// let mut store = PropertyValueStore::new();
/// let slot = PropertySlot::new(0);
/// assert!(store.get(slot).is_none());
///
/// assert_eq!(store.set(slot, ErasedValue::new(30_i32)), None);
/// assert_eq!(store.get(slot), Some(&ErasedValue::new(30_i32)));
///
/// let old = store.set(slot, ErasedValue::new(31_i32));
/// assert_eq!(old, Some(ErasedValue::new(30_i32)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PropertyValueStore {
    /// Values sorted by slot for binary search lookup.
    entries: SmallVec<[(PropertySlot, ErasedValue); INLINE_CAPACITY]>,
}

impl PropertyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of explicitly set values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no value is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn find(&self, slot: PropertySlot) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&slot, |(s, _)| *s)
    }

    /// Returns `true` if `slot` has an explicit value.
    #[must_use]
    pub fn contains(&self, slot: PropertySlot) -> bool {
        self.find(slot).is_ok()
    }

    /// Returns the explicit value of `slot`.
    #[must_use]
    pub fn get(&self, slot: PropertySlot) -> Option<&ErasedValue> {
        self.find(slot).ok().map(|idx| &self.entries[idx].1)
    }

    /// Stores `value` in `slot`, returning the value it replaces.
    pub fn set(&mut self, slot: PropertySlot, value: ErasedValue) -> Option<ErasedValue> {
        match self.find(slot) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (slot, value));
                None
            }
        }
    }

    /// Removes the explicit value of `slot`.
    pub fn remove(&mut self, slot: PropertySlot) -> Option<ErasedValue> {
        self.find(slot).ok().map(|idx| self.entries.remove(idx).1)
    }

    /// Removes every explicit value.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the slots that have explicit values, in ascending order.
    pub fn slots(&self) -> impl Iterator<Item = PropertySlot> + '_ {
        self.entries.iter().map(|(slot, _)| *slot)
    }

    /// Iterates explicit values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertySlot, &ErasedValue)> {
        self.entries.iter().map(|(slot, value)| (*slot, value))
    }

    /// Returns the value of `slot`, falling back to the descriptor default.
    ///
    /// The store is not modified when the default is used.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotRegistered`] if `slot` is not part of
    /// `metadata`, and [`PropertyError::CalculatedProperty`] for calculated
    /// properties, which have no stored or default value.
    pub fn get_or_default(
        &self,
        slot: PropertySlot,
        metadata: &TypeMetadata,
    ) -> Result<ErasedValue, PropertyError> {
        if let Some(value) = self.get(slot) {
            return Ok(value.clone());
        }
        let descriptor = metadata
            .descriptor(slot)
            .ok_or_else(|| PropertyError::NotRegistered {
                owner: metadata.type_name(),
                name: slot.to_string(),
            })?;
        descriptor
            .default_value()
            .ok_or(PropertyError::CalculatedProperty {
                name: descriptor.name(),
            })
    }
}
