// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide type metadata cache.
//!
//! Lookups of an already resolved type take a shared read lock only. Building
//! a missing entry happens under a separate build mutex, and the entry is
//! checked again once that mutex is held, so two threads racing on the same
//! type run its registration exactly once and observe the same
//! [`TypeMetadata`].

use core::any::TypeId;
use std::sync::{Arc, LazyLock};

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use parking_lot::{Mutex, RwLock};

use crate::descriptor::PropertyDescriptor;
use crate::error::PropertyError;
use crate::metadata::{ModelType, TypeKey, TypeMetadata, UnmanagedProperty};

type Declared = HashMap<TypeId, Vec<Arc<PropertyDescriptor>>>;

/// Cache of resolved [`TypeMetadata`], keyed by type.
///
/// Most code uses the [`global`](Self::global) instance; separate instances
/// are useful for isolated tests.
#[derive(Default)]
pub struct TypeMetadataCache {
    resolved: RwLock<HashMap<TypeId, Arc<TypeMetadata>>>,
    /// Descriptors declared per type. Also serves as the build lock.
    declared: Mutex<Declared>,
}

static GLOBAL: LazyLock<TypeMetadataCache> = LazyLock::new(TypeMetadataCache::new);

impl TypeMetadataCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the metadata of `T`, building it on first use.
    ///
    /// # Errors
    ///
    /// See [`get_type_metadata`](Self::get_type_metadata).
    pub fn get<T: ModelType>(&self) -> Result<Arc<TypeMetadata>, PropertyError> {
        self.get_type_metadata(TypeKey::of::<T>())
    }

    /// Returns the metadata of the type behind `key`, building it on first
    /// use.
    ///
    /// Building walks the base chain and lays out base properties before
    /// derived ones. Registration code runs while the build lock is held and
    /// must not query the cache itself.
    ///
    /// # Errors
    ///
    /// Returns the first registration error of any type on the chain, or
    /// [`PropertyError::ShadowedProperty`] if a type re-registers a name
    /// declared on one of its bases.
    pub fn get_type_metadata(&self, key: TypeKey) -> Result<Arc<TypeMetadata>, PropertyError> {
        if let Some(metadata) = self.resolved.read().get(&key.id()) {
            return Ok(Arc::clone(metadata));
        }

        let mut declared = self.declared.lock();
        if let Some(metadata) = self.resolved.read().get(&key.id()) {
            return Ok(Arc::clone(metadata));
        }

        let metadata = Arc::new(build(&mut declared, key)?);
        log::debug!(
            "built metadata for '{}': {} managed, {} unmanaged",
            key.name(),
            metadata.len(),
            metadata.unmanaged_properties().len()
        );
        self.resolved
            .write()
            .insert(key.id(), Arc::clone(&metadata));
        Ok(metadata)
    }

    /// Adds a descriptor to `owner` after its declarations have run.
    ///
    /// Resolved metadata of every type is discarded, so instances created
    /// afterwards see the new property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::AlreadyRegistered`] if `owner` already has a
    /// property of that name, [`PropertyError::ShadowedProperty`] if a base
    /// type does, [`PropertyError::EmptyName`] for an empty name, or the
    /// registration error of the owner's own declarations.
    pub fn register_property(
        &self,
        owner: TypeKey,
        descriptor: PropertyDescriptor,
    ) -> Result<(), PropertyError> {
        let name = descriptor.name();
        if name.is_empty() {
            return Err(PropertyError::EmptyName);
        }

        let mut declared = self.declared.lock();
        let mut base = owner.base();
        let mut visited = HashSet::new();
        visited.insert(owner.id());
        while let Some(key) = base {
            if !visited.insert(key.id()) {
                break;
            }
            if declared_for(&mut declared, key)?
                .iter()
                .any(|d| d.name() == name)
            {
                return Err(PropertyError::ShadowedProperty {
                    owner: owner.name(),
                    base: key.name(),
                    name,
                });
            }
            base = key.base();
        }

        let own = declared_for(&mut declared, owner)?;
        if own.iter().any(|d| d.name() == name) {
            return Err(PropertyError::AlreadyRegistered {
                owner: owner.name(),
                name,
            });
        }
        own.push(Arc::new(descriptor));
        self.invalidate();
        log::debug!("registered property '{name}' on '{}'", owner.name());
        Ok(())
    }

    /// Removes a property from `owner`.
    ///
    /// Returns `false` if `owner` has no property of that name.
    pub fn unregister_property(&self, owner: TypeKey, name: &str) -> bool {
        let mut declared = self.declared.lock();
        let Ok(own) = declared_for(&mut declared, owner) else {
            return false;
        };
        let before = own.len();
        own.retain(|d| d.name() != name);
        if own.len() == before {
            return false;
        }
        self.invalidate();
        log::debug!("unregistered property '{name}' from '{}'", owner.name());
        true
    }

    /// Returns `true` if the metadata of `key` is currently resolved.
    #[must_use]
    pub fn is_resolved(&self, key: TypeKey) -> bool {
        self.resolved.read().contains_key(&key.id())
    }

    fn invalidate(&self) {
        self.resolved.write().clear();
    }
}

impl core::fmt::Debug for TypeMetadataCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMetadataCache")
            .field("resolved", &self.resolved.read().len())
            .finish_non_exhaustive()
    }
}

/// Returns the descriptors `key` declares, running its registration once.
fn declared_for(
    declared: &mut Declared,
    key: TypeKey,
) -> Result<&mut Vec<Arc<PropertyDescriptor>>, PropertyError> {
    match declared.entry(key.id()) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => Ok(entry.insert(key.declare()?)),
    }
}

fn build(declared: &mut Declared, key: TypeKey) -> Result<TypeMetadata, PropertyError> {
    let mut chain = vec![key];
    let mut visited = HashSet::new();
    visited.insert(key.id());
    let mut base = key.base();
    while let Some(next) = base {
        if !visited.insert(next.id()) {
            log::debug!("base chain of '{}' loops at '{}'", key.name(), next.name());
            break;
        }
        chain.push(next);
        base = next.base();
    }

    let mut managed: Vec<Arc<PropertyDescriptor>> = Vec::new();
    let mut owners: HashMap<&'static str, &'static str> = HashMap::new();
    let mut unmanaged: Vec<UnmanagedProperty> = Vec::new();

    for ty in chain.iter().rev() {
        for descriptor in declared_for(declared, *ty)?.iter() {
            if let Some(&base) = owners.get(descriptor.name()) {
                return Err(PropertyError::ShadowedProperty {
                    owner: ty.name(),
                    base,
                    name: descriptor.name(),
                });
            }
            owners.insert(descriptor.name(), ty.name());
            managed.push(Arc::clone(descriptor));
        }
    }

    for ty in chain.iter().rev() {
        for property in ty.unmanaged() {
            let known = owners.contains_key(property.name)
                || unmanaged.iter().any(|p| p.name == property.name);
            if !known {
                unmanaged.push(property);
            }
        }
    }

    Ok(TypeMetadata::new(key, managed, unmanaged))
}

/// Returns the metadata of `key` from the global cache.
///
/// # Errors
///
/// See [`TypeMetadataCache::get_type_metadata`].
pub fn get_type_metadata(key: TypeKey) -> Result<Arc<TypeMetadata>, PropertyError> {
    TypeMetadataCache::global().get_type_metadata(key)
}

/// Registers a property on `owner` in the global cache.
///
/// # Errors
///
/// See [`TypeMetadataCache::register_property`].
pub fn register_property(owner: TypeKey, descriptor: PropertyDescriptor) -> Result<(), PropertyError> {
    TypeMetadataCache::global().register_property(owner, descriptor)
}

/// Removes a property from `owner` in the global cache.
pub fn unregister_property(owner: TypeKey, name: &str) -> bool {
    TypeMetadataCache::global().unregister_property(owner, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PropertyDescriptorBuilder;
    use crate::id::{Property, PropertySlot};
    use crate::metadata::PropertyRegistrar;

    struct Base;
    struct Derived;
    struct Shadowing;
    struct Looping;

    impl ModelType for Base {
        fn type_name() -> &'static str {
            "Base"
        }
        fn register_properties(registrar: &mut PropertyRegistrar) {
            registrar.register(PropertyDescriptorBuilder::new(Property::<i64>::new("Id"), 0).build());
        }
        fn unmanaged_properties() -> Vec<UnmanagedProperty> {
            vec![
                UnmanagedProperty::of::<i64>("Id"),
                UnmanagedProperty::of::<bool>("IsNew"),
            ]
        }
    }

    impl ModelType for Derived {
        fn type_name() -> &'static str {
            "Derived"
        }
        fn base_type() -> Option<TypeKey> {
            Some(TypeKey::of::<Base>())
        }
        fn register_properties(registrar: &mut PropertyRegistrar) {
            registrar.register(
                PropertyDescriptorBuilder::new(Property::<String>::new("Label"), String::new())
                    .build(),
            );
        }
    }

    impl ModelType for Shadowing {
        fn type_name() -> &'static str {
            "Shadowing"
        }
        fn base_type() -> Option<TypeKey> {
            Some(TypeKey::of::<Base>())
        }
        fn register_properties(registrar: &mut PropertyRegistrar) {
            registrar.register(PropertyDescriptorBuilder::new(Property::<i64>::new("Id"), 1).build());
        }
    }

    impl ModelType for Looping {
        fn base_type() -> Option<TypeKey> {
            Some(TypeKey::of::<Self>())
        }
        fn register_properties(registrar: &mut PropertyRegistrar) {
            registrar.register(PropertyDescriptorBuilder::new(Property::<i32>::new("X"), 0).build());
        }
    }

    #[test]
    fn base_properties_come_first() {
        let cache = TypeMetadataCache::new();
        let metadata = cache.get::<Derived>().unwrap();
        let names: Vec<_> = metadata.managed_properties().map(|(_, d)| d.name()).collect();
        assert_eq!(names, ["Id", "Label"]);
        // "Id" is managed, so only "IsNew" stays unmanaged.
        assert_eq!(metadata.unmanaged_properties(), [UnmanagedProperty::of::<bool>("IsNew")]);
    }

    #[test]
    fn lookups_are_memoized() {
        let cache = TypeMetadataCache::new();
        let a = cache.get::<Derived>().unwrap();
        let b = cache.get::<Derived>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.is_resolved(TypeKey::of::<Derived>()));
    }

    #[test]
    fn shadowing_a_base_property_is_rejected() {
        let cache = TypeMetadataCache::new();
        assert_eq!(
            cache.get::<Shadowing>().unwrap_err(),
            PropertyError::ShadowedProperty {
                owner: "Shadowing",
                base: "Base",
                name: "Id"
            }
        );
        // The base itself is still fine.
        assert!(cache.get::<Base>().is_ok());
    }

    #[test]
    fn looping_base_chain_terminates() {
        let cache = TypeMetadataCache::new();
        assert_eq!(cache.get::<Looping>().unwrap().len(), 1);
    }

    #[test]
    fn register_and_unregister_invalidate() {
        let cache = TypeMetadataCache::new();
        let before = cache.get::<Derived>().unwrap();

        let extra = PropertyDescriptorBuilder::new(Property::<bool>::new("Extra"), false).build();
        cache
            .register_property(TypeKey::of::<Derived>(), extra)
            .unwrap();
        assert!(!cache.is_resolved(TypeKey::of::<Derived>()));

        let after = cache.get::<Derived>().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.slot("Extra"), Some(PropertySlot::new(2)));

        assert!(cache.unregister_property(TypeKey::of::<Derived>(), "Extra"));
        assert!(!cache.unregister_property(TypeKey::of::<Derived>(), "Extra"));
        assert!(!cache.get::<Derived>().unwrap().is_registered("Extra"));
    }

    #[test]
    fn register_rejects_duplicates_and_shadowing() {
        let cache = TypeMetadataCache::new();
        let label = PropertyDescriptorBuilder::new(Property::<String>::new("Label"), String::new()).build();
        assert_eq!(
            cache.register_property(TypeKey::of::<Derived>(), label),
            Err(PropertyError::AlreadyRegistered {
                owner: "Derived",
                name: "Label"
            })
        );

        let id = PropertyDescriptorBuilder::new(Property::<i64>::new("Id"), 0).build();
        assert_eq!(
            cache.register_property(TypeKey::of::<Derived>(), id),
            Err(PropertyError::ShadowedProperty {
                owner: "Derived",
                base: "Base",
                name: "Id"
            })
        );
    }
}
