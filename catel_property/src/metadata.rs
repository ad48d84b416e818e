// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-type property metadata.
//!
//! A model type describes itself through [`ModelType`]: the properties it
//! registers, an optional base type whose properties it inherits, and plain
//! (unmanaged) properties that exist outside the descriptor system. The
//! [`TypeMetadataCache`](crate::TypeMetadataCache) turns that description into
//! one shared [`TypeMetadata`] per type.

use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::descriptor::PropertyDescriptor;
use crate::error::PropertyError;
use crate::id::{Property, PropertySlot};

/// A type whose properties are registered with the metadata cache.
///
/// # Example
///
/// ```rust
/// use catel_property::{
///     ModelType, Property, PropertyDescriptorBuilder, PropertyRegistrar, TypeKey,
///     TypeMetadataCache,
/// };
///
/// struct Entity;
///
/// impl ModelType for Entity {
///     fn register_properties(registrar: &mut PropertyRegistrar) {
///         registrar.register(PropertyDescriptorBuilder::new(Property::<i64>::new("Id"), 0).build());
///     }
/// }
///
/// struct Person;
///
/// impl ModelType for Person {
///     fn base_type() -> Option<TypeKey> {
///         Some(TypeKey::of::<Entity>())
///     }
///
///     fn register_properties(registrar: &mut PropertyRegistrar) {
///         registrar.register(PropertyDescriptorBuilder::new(Property::<i32>::new("Age"), 0).build());
///     }
/// }
///
/// let metadata = TypeMetadataCache::global().get::<Person>().unwrap();
/// let names: Vec<_> = metadata.managed_properties().map(|(_, d)| d.name()).collect();
/// assert_eq!(names, ["Id", "Age"]);
/// ```
pub trait ModelType: 'static {
    /// Name used in diagnostics.
    fn type_name() -> &'static str {
        core::any::type_name::<Self>()
    }

    /// The type whose properties this type inherits.
    fn base_type() -> Option<TypeKey> {
        None
    }

    /// Registers the properties declared directly on this type.
    fn register_properties(registrar: &mut PropertyRegistrar);

    /// Plain properties that are discoverable but not registered.
    fn unmanaged_properties() -> Vec<UnmanagedProperty> {
        Vec::new()
    }
}

/// A handle to a [`ModelType`] usable without naming the type statically.
#[derive(Copy, Clone)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    base: fn() -> Option<TypeKey>,
    register: fn(&mut PropertyRegistrar),
    unmanaged: fn() -> Vec<UnmanagedProperty>,
}

impl TypeKey {
    /// Returns the key of `T`.
    #[must_use]
    pub fn of<T: ModelType>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::type_name(),
            base: T::base_type,
            register: T::register_properties,
            unmanaged: T::unmanaged_properties,
        }
    }

    /// Returns the [`TypeId`] of the type.
    #[must_use]
    #[inline]
    pub fn id(self) -> TypeId {
        self.id
    }

    /// Returns the type name.
    #[must_use]
    #[inline]
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Returns the base type, if any.
    #[must_use]
    pub fn base(self) -> Option<Self> {
        (self.base)()
    }

    pub(crate) fn declare(self) -> Result<Vec<Arc<PropertyDescriptor>>, PropertyError> {
        let mut registrar = PropertyRegistrar::new(self.name);
        (self.register)(&mut registrar);
        registrar.finish()
    }

    pub(crate) fn unmanaged(self) -> Vec<UnmanagedProperty> {
        (self.unmanaged)()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

/// Collects the descriptors a type declares.
///
/// Errors are recorded rather than raised so registration code stays a plain
/// sequence of calls; the first error is reported when the type's metadata is
/// built.
pub struct PropertyRegistrar {
    owner: &'static str,
    descriptors: Vec<Arc<PropertyDescriptor>>,
    error: Option<PropertyError>,
}

impl PropertyRegistrar {
    fn new(owner: &'static str) -> Self {
        Self {
            owner,
            descriptors: Vec::new(),
            error: None,
        }
    }

    /// Returns the name of the type being registered.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Registers a property on the type.
    pub fn register(&mut self, descriptor: PropertyDescriptor) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if descriptor.name().is_empty() {
            self.error = Some(PropertyError::EmptyName);
        } else if self.descriptors.iter().any(|d| d.name() == descriptor.name()) {
            self.error = Some(PropertyError::AlreadyRegistered {
                owner: self.owner,
                name: descriptor.name(),
            });
        } else {
            self.descriptors.push(Arc::new(descriptor));
        }
        self
    }

    fn finish(self) -> Result<Vec<Arc<PropertyDescriptor>>, PropertyError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.descriptors),
        }
    }
}

impl fmt::Debug for PropertyRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistrar")
            .field("owner", &self.owner)
            .field("count", &self.descriptors.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// A plain property discovered outside the descriptor system.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnmanagedProperty {
    /// Property name.
    pub name: &'static str,
    /// Value type name.
    pub type_name: &'static str,
}

impl UnmanagedProperty {
    /// Describes a plain property of type `T`.
    #[must_use]
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            name,
            type_name: core::any::type_name::<T>(),
        }
    }
}

/// The resolved property schema of one type, base properties first.
pub struct TypeMetadata {
    key: TypeKey,
    managed: Vec<Arc<PropertyDescriptor>>,
    by_name: HashMap<&'static str, PropertySlot>,
    unmanaged: Vec<UnmanagedProperty>,
}

impl TypeMetadata {
    pub(crate) fn new(
        key: TypeKey,
        managed: Vec<Arc<PropertyDescriptor>>,
        unmanaged: Vec<UnmanagedProperty>,
    ) -> Self {
        assert!(
            managed.len() < u16::MAX as usize,
            "Too many properties on '{}' (max {})",
            key.name(),
            u16::MAX
        );
        let by_name = managed
            .iter()
            .enumerate()
            .map(|(i, d)| {
                #[expect(clippy::cast_possible_truncation, reason = "checked above")]
                (d.name(), PropertySlot::new(i as u16))
            })
            .collect();
        Self {
            key,
            managed,
            by_name,
            unmanaged,
        }
    }

    /// Returns the key of the described type.
    #[must_use]
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Returns the name of the described type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.key.name()
    }

    /// Returns the number of managed properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.managed.len()
    }

    /// Returns `true` if the type has no managed properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managed.is_empty()
    }

    /// Looks up a slot by name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<PropertySlot> {
        self.by_name.get(name).copied()
    }

    /// Returns `true` if `name` is a managed property.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns the descriptor in `slot`.
    #[must_use]
    pub fn descriptor(&self, slot: PropertySlot) -> Option<&PropertyDescriptor> {
        self.managed.get(usize::from(slot.index())).map(Arc::as_ref)
    }

    /// Returns the descriptor registered under `name`.
    #[must_use]
    pub fn descriptor_by_name(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.slot(name).and_then(|slot| self.descriptor(slot))
    }

    /// Iterates managed properties in slot order.
    pub fn managed_properties(&self) -> impl Iterator<Item = (PropertySlot, &PropertyDescriptor)> {
        self.managed.iter().enumerate().map(|(i, d)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertySlot::new(i as u16), d.as_ref())
        })
    }

    /// Returns the plain properties not covered by a descriptor.
    #[must_use]
    pub fn unmanaged_properties(&self) -> &[UnmanagedProperty] {
        &self.unmanaged
    }

    /// Resolves a property name to its slot.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::EmptyName`] or
    /// [`PropertyError::NotRegistered`].
    pub fn resolve_name(&self, name: &str) -> Result<PropertySlot, PropertyError> {
        if name.is_empty() {
            return Err(PropertyError::EmptyName);
        }
        self.slot(name).ok_or_else(|| PropertyError::NotRegistered {
            owner: self.type_name(),
            name: name.to_owned(),
        })
    }

    /// Resolves a typed key to its slot, checking the value type.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::TypeMismatch`] when `T` differs from the
    /// registered type, in addition to the errors of
    /// [`resolve_name`](Self::resolve_name).
    pub fn resolve<T: 'static>(&self, property: Property<T>) -> Result<PropertySlot, PropertyError> {
        let slot = self.resolve_name(property.name())?;
        let descriptor = &self.managed[usize::from(slot.index())];
        if descriptor.accepts::<T>() {
            Ok(slot)
        } else {
            Err(PropertyError::TypeMismatch {
                name: property.name().to_owned(),
                expected: descriptor.type_name(),
                found: core::any::type_name::<T>(),
            })
        }
    }
}

impl fmt::Debug for TypeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("type", &self.key.name())
            .field(
                "managed",
                &self.managed.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .field("unmanaged", &self.unmanaged)
            .finish_non_exhaustive()
    }
}
