// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptors.
//!
//! This module provides [`PropertyDescriptor`], the immutable per-type record
//! describing one registered property, and [`PropertyDescriptorBuilder`] for
//! constructing it from a typed [`Property`] key.

use core::any::TypeId;
use core::fmt;
use std::sync::Arc;

use crate::error::PropertyError;
use crate::id::Property;
use crate::notify::ChangeNotifier;
use crate::value::{ErasedValue, PropertyValue};

/// Callback invoked after a property value changed, with the old and new value.
pub type ChangeCallback = Arc<dyn Fn(&ErasedValue, &ErasedValue) + Send + Sync>;

/// A field-level validation rule.
pub type FieldRule = Arc<dyn Fn(&ErasedValue) -> Option<RuleViolation> + Send + Sync>;

/// Getter of a calculated property.
pub type CalculatedGetter = Arc<dyn Fn(&dyn PropertyReader) -> ErasedValue + Send + Sync>;

type ValueFactory = Arc<dyn Fn() -> ErasedValue + Send + Sync>;

/// Views a stored value as a change notifier.
pub type NotifierAccessor = for<'a> fn(&'a ErasedValue) -> Option<&'a dyn ChangeNotifier>;

/// Severity of a validation result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// Informational problem; the object is still considered valid.
    Warning,
    /// The object is invalid.
    Error,
}

/// The outcome of a failed field rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleViolation {
    /// Severity.
    pub kind: ValidationKind,
    /// Human readable message.
    pub message: String,
    /// Optional grouping tag.
    pub tag: Option<String>,
}

impl RuleViolation {
    /// Creates an error-level violation.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::Error,
            message: message.into(),
            tag: None,
        }
    }

    /// Creates a warning-level violation.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::Warning,
            message: message.into(),
            tag: None,
        }
    }

    /// Attaches a grouping tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Read access to the properties of one model instance.
///
/// Calculated properties receive this view so they can derive their value
/// from other properties of the same object.
pub trait PropertyReader {
    /// Reads the current value of the named property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotRegistered`] if the name is unknown.
    fn read_value(&self, name: &str) -> Result<ErasedValue, PropertyError>;
}

impl dyn PropertyReader + '_ {
    /// Reads a typed property, returning `None` if it is unknown or of
    /// another type.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> Option<T> {
        self.read_value(property.name())
            .ok()?
            .downcast_ref::<T>()
            .cloned()
    }
}

enum DefaultSource {
    /// One shared value handed to every instance.
    Literal(ValueFactory),
    /// Invoked once per instance.
    Factory(ValueFactory),
    /// No stored value at all.
    Calculated(CalculatedGetter),
}

/// Immutable metadata describing one registered property.
///
/// Descriptors are built once per owning type, usually inside
/// [`ModelType::register_properties`](crate::ModelType::register_properties),
/// and shared by every instance through the
/// [`TypeMetadataCache`](crate::TypeMetadataCache).
///
/// # Example
///
/// ```rust
/// use catel_property::{ErasedValue, Property, PropertyDescriptorBuilder};
///
/// const AGE: Property<i32> = Property::new("Age");
///
/// let descriptor = PropertyDescriptorBuilder::new(AGE, 0)
///     .include_in_backup(false)
///     .build();
///
/// assert_eq!(descriptor.name(), "Age");
/// assert_eq!(descriptor.default_value(), Some(ErasedValue::new(0_i32)));
/// assert!(!descriptor.include_in_backup());
/// assert!(descriptor.include_in_serialization());
/// ```
pub struct PropertyDescriptor {
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    default: DefaultSource,
    include_in_serialization: bool,
    include_in_backup: bool,
    changed_callback: Option<ChangeCallback>,
    rules: Vec<FieldRule>,
    notifier: Option<NotifierAccessor>,
}

impl PropertyDescriptor {
    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the declared value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the declared value type name.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the property holds values of type `T`.
    #[must_use]
    #[inline]
    pub fn accepts<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Produces the default value.
    ///
    /// Literal defaults return the same shared allocation every time; factory
    /// defaults are invoked anew. Calculated properties have no default and
    /// return `None`.
    #[must_use]
    pub fn default_value(&self) -> Option<ErasedValue> {
        match &self.default {
            DefaultSource::Literal(make) | DefaultSource::Factory(make) => Some(make()),
            DefaultSource::Calculated(_) => None,
        }
    }

    /// Returns `true` if the default comes from a per-instance factory.
    #[must_use]
    pub fn has_factory_default(&self) -> bool {
        matches!(self.default, DefaultSource::Factory(_))
    }

    /// Returns `true` if the property is computed from other properties.
    #[must_use]
    pub fn is_calculated(&self) -> bool {
        matches!(self.default, DefaultSource::Calculated(_))
    }

    /// Computes a calculated property against `reader`.
    ///
    /// Returns `None` for stored properties.
    #[must_use]
    pub fn compute(&self, reader: &dyn PropertyReader) -> Option<ErasedValue> {
        match &self.default {
            DefaultSource::Calculated(getter) => Some(getter(reader)),
            _ => None,
        }
    }

    /// Returns whether the property takes part in serialization.
    #[must_use]
    #[inline]
    pub fn include_in_serialization(&self) -> bool {
        self.include_in_serialization
    }

    /// Returns whether the property is snapshotted by an edit transaction.
    #[must_use]
    #[inline]
    pub fn include_in_backup(&self) -> bool {
        self.include_in_backup
    }

    /// Invokes the changed callback if one is set.
    #[inline]
    pub fn on_changed(&self, old_value: &ErasedValue, new_value: &ErasedValue) {
        if let Some(callback) = &self.changed_callback {
            callback(old_value, new_value);
        }
    }

    /// Returns whether a changed callback is set.
    #[must_use]
    pub fn has_changed_callback(&self) -> bool {
        self.changed_callback.is_some()
    }

    /// Runs the field rules against `value`.
    #[must_use]
    pub fn check(&self, value: &ErasedValue) -> Vec<RuleViolation> {
        self.rules.iter().filter_map(|rule| rule(value)).collect()
    }

    /// Returns whether any field rules are attached.
    #[must_use]
    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Returns `true` if values of this property raise change notifications.
    #[must_use]
    pub fn is_observable(&self) -> bool {
        self.notifier.is_some()
    }

    /// Views `value` as a change notifier if the property is observable.
    #[must_use]
    pub fn notifier<'a>(&self, value: &'a ErasedValue) -> Option<&'a dyn ChangeNotifier> {
        self.notifier.and_then(|accessor| accessor(value))
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("calculated", &self.is_calculated())
            .field("factory_default", &self.has_factory_default())
            .field("include_in_serialization", &self.include_in_serialization)
            .field("include_in_backup", &self.include_in_backup)
            .field("rules", &self.rules.len())
            .field("observable", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`PropertyDescriptor`].
///
/// # Example
///
/// ```rust
/// use catel_property::{rules, Property, PropertyDescriptorBuilder};
///
/// const NAME: Property<Option<String>> = Property::new("Name");
/// const TAGS: Property<Vec<String>> = Property::new("Tags");
///
/// let name = PropertyDescriptorBuilder::new(NAME, None)
///     .rule(rules::required::<Option<String>>("Name is required"))
///     .build();
/// assert!(name.has_rules());
///
/// // Each instance gets its own vector.
/// let tags = PropertyDescriptorBuilder::with_factory(TAGS, Vec::new).build();
/// assert!(tags.has_factory_default());
/// ```
pub struct PropertyDescriptorBuilder<T> {
    property: Property<T>,
    default: DefaultSource,
    include_in_serialization: bool,
    include_in_backup: bool,
    changed_callback: Option<ChangeCallback>,
    rules: Vec<FieldRule>,
    notifier: Option<NotifierAccessor>,
}

impl<T: PropertyValue> PropertyDescriptorBuilder<T> {
    fn from_source(property: Property<T>, default: DefaultSource) -> Self {
        Self {
            property,
            default,
            include_in_serialization: true,
            include_in_backup: true,
            changed_callback: None,
            rules: Vec::new(),
            notifier: None,
        }
    }

    /// Starts a property with a literal default shared by all instances.
    #[must_use]
    pub fn new(property: Property<T>, default_value: T) -> Self
    where
        T: Send + Sync,
    {
        let shared = Arc::new(default_value);
        Self::from_source(
            property,
            DefaultSource::Literal(Arc::new(move || ErasedValue::from_arc(Arc::clone(&shared)))),
        )
    }

    /// Starts a property whose default is produced per instance.
    #[must_use]
    pub fn with_factory<F>(property: Property<T>, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_source(
            property,
            DefaultSource::Factory(Arc::new(move || ErasedValue::new(factory()))),
        )
    }

    /// Starts a calculated property.
    ///
    /// Calculated properties have no storage slot and are neither backed up
    /// nor serialized.
    #[must_use]
    pub fn calculated<F>(property: Property<T>, getter: F) -> Self
    where
        F: Fn(&dyn PropertyReader) -> T + Send + Sync + 'static,
    {
        let mut builder = Self::from_source(
            property,
            DefaultSource::Calculated(Arc::new(move |reader| ErasedValue::new(getter(reader)))),
        );
        builder.include_in_serialization = false;
        builder.include_in_backup = false;
        builder
    }

    /// Sets whether the property takes part in serialization.
    ///
    /// Ignored for calculated properties.
    #[must_use]
    pub fn include_in_serialization(mut self, include: bool) -> Self {
        self.include_in_serialization = include && !matches!(self.default, DefaultSource::Calculated(_));
        self
    }

    /// Sets whether the property is restored by a canceled edit.
    ///
    /// Ignored for calculated properties.
    #[must_use]
    pub fn include_in_backup(mut self, include: bool) -> Self {
        self.include_in_backup = include && !matches!(self.default, DefaultSource::Calculated(_));
        self
    }

    /// Sets a callback to be invoked after the value changes.
    #[must_use]
    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.changed_callback = Some(Arc::new(move |old: &ErasedValue, new: &ErasedValue| {
            if let (Some(old), Some(new)) = (old.downcast_ref::<T>(), new.downcast_ref::<T>()) {
                callback(old, new);
            }
        }));
        self
    }

    /// Adds a field rule. Rules run in the order they were added.
    #[must_use]
    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&T) -> Option<RuleViolation> + Send + Sync + 'static,
    {
        self.rules.push(Arc::new(move |value: &ErasedValue| {
            value.downcast_ref::<T>().and_then(&rule)
        }));
        self
    }

    /// Marks the property as holding change-notifying values.
    ///
    /// The owning model subscribes to each value it stores and unsubscribes
    /// when the value is replaced.
    #[must_use]
    pub fn observable(mut self) -> Self
    where
        T: ChangeNotifier,
    {
        self.notifier = Some(notifier_of::<T>);
        self
    }

    /// Marks the property as observable through a custom `accessor`.
    ///
    /// Use this when subscribing to a value needs more than its
    /// [`ChangeNotifier`] impl, such as enabling item tracking on a
    /// collection. The accessor runs whenever the owner attaches to, detaches
    /// from or inspects the stored value.
    #[must_use]
    pub fn observable_with(mut self, accessor: NotifierAccessor) -> Self {
        self.notifier = Some(accessor);
        self
    }

    /// Builds the [`PropertyDescriptor`].
    #[must_use]
    pub fn build(self) -> PropertyDescriptor {
        PropertyDescriptor {
            name: self.property.name(),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            default: self.default,
            include_in_serialization: self.include_in_serialization,
            include_in_backup: self.include_in_backup,
            changed_callback: self.changed_callback,
            rules: self.rules,
            notifier: self.notifier,
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptorBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptorBuilder")
            .field("property", &self.property.name())
            .field("include_in_serialization", &self.include_in_serialization)
            .field("include_in_backup", &self.include_in_backup)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

fn notifier_of<T: PropertyValue + ChangeNotifier>(value: &ErasedValue) -> Option<&dyn ChangeNotifier> {
    value.downcast_ref::<T>().map(|v| v as &dyn ChangeNotifier)
}
