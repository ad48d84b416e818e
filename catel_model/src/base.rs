// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The state every model embeds.
//!
//! [`ModelBase`] pairs a sparse [`PropertyValueStore`] with the shared
//! [`TypeMetadata`] of the model's type, and carries the per-instance state
//! layered on top: dirty flag, suspension counters, deferred notifications,
//! the validation context, the edit backup and the subscriptions to
//! change-notifying child values.
//!
//! Behavior that needs the model's hooks lives on the extension traits
//! ([`ModelExt`](crate::ModelExt), [`ValidatableModel`](crate::ValidatableModel),
//! [`EditableModel`](crate::EditableModel)); `ModelBase` offers the parts
//! that do not.

use core::cell::Cell;
use core::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use catel_property::{
    ChangeHandler, ChangeNotification, ErasedValue, ModelType, Property, PropertyDescriptor,
    PropertyError, PropertyReader, PropertySlot, PropertyValue, PropertyValueStore, Subscribers,
    SubscriptionId, TypeMetadata, TypeMetadataCache,
};
use hashbrown::HashMap;

use crate::events::{
    ErrorsChangedEventArgs, ModelEvents, PropertyChangedEventArgs, PropertyChangingEventArgs,
};
use crate::options::ModelOptions;
use crate::validation::{
    BusinessRuleValidationResult, FieldValidationResult, ValidationContext,
    ValidationContextChanges, ValidationResult, Validator,
};

/// State reachable from child change handlers.
pub(crate) struct ModelShared {
    dirty: Cell<bool>,
    stale: Cell<bool>,
    notify_depth: Cell<usize>,
    lean: bool,
    forward: Subscribers<ChangeNotification>,
}

impl ModelShared {
    fn notifications_suspended(&self) -> bool {
        self.lean || self.notify_depth.get() > 0
    }

    fn child_changed(&self, property: &'static str) {
        self.dirty.set(true);
        self.stale.set(true);
        if !self.notifications_suspended() {
            self.forward
                .emit(&ChangeNotification::PropertyChanged { property });
        }
    }

    pub(crate) fn subscribe(&self, handler: ChangeHandler) -> SubscriptionId {
        self.forward.subscribe(handler)
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.forward.unsubscribe(id)
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }
}

/// How a value reaches the store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SetMode {
    /// A regular assignment: no-op detection, veto, dirty, events.
    Normal,
    /// Rolling back an edit: never a no-op, never vetoed.
    Restore,
    /// Deserialization: no dirty flag, no events, no callback.
    Load,
}

#[derive(Debug)]
struct PendingChange {
    property: &'static str,
    old_value: ErasedValue,
    new_value: ErasedValue,
}

#[derive(Debug)]
struct EditBackup {
    values: Vec<(PropertySlot, ErasedValue)>,
    was_dirty: bool,
    unbacked_changed: bool,
}

/// Per-instance model state.
///
/// A model type embeds one `ModelBase` and exposes it through
/// [`Model`](crate::Model):
///
/// ```rust
/// use catel_model::{
///     Model, ModelBase, ModelExt, ModelType, Property, PropertyDescriptorBuilder,
///     PropertyRegistrar,
/// };
///
/// const NAME: Property<Option<String>> = Property::new("Name");
///
/// #[derive(Debug)]
/// struct Person {
///     base: ModelBase,
/// }
///
/// impl ModelType for Person {
///     fn register_properties(registrar: &mut PropertyRegistrar) {
///         registrar.register(PropertyDescriptorBuilder::new(NAME, None).build());
///     }
/// }
///
/// impl Model for Person {
///     fn model(&self) -> &ModelBase {
///         &self.base
///     }
///
///     fn model_mut(&mut self) -> &mut ModelBase {
///         &mut self.base
///     }
/// }
///
/// let mut person = Person { base: ModelBase::new::<Person>() };
/// assert!(!person.is_dirty());
/// person.set_value(NAME, Some(String::from("Alice")));
/// assert!(person.is_dirty());
/// ```
pub struct ModelBase {
    metadata: Arc<TypeMetadata>,
    store: PropertyValueStore,
    options: ModelOptions,
    shared: Rc<ModelShared>,
    events: ModelEvents,
    pending_changes: Vec<PendingChange>,
    validation_depth: usize,
    pending_validation: Vec<&'static str>,
    context: ValidationContext,
    validator: Option<Rc<dyn Validator>>,
    backup: Option<EditBackup>,
    children: HashMap<PropertySlot, SubscriptionId>,
}

impl ModelBase {
    /// Creates the state of a `T` with default options.
    ///
    /// # Panics
    ///
    /// Panics if `T`'s property registration is invalid. See
    /// [`try_new`](Self::try_new).
    #[must_use]
    pub fn new<T: ModelType>() -> Self {
        Self::with_options::<T>(ModelOptions::default())
    }

    /// Creates the state of a `T` with `options`.
    ///
    /// # Panics
    ///
    /// Panics if `T`'s property registration is invalid.
    #[must_use]
    pub fn with_options<T: ModelType>(options: ModelOptions) -> Self {
        match Self::try_with_options::<T>(options) {
            Ok(base) => base,
            Err(err) => panic!("cannot create model '{}': {err}", T::type_name()),
        }
    }

    /// Creates the state of a `T` with default options.
    ///
    /// # Errors
    ///
    /// Returns the registration error of `T` or one of its base types.
    pub fn try_new<T: ModelType>() -> Result<Self, PropertyError> {
        Self::try_with_options::<T>(ModelOptions::default())
    }

    /// Creates the state of a `T` with `options`.
    ///
    /// # Errors
    ///
    /// Returns the registration error of `T` or one of its base types.
    pub fn try_with_options<T: ModelType>(options: ModelOptions) -> Result<Self, PropertyError> {
        let metadata = TypeMetadataCache::global().get::<T>()?;
        Ok(Self::from_metadata(metadata, options))
    }

    /// Creates model state over already resolved metadata.
    ///
    /// Factory defaults are produced once here, so every instance owns its
    /// own value; change-notifying defaults are subscribed right away.
    #[must_use]
    pub fn from_metadata(metadata: Arc<TypeMetadata>, options: ModelOptions) -> Self {
        let mut base = Self {
            metadata: Arc::clone(&metadata),
            store: PropertyValueStore::new(),
            options,
            shared: Rc::new(ModelShared {
                dirty: Cell::new(false),
                stale: Cell::new(true),
                notify_depth: Cell::new(0),
                lean: options.lean_and_mean(),
                forward: Subscribers::new(),
            }),
            events: ModelEvents::default(),
            pending_changes: Vec::new(),
            validation_depth: 0,
            pending_validation: Vec::new(),
            context: ValidationContext::new(),
            validator: None,
            backup: None,
            children: HashMap::new(),
        };
        for (slot, descriptor) in metadata.managed_properties() {
            if !(descriptor.has_factory_default() || descriptor.is_observable()) {
                continue;
            }
            if let Some(value) = descriptor.default_value() {
                base.attach_child(slot, descriptor, &value);
                if descriptor.has_factory_default() {
                    base.store.set(slot, value);
                }
            }
        }
        base
    }

    /// Returns the metadata of the model's type.
    #[must_use]
    pub fn metadata(&self) -> &Arc<TypeMetadata> {
        &self.metadata
    }

    /// Returns the explicitly stored values.
    #[must_use]
    pub fn store(&self) -> &PropertyValueStore {
        &self.store
    }

    /// Returns the instance options.
    #[must_use]
    pub fn options(&self) -> ModelOptions {
        self.options
    }

    /// Returns the model's events.
    #[must_use]
    pub fn events(&self) -> &ModelEvents {
        &self.events
    }

    /// Returns the current validation results.
    #[must_use]
    pub fn validation_context(&self) -> &ValidationContext {
        &self.context
    }

    /// Returns the injected validator.
    #[must_use]
    pub fn validator(&self) -> Option<&Rc<dyn Validator>> {
        self.validator.as_ref()
    }

    /// Injects or removes the validator. The next validation runs in full.
    pub fn set_validator(&mut self, validator: Option<Rc<dyn Validator>>) {
        self.validator = validator;
        self.shared.stale.set(true);
    }

    /// Returns `true` if the model or a change-notifying child has unsaved
    /// changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.get() || self.children_dirty()
    }

    fn children_dirty(&self) -> bool {
        // Literal defaults are attached without being stored.
        self.children.keys().any(|&slot| {
            let (Some(descriptor), Ok(value)) = (
                self.metadata.descriptor(slot),
                self.store.get_or_default(slot, &self.metadata),
            ) else {
                return false;
            };
            descriptor.notifier(&value).is_some_and(|n| n.is_dirty())
        })
    }

    /// Marks the model as saved. Children keep their own flags.
    pub fn clear_is_dirty(&mut self) {
        self.shared.dirty.set(false);
    }

    /// Returns `true` if validation results may be outdated.
    #[must_use]
    pub fn is_validation_stale(&self) -> bool {
        self.shared.stale.get()
    }

    /// Returns `true` while change notifications are held back.
    #[must_use]
    pub fn notifications_suspended(&self) -> bool {
        self.shared.notifications_suspended()
    }

    /// Returns `true` while eager validation is held back.
    #[must_use]
    pub fn validation_suspended(&self) -> bool {
        self.options.lean_and_mean() || self.validation_depth > 0
    }

    /// Returns `true` while an edit session is open.
    #[must_use]
    pub fn is_in_edit_session(&self) -> bool {
        self.backup.is_some()
    }

    /// Reads a typed property, computing calculated ones.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotRegistered`] or
    /// [`PropertyError::TypeMismatch`].
    pub fn try_get_value<T: PropertyValue>(&self, property: Property<T>) -> Result<T, PropertyError> {
        let slot = self.metadata.resolve(property)?;
        let value = self.value_of(slot)?;
        downcast(property.name(), &value)
    }

    /// Reads a typed property, computing calculated ones.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered with type `T`.
    #[must_use]
    pub fn get_value<T: PropertyValue>(&self, property: Property<T>) -> T {
        match self.try_get_value(property) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    fn value_of(&self, slot: PropertySlot) -> Result<ErasedValue, PropertyError> {
        let descriptor = self
            .metadata
            .descriptor(slot)
            .ok_or_else(|| PropertyError::NotRegistered {
                owner: self.metadata.type_name(),
                name: slot.to_string(),
            })?;
        match descriptor.compute(self) {
            Some(value) => Ok(value),
            None => self.store.get_or_default(slot, &self.metadata),
        }
    }

    /// Stores `value` and runs the side effects `mode` calls for.
    ///
    /// Returns `false` when nothing changed: an equal value under
    /// [`SetMode::Normal`] or a vetoed change.
    pub(crate) fn store_value(
        &mut self,
        slot: PropertySlot,
        value: ErasedValue,
        mode: SetMode,
    ) -> Result<bool, PropertyError> {
        let metadata = Arc::clone(&self.metadata);
        let descriptor = metadata
            .descriptor(slot)
            .ok_or_else(|| PropertyError::NotRegistered {
                owner: metadata.type_name(),
                name: slot.to_string(),
            })?;
        let property = descriptor.name();
        if descriptor.is_calculated() {
            return Err(PropertyError::CalculatedProperty { name: property });
        }

        let old_value = self.store.get_or_default(slot, &metadata)?;
        if mode != SetMode::Restore && old_value == value {
            return Ok(false);
        }

        let notify = mode != SetMode::Load && !self.notifications_suspended();
        if notify && mode == SetMode::Normal {
            let args = PropertyChangingEventArgs::new(property, old_value.clone(), value.clone());
            self.events.property_changing.emit(&args);
            if args.is_canceled() {
                log::debug!(
                    "change of '{}.{property}' vetoed",
                    metadata.type_name()
                );
                return Ok(false);
            }
        }

        self.detach_child(slot, descriptor, &old_value);
        self.store.set(slot, value.clone());
        self.attach_child(slot, descriptor, &value);
        self.shared.stale.set(true);
        if mode == SetMode::Load {
            return Ok(true);
        }

        self.shared.dirty.set(true);
        if mode == SetMode::Normal
            && !descriptor.include_in_backup()
            && let Some(backup) = &mut self.backup
        {
            backup.unbacked_changed = true;
        }
        descriptor.on_changed(&old_value, &value);

        if notify {
            self.raise_changed(property, old_value, value);
        } else if !self.options.lean_and_mean() {
            self.defer_changed(property, old_value, value);
        }
        Ok(true)
    }

    fn raise_changed(&self, property: &'static str, old_value: ErasedValue, new_value: ErasedValue) {
        self.events.property_changed.emit(&PropertyChangedEventArgs {
            property,
            old_value,
            new_value,
        });
        self.shared
            .forward
            .emit(&ChangeNotification::PropertyChanged { property });
    }

    fn defer_changed(&mut self, property: &'static str, old_value: ErasedValue, new_value: ErasedValue) {
        // First old value wins, latest new value wins.
        match self.pending_changes.iter_mut().find(|p| p.property == property) {
            Some(pending) => pending.new_value = new_value,
            None => self.pending_changes.push(PendingChange {
                property,
                old_value,
                new_value,
            }),
        }
    }

    fn detach_child(&mut self, slot: PropertySlot, descriptor: &PropertyDescriptor, value: &ErasedValue) {
        if let Some(id) = self.children.remove(&slot)
            && let Some(notifier) = descriptor.notifier(value)
        {
            notifier.unsubscribe(id);
        }
    }

    fn attach_child(&mut self, slot: PropertySlot, descriptor: &PropertyDescriptor, value: &ErasedValue) {
        let Some(notifier) = descriptor.notifier(value) else {
            return;
        };
        if let Some(id) = notifier.subscribe(self.child_handler(descriptor.name())) {
            self.children.insert(slot, id);
        }
    }

    fn child_handler(&self, property: &'static str) -> ChangeHandler {
        let shared: Weak<ModelShared> = Rc::downgrade(&self.shared);
        Rc::new(move |_: &ChangeNotification| {
            if let Some(shared) = shared.upgrade() {
                shared.child_changed(property);
            }
        })
    }

    pub(crate) fn hub(&self) -> Rc<ModelShared> {
        Rc::clone(&self.shared)
    }

    pub(crate) fn suspend_notifications(&mut self) {
        let depth = self.shared.notify_depth.get() + 1;
        self.shared.notify_depth.set(depth);
        log::trace!(
            "'{}' change notifications suspended (depth {depth})",
            self.metadata.type_name()
        );
    }

    pub(crate) fn resume_notifications(&mut self, flush: bool) {
        let depth = self.shared.notify_depth.get().saturating_sub(1);
        self.shared.notify_depth.set(depth);
        if depth > 0 || self.shared.lean {
            return;
        }
        let pending = core::mem::take(&mut self.pending_changes);
        if !flush {
            return;
        }
        log::trace!(
            "'{}' flushing {} deferred change notifications",
            self.metadata.type_name(),
            pending.len()
        );
        for change in pending {
            self.raise_changed(change.property, change.old_value, change.new_value);
        }
    }

    pub(crate) fn suspend_validation(&mut self) {
        self.validation_depth += 1;
    }

    /// Returns the properties to validate now that the last scope closed.
    pub(crate) fn resume_validation(&mut self) -> Vec<&'static str> {
        self.validation_depth = self.validation_depth.saturating_sub(1);
        if self.validation_suspended() {
            return Vec::new();
        }
        core::mem::take(&mut self.pending_validation)
    }

    pub(crate) fn queue_validation(&mut self, property: &'static str) {
        if !self.pending_validation.contains(&property) {
            self.pending_validation.push(property);
        }
    }

    /// Runs the descriptor rules of `properties`, or of every property.
    pub(crate) fn check_rules(&self, properties: Option<&[&str]>, results: &mut Vec<FieldValidationResult>) {
        for (slot, descriptor) in self.metadata.managed_properties() {
            if !descriptor.has_rules() {
                continue;
            }
            if properties.is_some_and(|names| !names.iter().any(|n| *n == descriptor.name())) {
                continue;
            }
            let Ok(value) = self.value_of(slot) else {
                continue;
            };
            results.extend(
                descriptor
                    .check(&value)
                    .into_iter()
                    .map(|v| FieldValidationResult::from_violation(descriptor.name(), v)),
            );
        }
    }

    /// Replaces every result with those of a full run.
    pub(crate) fn apply_validation(
        &mut self,
        fields: Vec<FieldValidationResult>,
        business_rules: Vec<BusinessRuleValidationResult>,
    ) {
        let fresh = fields
            .into_iter()
            .map(ValidationResult::Field)
            .chain(business_rules.into_iter().map(ValidationResult::BusinessRule))
            .collect();
        let changes = self.context.synchronize(fresh);
        self.shared.stale.set(false);
        self.raise_errors_changed(&changes);
        self.events.validated.emit(&self.context);
    }

    /// Replaces the field results of `properties`.
    pub(crate) fn apply_field_validation(&mut self, properties: &[&str], fields: Vec<FieldValidationResult>) {
        let changes = self.context.synchronize_fields(properties, fields);
        self.raise_errors_changed(&changes);
    }

    fn raise_errors_changed(&self, changes: &ValidationContextChanges) {
        for property in changes.affected() {
            self.events.errors_changed.emit(&ErrorsChangedEventArgs {
                property: property.map(str::to_owned),
            });
        }
    }

    pub(crate) fn take_backup(&mut self) {
        let values = self
            .metadata
            .managed_properties()
            .filter(|(_, d)| d.include_in_backup())
            .filter_map(|(slot, _)| Some((slot, self.store.get_or_default(slot, &self.metadata).ok()?)))
            .collect::<Vec<_>>();
        log::trace!(
            "'{}' edit session started with {} backed up properties",
            self.metadata.type_name(),
            values.len()
        );
        self.backup = Some(EditBackup {
            values,
            was_dirty: self.shared.dirty.get(),
            unbacked_changed: false,
        });
    }

    /// Restores the backup and closes the session.
    ///
    /// Returns the restored property names.
    pub(crate) fn restore_backup(&mut self) -> Vec<&'static str> {
        let Some(backup) = self.backup.take() else {
            return Vec::new();
        };
        let mut restored = Vec::with_capacity(backup.values.len());
        for (slot, value) in backup.values {
            if let Ok(true) = self.store_value(slot, value, SetMode::Restore)
                && let Some(descriptor) = self.metadata.descriptor(slot)
            {
                restored.push(descriptor.name());
            }
        }
        self.shared
            .dirty
            .set(backup.was_dirty || backup.unbacked_changed);
        log::trace!(
            "'{}' edit session canceled, {} properties restored",
            self.metadata.type_name(),
            restored.len()
        );
        restored
    }

    /// Closes the session without restoring.
    pub(crate) fn discard_backup(&mut self) -> bool {
        let open = self.backup.take().is_some();
        if open {
            log::trace!("'{}' edit session ended", self.metadata.type_name());
        }
        open
    }
}

impl PropertyReader for ModelBase {
    fn read_value(&self, name: &str) -> Result<ErasedValue, PropertyError> {
        let slot = self.metadata.resolve_name(name)?;
        self.value_of(slot)
    }
}

impl fmt::Debug for ModelBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBase")
            .field("type", &self.metadata.type_name())
            .field("values", &self.store)
            .field("dirty", &self.shared.dirty.get())
            .field("options", &self.options)
            .field("in_edit_session", &self.backup.is_some())
            .field("validation", &self.context)
            .finish_non_exhaustive()
    }
}

pub(crate) fn downcast<T: PropertyValue>(name: &str, value: &ErasedValue) -> Result<T, PropertyError> {
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| PropertyError::TypeMismatch {
            name: name.to_owned(),
            expected: value.type_name(),
            found: core::any::type_name::<T>(),
        })
}
