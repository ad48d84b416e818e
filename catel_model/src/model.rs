// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The model trait and its property accessors.

use core::fmt;
use core::ops::{Deref, DerefMut};

use catel_property::{ErasedValue, Property, PropertyError, PropertyValue};

use crate::base::{ModelBase, SetMode};
use crate::events::CancelEditEventArgs;
use crate::validation::{BusinessRuleValidationResult, FieldValidationResult};
use crate::validatable::ValidatableModel;

/// A type built on a [`ModelBase`].
///
/// Only [`model`](Self::model) and [`model_mut`](Self::model_mut) are
/// required. The remaining methods are hooks with empty defaults; the
/// extension traits [`ModelExt`], [`ValidatableModel`] and
/// [`EditableModel`](crate::EditableModel) call them at the documented
/// points.
#[allow(unused_variables, reason = "default hooks ignore their arguments")]
pub trait Model {
    /// Returns the embedded model state.
    fn model(&self) -> &ModelBase;

    /// Returns the embedded model state mutably.
    fn model_mut(&mut self) -> &mut ModelBase;

    /// Called after an edit session started.
    fn on_begin_edit(&mut self) {}

    /// Called after an edit session was committed.
    fn on_end_edit(&mut self) {}

    /// Called before a canceled edit restores its backup. Call
    /// [`CancelEditEventArgs::cancel`] to keep the session open.
    fn on_cancel_edit(&mut self, args: &CancelEditEventArgs) {}

    /// Called after a canceled edit restored its backup.
    fn on_cancel_edit_completed(&mut self) {}

    /// Adds field results computed by the model itself.
    fn validate_fields(&self, results: &mut Vec<FieldValidationResult>) {}

    /// Adds whole-object results computed by the model itself.
    fn validate_business_rules(&self, results: &mut Vec<BusinessRuleValidationResult>) {}
}

/// Property access, dirty tracking and change notification suspension for
/// every [`Model`].
pub trait ModelExt: Model {
    /// Reads a typed property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotRegistered`] or
    /// [`PropertyError::TypeMismatch`].
    fn try_get_value<T: PropertyValue>(&self, property: Property<T>) -> Result<T, PropertyError> {
        self.model().try_get_value(property)
    }

    /// Reads a typed property.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered with type `T`.
    fn get_value<T: PropertyValue>(&self, property: Property<T>) -> T {
        self.model().get_value(property)
    }

    /// Assigns a property.
    ///
    /// Setting a value equal to the current one does nothing. Otherwise the
    /// change may be vetoed by a `property_changing` handler; if it is not,
    /// the model becomes dirty, the descriptor callback runs, the
    /// `property_changed` event fires (or is deferred while notifications are
    /// suspended) and the property is validated.
    ///
    /// Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotRegistered`],
    /// [`PropertyError::TypeMismatch`] or
    /// [`PropertyError::CalculatedProperty`].
    fn try_set_value<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
    ) -> Result<bool, PropertyError> {
        let slot = self.model().metadata().resolve(property)?;
        let changed = self
            .model_mut()
            .store_value(slot, ErasedValue::new(value), SetMode::Normal)?;
        if changed {
            validate_changed(self, &[property.name()]);
        }
        Ok(changed)
    }

    /// Assigns a property. See [`try_set_value`](Self::try_set_value).
    ///
    /// # Panics
    ///
    /// Panics on the errors of `try_set_value`.
    fn set_value<T: PropertyValue>(&mut self, property: Property<T>, value: T) -> bool {
        match self.try_set_value(property, value) {
            Ok(changed) => changed,
            Err(err) => panic!("{err}"),
        }
    }

    /// Assigns a property as loaded data.
    ///
    /// The model does not become dirty and no callback or event runs. Used
    /// when rebuilding a model from serialized data.
    ///
    /// # Errors
    ///
    /// Same as [`try_set_value`](Self::try_set_value).
    fn try_load_value<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
    ) -> Result<bool, PropertyError> {
        let slot = self.model().metadata().resolve(property)?;
        self.model_mut()
            .store_value(slot, ErasedValue::new(value), SetMode::Load)
    }

    /// Returns `true` if the model or a child has unsaved changes.
    fn is_dirty(&self) -> bool {
        self.model().is_dirty()
    }

    /// Marks the model as saved.
    fn clear_is_dirty(&mut self) {
        self.model_mut().clear_is_dirty();
    }

    /// Holds back change notifications until the returned scope is dropped.
    ///
    /// Scopes nest. When the outermost one closes, every property that
    /// changed inside is reported once, in the order it first changed, with
    /// its value from before the first change and its latest value.
    ///
    /// ```rust
    /// # use catel_model::{Model, ModelBase, ModelExt, ModelType, Property,
    /// #     PropertyDescriptorBuilder, PropertyRegistrar};
    /// # const A: Property<i32> = Property::new("A");
    /// # #[derive(Debug)]
    /// # struct Point { base: ModelBase }
    /// # impl ModelType for Point {
    /// #     fn register_properties(r: &mut PropertyRegistrar) {
    /// #         r.register(PropertyDescriptorBuilder::new(A, 0).build());
    /// #     }
    /// # }
    /// # impl Model for Point {
    /// #     fn model(&self) -> &ModelBase { &self.base }
    /// #     fn model_mut(&mut self) -> &mut ModelBase { &mut self.base }
    /// # }
    /// let mut point = Point { base: ModelBase::new::<Point>() };
    /// {
    ///     let mut scope = point.suspend_change_notifications();
    ///     scope.set_value(A, 1);
    ///     scope.set_value(A, 2);
    ///     assert!(scope.model().notifications_suspended());
    /// }
    /// assert!(!point.model().notifications_suspended());
    /// ```
    fn suspend_change_notifications(&mut self) -> NotificationSuspension<'_, Self> {
        self.model_mut().suspend_notifications();
        NotificationSuspension { model: self }
    }
}

impl<M: Model + ?Sized> ModelExt for M {}

/// Validates changed properties now, or queues them while validation is
/// suspended.
pub(crate) fn validate_changed<M: Model + ?Sized>(model: &mut M, properties: &[&'static str]) {
    let base = model.model_mut();
    if !base.options().validate_on_property_change() {
        return;
    }
    if base.validation_suspended() {
        if !base.options().lean_and_mean() {
            for property in properties {
                base.queue_validation(*property);
            }
        }
        return;
    }
    model.validate_properties(properties);
}

/// Change notification suspension scope.
///
/// Dereferences to the model. Dropping the last open scope of a model
/// delivers the deferred notifications, unless the thread is panicking.
pub struct NotificationSuspension<'a, M: Model + ?Sized> {
    model: &'a mut M,
}

impl<M: Model + ?Sized> Deref for NotificationSuspension<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: Model + ?Sized> DerefMut for NotificationSuspension<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.model
    }
}

impl<M: Model + ?Sized> Drop for NotificationSuspension<'_, M> {
    fn drop(&mut self) {
        self.model
            .model_mut()
            .resume_notifications(!std::thread::panicking());
    }
}

impl<M: Model + ?Sized> fmt::Debug for NotificationSuspension<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationSuspension")
            .field("type", &self.model.model().metadata().type_name())
            .finish_non_exhaustive()
    }
}
