// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model events and their arguments.
//!
//! Handlers run synchronously on the thread mutating the model. They receive
//! their arguments by reference and must not borrow the model itself again;
//! capture shared state (`Rc<Cell<_>>`, `Rc<RefCell<_>>`) instead.

use core::cell::Cell;
use core::fmt;

use catel_property::{ErasedValue, Subscribers};

use crate::validation::ValidationContext;

/// Raised before a property value changes. Any handler may veto the change.
#[derive(Debug)]
pub struct PropertyChangingEventArgs {
    property: &'static str,
    old_value: ErasedValue,
    new_value: ErasedValue,
    cancel: Cell<bool>,
}

impl PropertyChangingEventArgs {
    pub(crate) fn new(property: &'static str, old_value: ErasedValue, new_value: ErasedValue) -> Self {
        Self {
            property,
            old_value,
            new_value,
            cancel: Cell::new(false),
        }
    }

    /// Name of the changing property.
    #[must_use]
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// The current value.
    #[must_use]
    pub fn old_value(&self) -> &ErasedValue {
        &self.old_value
    }

    /// The proposed value.
    #[must_use]
    pub fn new_value(&self) -> &ErasedValue {
        &self.new_value
    }

    /// Vetoes the change.
    pub fn cancel(&self) {
        self.cancel.set(true);
    }

    /// Returns `true` if a handler vetoed the change.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.cancel.get()
    }
}

/// Raised after a property value changed.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChangedEventArgs {
    /// Name of the changed property.
    pub property: &'static str,
    /// Value before the change.
    pub old_value: ErasedValue,
    /// Value after the change.
    pub new_value: ErasedValue,
}

/// Raised before a canceled edit restores its backup.
#[derive(Debug, Default)]
pub struct CancelEditEventArgs {
    cancel: Cell<bool>,
}

impl CancelEditEventArgs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Aborts the cancellation. The edit session stays open.
    pub fn cancel(&self) {
        self.cancel.set(true);
    }

    /// Returns `true` if the cancellation was aborted.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.cancel.get()
    }
}

/// Raised once per property whose validation results changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorsChangedEventArgs {
    /// The affected property, or `None` for business rule results.
    pub property: Option<String>,
}

/// The events a model raises.
#[derive(Default)]
pub struct ModelEvents {
    /// Before a property changes.
    pub property_changing: Subscribers<PropertyChangingEventArgs>,
    /// After a property changed.
    pub property_changed: Subscribers<PropertyChangedEventArgs>,
    /// An edit session started.
    pub begin_edit: Subscribers<()>,
    /// An edit session was committed.
    pub end_edit: Subscribers<()>,
    /// An edit session is about to be rolled back.
    pub cancel_edit: Subscribers<CancelEditEventArgs>,
    /// An edit session was rolled back.
    pub cancel_edit_completed: Subscribers<()>,
    /// A full validation finished.
    pub validated: Subscribers<ValidationContext>,
    /// Validation results changed for one property or for the business rules.
    pub errors_changed: Subscribers<ErrorsChangedEventArgs>,
}

impl fmt::Debug for ModelEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEvents")
            .field("property_changing", &self.property_changing.len())
            .field("property_changed", &self.property_changed.len())
            .field("begin_edit", &self.begin_edit.len())
            .field("end_edit", &self.end_edit.len())
            .field("cancel_edit", &self.cancel_edit.len())
            .field("cancel_edit_completed", &self.cancel_edit_completed.len())
            .field("validated", &self.validated.len())
            .field("errors_changed", &self.errors_changed.len())
            .finish()
    }
}
