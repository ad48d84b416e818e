// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Begin/cancel/end edit sessions.

use crate::events::CancelEditEventArgs;
use crate::model::{Model, validate_changed};

/// Edit sessions for every [`Model`].
///
/// [`begin_edit`](Self::begin_edit) snapshots every property registered with
/// `include_in_backup`. [`cancel_edit`](Self::cancel_edit) puts those values
/// back; properties excluded from the backup keep whatever they hold.
/// [`end_edit`](Self::end_edit) keeps the current values.
///
/// ```rust
/// # use catel_model::{EditableModel, Model, ModelBase, ModelExt, ModelType, Property,
/// #     PropertyDescriptorBuilder, PropertyRegistrar};
/// # const AGE: Property<i32> = Property::new("Age");
/// # #[derive(Debug)]
/// # struct Person { base: ModelBase }
/// # impl ModelType for Person {
/// #     fn register_properties(r: &mut PropertyRegistrar) {
/// #         r.register(PropertyDescriptorBuilder::new(AGE, 0).build());
/// #     }
/// # }
/// # impl Model for Person {
/// #     fn model(&self) -> &ModelBase { &self.base }
/// #     fn model_mut(&mut self) -> &mut ModelBase { &mut self.base }
/// # }
/// let mut person = Person { base: ModelBase::new::<Person>() };
/// person.begin_edit();
/// person.set_value(AGE, 30);
/// assert!(person.cancel_edit());
/// assert_eq!(person.get_value(AGE), 0);
/// assert!(!person.is_dirty());
/// ```
pub trait EditableModel: Model {
    /// Opens an edit session. Does nothing if one is already open.
    fn begin_edit(&mut self) {
        if self.model().is_in_edit_session() {
            return;
        }
        self.model_mut().take_backup();
        self.model().events().begin_edit.emit(&());
        self.on_begin_edit();
    }

    /// Rolls the open session back.
    ///
    /// A `cancel_edit` handler or the
    /// [`on_cancel_edit`](Model::on_cancel_edit) hook may abort the
    /// cancellation; the session then stays open with its original backup.
    /// Restored properties always raise change events and the dirty flag
    /// returns to its value at [`begin_edit`](Self::begin_edit), unless a
    /// property outside the backup changed in between.
    ///
    /// Returns `false` if no session was open or the cancellation was
    /// aborted.
    fn cancel_edit(&mut self) -> bool {
        if !self.model().is_in_edit_session() {
            return false;
        }
        let args = CancelEditEventArgs::new();
        self.model().events().cancel_edit.emit(&args);
        if !args.is_canceled() {
            self.on_cancel_edit(&args);
        }
        if args.is_canceled() {
            log::debug!(
                "cancel of '{}' edit session aborted",
                self.model().metadata().type_name()
            );
            return false;
        }

        let restored = self.model_mut().restore_backup();
        if !restored.is_empty() {
            validate_changed(self, &restored);
        }
        self.model().events().cancel_edit_completed.emit(&());
        self.on_cancel_edit_completed();
        true
    }

    /// Commits the open session.
    ///
    /// Returns `false` if no session was open.
    fn end_edit(&mut self) -> bool {
        if !self.model_mut().discard_backup() {
            return false;
        }
        self.model().events().end_edit.emit(&());
        self.on_end_edit();
        true
    }

    /// Returns `true` while an edit session is open.
    fn is_in_edit_session(&self) -> bool {
        self.model().is_in_edit_session()
    }
}

impl<M: Model + ?Sized> EditableModel for M {}
