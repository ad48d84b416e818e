// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Catel Model: observable, validatable, editable model objects.
//!
//! A model is any type embedding a [`ModelBase`] and implementing [`Model`]
//! and [`ModelType`]. Its properties are registered once per type with
//! [`catel_property`]; each instance stores only the values that were set.
//!
//! ## Core Concepts
//!
//! - [`ModelExt`]: typed property access, dirty tracking, no-op detection
//!   and change notification with nestable suspension.
//! - [`ValidatableModel`]: field rules, model hooks and an injectable
//!   [`Validator`] feeding a [`ValidationContext`]; nestable validation
//!   suspension.
//! - [`EditableModel`]: begin/cancel/end edit sessions restoring the
//!   properties registered for backup.
//! - [`ObservableCollection`] and [`Shared`]: values that report their own
//!   changes to the model holding them.
//! - `binary` (feature, on by default): binary serialization of models.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use catel_model::{
//!     rules, EditableModel, Model, ModelBase, ModelExt, ModelType, Property,
//!     PropertyChangedEventArgs, PropertyDescriptorBuilder, PropertyRegistrar,
//!     ValidatableModel,
//! };
//!
//! const NAME: Property<Option<String>> = Property::new("Name");
//! const AGE: Property<i32> = Property::new("Age");
//!
//! #[derive(Debug)]
//! struct Person {
//!     base: ModelBase,
//! }
//!
//! impl Person {
//!     fn new() -> Self {
//!         Self { base: ModelBase::new::<Self>() }
//!     }
//! }
//!
//! impl ModelType for Person {
//!     fn register_properties(registrar: &mut PropertyRegistrar) {
//!         registrar
//!             .register(
//!                 PropertyDescriptorBuilder::new(NAME, None)
//!                     .rule(rules::required::<Option<String>>("Name is required"))
//!                     .build(),
//!             )
//!             .register(PropertyDescriptorBuilder::new(AGE, 0).build());
//!     }
//! }
//!
//! impl Model for Person {
//!     fn model(&self) -> &ModelBase {
//!         &self.base
//!     }
//!
//!     fn model_mut(&mut self) -> &mut ModelBase {
//!         &mut self.base
//!     }
//! }
//!
//! let mut person = Person::new();
//! assert!(!person.is_dirty());
//! assert!(person.has_errors());
//!
//! let changed = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&changed);
//! person
//!     .model()
//!     .events()
//!     .property_changed
//!     .subscribe(Rc::new(move |args: &PropertyChangedEventArgs| {
//!         sink.borrow_mut().push(args.property);
//!     }));
//!
//! person.set_value(NAME, Some(String::from("Alice")));
//! person.set_value(AGE, 30);
//! assert!(person.is_dirty());
//! assert!(!person.has_errors());
//! assert_eq!(*changed.borrow(), ["Name", "Age"]);
//!
//! person.begin_edit();
//! person.set_value(AGE, 31);
//! person.cancel_edit();
//! assert_eq!(person.get_value(AGE), 30);
//! ```

mod base;
#[cfg(feature = "binary")]
pub mod binary;
mod collection;
mod editable;
mod events;
mod model;
mod options;
mod shared;
mod validatable;
mod validation;

pub use base::ModelBase;
pub use collection::{ObservableCollection, ObservableItems};
pub use editable::EditableModel;
pub use events::{
    CancelEditEventArgs, ErrorsChangedEventArgs, ModelEvents, PropertyChangedEventArgs,
    PropertyChangingEventArgs,
};
pub use model::{Model, ModelExt, NotificationSuspension};
pub use options::{ModelOptions, ModelOptionsBuilder};
pub use shared::Shared;
pub use validatable::{ValidatableModel, ValidationSuspension};
pub use validation::{
    BusinessRuleValidationResult, FieldValidationResult, ValidationContext,
    ValidationContextChanges, ValidationResult, Validator,
};

pub use catel_property::{
    ChangeHandler, ChangeNotification, ChangeNotifier, CollectionChange, ErasedValue, ModelType,
    Property, PropertyDescriptor, PropertyDescriptorBuilder, PropertyError, PropertyReader,
    PropertyRegistrar, PropertySlot, PropertyValue, RuleViolation, Subscribers, SubscriptionId,
    TypeKey, TypeMetadata, TypeMetadataCache, UnmanagedProperty, ValidationKind, rules,
};
