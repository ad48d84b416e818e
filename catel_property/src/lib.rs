// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Catel Property: registered, type-checked model properties.
//!
//! This crate provides the metadata layer of the Catel model framework. Model
//! types register their properties once; every instance then keeps only the
//! values that differ from the registered defaults.
//!
//! ## Core Concepts
//!
//! - [`Property<T>`]: a `const` typed key naming one property.
//! - [`PropertyDescriptor`]: immutable metadata for one property (default,
//!   serialization and backup flags, change callback, field rules). Built with
//!   [`PropertyDescriptorBuilder`].
//! - [`ModelType`]: how a type registers its descriptors and names its base
//!   type.
//! - [`TypeMetadataCache`]: the process-wide, thread-safe cache resolving a
//!   type into [`TypeMetadata`], base properties first.
//! - [`PropertyValueStore`]: per-instance sparse storage with default
//!   fallback.
//! - [`boxing`]: shared boxes for small primitives.
//!
//! ## Quick Start
//!
//! ```rust
//! use catel_property::{
//!     ErasedValue, ModelType, Property, PropertyDescriptorBuilder, PropertyRegistrar,
//!     PropertyValueStore, TypeMetadataCache,
//! };
//!
//! const NAME: Property<Option<String>> = Property::new("Name");
//! const AGE: Property<i32> = Property::new("Age");
//!
//! struct Person;
//!
//! impl ModelType for Person {
//!     fn register_properties(registrar: &mut PropertyRegistrar) {
//!         registrar
//!             .register(PropertyDescriptorBuilder::new(NAME, None).build())
//!             .register(PropertyDescriptorBuilder::new(AGE, 0).build());
//!     }
//! }
//!
//! let metadata = TypeMetadataCache::global().get::<Person>().unwrap();
//! let age = metadata.resolve(AGE).unwrap();
//!
//! let mut store = PropertyValueStore::new();
//! assert_eq!(store.get_or_default(age, &metadata), Ok(ErasedValue::new(0_i32)));
//!
//! store.set(age, ErasedValue::new(30_i32));
//! assert_eq!(store.get_or_default(age, &metadata), Ok(ErasedValue::new(30_i32)));
//! ```
//!
//! ## Errors
//!
//! Registration and lookup mistakes are programmer errors and are reported
//! as [`PropertyError`]. Invalid data never is: field rules produce
//! [`RuleViolation`]s that a model collects into its validation context.

pub mod boxing;
mod cache;
mod descriptor;
mod error;
mod id;
mod metadata;
mod notify;
pub mod rules;
mod store;
mod value;

pub use cache::{TypeMetadataCache, get_type_metadata, register_property, unregister_property};
pub use descriptor::{
    CalculatedGetter, ChangeCallback, FieldRule, NotifierAccessor, PropertyDescriptor,
    PropertyDescriptorBuilder, PropertyReader, RuleViolation, ValidationKind,
};
pub use error::PropertyError;
pub use id::{Property, PropertySlot};
pub use metadata::{ModelType, PropertyRegistrar, TypeKey, TypeMetadata, UnmanagedProperty};
pub use notify::{
    ChangeHandler, ChangeNotification, ChangeNotifier, CollectionChange, SubscriptionId,
    Subscribers,
};
pub use store::PropertyValueStore;
pub use value::{ErasedValue, PropertyValue};
