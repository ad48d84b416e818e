// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary serialization of models.
//!
//! Re-exports [`catel_binary`] and connects it to the model layer:
//! [`ObservableCollection`] and [`Shared`] serialize like their contents, and
//! [`reflect_model!`](crate::reflect_model) implements [`Reflect`] for a
//! model type from its registered properties. Properties registered with
//! `include_in_serialization(false)` are skipped, and decoded values are
//! loaded without marking the model dirty.

pub use catel_binary::{
    Access, BinaryError, BinaryOptions, BinarySerializer, NULL_SENTINEL, NullEncoding,
    ObjectShape, ObjectValue, PrimitiveKind, PropertyInfo, PropertyShape, Reflect, Shape,
    ShapeCache, TypeInfo, Value, reflect_struct,
};

use catel_property::{ModelType, Property, PropertyValue, TypeMetadata, TypeMetadataCache};

use crate::collection::ObservableCollection;
use crate::model::{Model, ModelExt};
use crate::shared::Shared;

impl<T: Reflect> Reflect for ObservableCollection<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Collection {
            type_name: core::any::type_name::<Self>(),
            element: T::type_info,
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.items().iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, BinaryError> {
        value
            .into_list(core::any::type_name::<Self>())?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl<M: Model + Reflect> Reflect for Shared<M> {
    fn type_info() -> TypeInfo {
        M::type_info()
    }

    fn to_value(&self) -> Value {
        self.borrow().to_value()
    }

    fn from_value(value: Value) -> Result<Self, BinaryError> {
        M::from_value(value).map(Self::new)
    }
}

/// Describes model type `M` from its registered metadata. Used by
/// [`reflect_model!`](crate::reflect_model).
///
/// A type whose registration failed is reported as
/// [`TypeInfo::Unsupported`], so shape discovery fails instead of treating
/// every property as skipped.
#[doc(hidden)]
#[must_use]
pub fn model_type_info<M: ModelType>(
    properties: impl FnOnce(&TypeMetadata) -> Vec<PropertyInfo>,
) -> TypeInfo {
    let type_name = core::any::type_name::<M>();
    match TypeMetadataCache::global().get::<M>() {
        Ok(metadata) => TypeInfo::Object {
            type_name,
            properties: properties(&*metadata),
        },
        Err(err) => {
            log::warn!("cannot describe model '{type_name}': {err}");
            TypeInfo::Unsupported(type_name)
        }
    }
}

/// Describes `property` of a model with `metadata`. Used by
/// [`reflect_model!`](crate::reflect_model).
#[doc(hidden)]
#[must_use]
pub fn property_info<T: Reflect>(metadata: &TypeMetadata, property: Property<T>) -> PropertyInfo {
    let serialized = metadata
        .descriptor_by_name(property.name())
        .is_some_and(|d| d.include_in_serialization());
    PropertyInfo {
        name: property.name(),
        access: if serialized { Access::ReadWrite } else { Access::Private },
        type_info: T::type_info,
    }
}

/// Reads `property` of `model` into a value tree. Used by
/// [`reflect_model!`](crate::reflect_model).
#[doc(hidden)]
#[must_use]
pub fn property_value<M: Model, T: PropertyValue + Reflect>(model: &M, property: Property<T>) -> Value {
    model
        .try_get_value(property)
        .map_or(Value::Unsupported(property.name()), |value| value.to_value())
}

/// Loads a decoded value into `property` of `model`. Used by
/// [`reflect_model!`](crate::reflect_model).
///
/// # Errors
///
/// Returns the decoding error, or [`BinaryError::InvalidData`] if the
/// property cannot be stored.
#[doc(hidden)]
pub fn load_property<M: Model, T: PropertyValue + Reflect>(
    model: &mut M,
    property: Property<T>,
    value: Value,
) -> Result<(), BinaryError> {
    let value = T::from_value(value)?;
    model
        .try_load_value(property, value)
        .map_err(|err| BinaryError::InvalidData(err.to_string()))?;
    Ok(())
}

/// Implements [`Reflect`](crate::binary::Reflect) for a model type.
///
/// List the property keys to serialize. The type must implement
/// [`Default`]; decoding starts from a default instance and loads properties
/// in ascending name order without marking the model dirty. Properties
/// registered with `include_in_serialization(false)` are skipped even when
/// listed.
///
/// ```rust
/// use catel_model::binary::BinarySerializer;
/// use catel_model::{
///     reflect_model, Model, ModelBase, ModelExt, ModelType, Property,
///     PropertyDescriptorBuilder, PropertyRegistrar,
/// };
///
/// const NAME: Property<Option<String>> = Property::new("Name");
/// const AGE: Property<i32> = Property::new("Age");
///
/// #[derive(Debug)]
/// struct Person {
///     base: ModelBase,
/// }
///
/// impl Default for Person {
///     fn default() -> Self {
///         Self { base: ModelBase::new::<Self>() }
///     }
/// }
///
/// impl ModelType for Person {
///     fn register_properties(registrar: &mut PropertyRegistrar) {
///         registrar
///             .register(PropertyDescriptorBuilder::new(NAME, None).build())
///             .register(PropertyDescriptorBuilder::new(AGE, 0).build());
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
/// reflect_model!(Person { NAME, AGE });
///
/// let mut person = Person::default();
/// person.set_value(NAME, Some(String::from("Alice")));
/// person.set_value(AGE, 30);
///
/// let serializer = BinarySerializer::new();
/// let bytes = serializer.to_bytes(&person).unwrap();
/// let copy: Person = serializer.from_bytes(&bytes).unwrap();
/// assert_eq!(copy.get_value(NAME).as_deref(), Some("Alice"));
/// assert_eq!(copy.get_value(AGE), 30);
/// assert!(!copy.is_dirty());
/// ```
#[macro_export]
macro_rules! reflect_model {
    ($ty:ty { $($property:expr),* $(,)? }) => {
        impl $crate::binary::Reflect for $ty {
            fn type_info() -> $crate::binary::TypeInfo {
                $crate::binary::model_type_info::<$ty>(|metadata| {
                    ::std::vec![$($crate::binary::property_info(metadata, $property)),*]
                })
            }

            fn to_value(&self) -> $crate::binary::Value {
                let mut fields = $crate::binary::ObjectValue::new();
                $(fields.insert($property.name(), $crate::binary::property_value(self, $property));)*
                $crate::binary::Value::Object(fields)
            }

            fn from_value(
                value: $crate::binary::Value,
            ) -> ::core::result::Result<Self, $crate::binary::BinaryError> {
                let fields = value.into_object(::core::any::type_name::<$ty>())?;
                let mut model = <$ty as ::core::default::Default>::default();
                for (name, value) in fields {
                    $(
                        if name == $property.name() {
                            $crate::binary::load_property(&mut model, $property, value)?;
                            continue;
                        }
                    )*
                }
                ::core::result::Result::Ok(model)
            }
        }
    };
}
