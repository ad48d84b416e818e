// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static type descriptions consumed by shape discovery.
//!
//! A type opts into binary serialization by implementing [`Reflect`]: it
//! describes its own layout through [`TypeInfo`] and converts to and from the
//! dynamic [`Value`] tree. Plain structs get an implementation from
//! [`reflect_struct!`](crate::reflect_struct).

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::BinaryError;
use crate::value::Value;

/// The primitive kinds the codec can encode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// 16-bit signed integer, 2 bytes.
    I16,
    /// 32-bit signed integer, 4 bytes.
    I32,
    /// 64-bit signed integer, 8 bytes.
    I64,
    /// Character, one UTF-16 code unit.
    Char,
    /// Boolean, written as a 16-bit integer.
    Bool,
    /// Single-precision float, as text.
    F32,
    /// Double-precision float, as text.
    F64,
    /// Decimal, as text.
    Decimal,
    /// UTC date-time, as RFC 3339 text.
    DateTime,
    /// UTF-8 string.
    String,
}

impl PrimitiveKind {
    /// Returns the kind's diagnostic name, matching [`Value::kind_name`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::DateTime => "date-time",
            Self::String => "string",
        }
    }
}

/// Visibility of a reflected property.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Publicly readable and writable. Only these are serialized.
    ReadWrite,
    /// Publicly readable only.
    ReadOnly,
    /// Not externally visible.
    Private,
}

/// One property of an object type.
#[derive(Copy, Clone, Debug)]
pub struct PropertyInfo {
    /// Property name.
    pub name: &'static str,
    /// Visibility.
    pub access: Access,
    /// Describes the property type. Evaluated lazily so types may refer to
    /// themselves.
    pub type_info: fn() -> TypeInfo,
}

impl PropertyInfo {
    /// Describes a read-write property of type `T`.
    #[must_use]
    pub fn read_write<T: Reflect>(name: &'static str) -> Self {
        Self {
            name,
            access: Access::ReadWrite,
            type_info: T::type_info,
        }
    }

    /// Describes a read-only property of type `T`.
    #[must_use]
    pub fn read_only<T: Reflect>(name: &'static str) -> Self {
        Self {
            name,
            access: Access::ReadOnly,
            type_info: T::type_info,
        }
    }
}

/// The classification of a type, before discovery resolves it into a
/// [`Shape`](crate::Shape).
#[derive(Clone, Debug)]
pub enum TypeInfo {
    /// A supported primitive.
    Primitive(PrimitiveKind),
    /// A homogeneous collection.
    Collection {
        /// Collection type name, the shape cache key.
        type_name: &'static str,
        /// Describes the element type.
        element: fn() -> TypeInfo,
    },
    /// An object with named properties.
    Object {
        /// Object type name, the shape cache key.
        type_name: &'static str,
        /// Every property, in any order and of any visibility.
        properties: Vec<PropertyInfo>,
    },
    /// A type the codec cannot encode.
    Unsupported(&'static str),
}

/// A type the binary serializer can walk.
pub trait Reflect: Sized + 'static {
    /// Describes the type.
    fn type_info() -> TypeInfo;

    /// Converts `self` into a value tree.
    fn to_value(&self) -> Value;

    /// Rebuilds a value from a decoded value tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not fit the type.
    fn from_value(value: Value) -> Result<Self, BinaryError>;
}

macro_rules! reflect_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Primitive(PrimitiveKind::$kind)
                }

                fn to_value(&self) -> Value {
                    Value::$kind(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, BinaryError> {
                    match value {
                        Value::$kind(inner) => Ok(inner),
                        Value::Null => Err(BinaryError::NullNotAllowed {
                            type_name: core::any::type_name::<$ty>(),
                        }),
                        other => Err(BinaryError::TypeMismatch {
                            expected: PrimitiveKind::$kind.name(),
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

reflect_primitive!(
    i16 => I16,
    i32 => I32,
    i64 => I64,
    char => Char,
    bool => Bool,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    DateTime<Utc> => DateTime,
    String => String,
);

macro_rules! reflect_unsupported {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Unsupported(core::any::type_name::<$ty>())
                }

                fn to_value(&self) -> Value {
                    Value::Unsupported(core::any::type_name::<$ty>())
                }

                fn from_value(_: Value) -> Result<Self, BinaryError> {
                    Err(BinaryError::NotSupported(core::any::type_name::<$ty>()))
                }
            }
        )*
    };
}

reflect_unsupported!(i8, u8, u16, u32, u64, i128, u128, isize, usize);

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Reflect::to_value)
    }

    fn from_value(value: Value) -> Result<Self, BinaryError> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Collection {
            type_name: core::any::type_name::<Self>(),
            element: T::type_info,
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, BinaryError> {
        value
            .into_list(core::any::type_name::<Self>())?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Collection {
            type_name: core::any::type_name::<Self>(),
            element: T::type_info,
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, BinaryError> {
        value
            .into_list(core::any::type_name::<Self>())?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

/// Implements [`Reflect`] for a struct with named fields.
///
/// Every listed field becomes a read-write property under the given name.
/// The struct must implement [`Default`]: decoding starts from the default
/// value and assigns properties in ascending name order.
///
/// ```rust
/// use catel_binary::{reflect_struct, BinarySerializer};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
///     label: Option<String>,
/// }
///
/// reflect_struct!(Point {
///     x: i32 => "X",
///     y: i32 => "Y",
///     label: Option<String> => "Label",
/// });
///
/// let serializer = BinarySerializer::new();
/// let point = Point { x: 1, y: -2, label: None };
/// let bytes = serializer.to_bytes(&point).unwrap();
/// assert_eq!(serializer.from_bytes::<Point>(&bytes).unwrap(), point);
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($ty:ty { $($field:ident : $fty:ty => $name:literal),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::Object {
                    type_name: ::core::any::type_name::<$ty>(),
                    properties: ::std::vec![
                        $($crate::PropertyInfo::read_write::<$fty>($name)),*
                    ],
                }
            }

            fn to_value(&self) -> $crate::Value {
                let mut fields = $crate::ObjectValue::new();
                $(fields.insert($name, $crate::Reflect::to_value(&self.$field));)*
                $crate::Value::Object(fields)
            }

            fn from_value(value: $crate::Value) -> ::core::result::Result<Self, $crate::BinaryError> {
                let fields = value.into_object(::core::any::type_name::<$ty>())?;
                let mut object = <$ty as ::core::default::Default>::default();
                for (name, value) in fields {
                    match name {
                        $($name => object.$field = <$fty as $crate::Reflect>::from_value(value)?,)*
                        _ => {}
                    }
                }
                Ok(object)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_is_nullable_with_inner_shape() {
        assert!(matches!(
            <Option<i32>>::type_info(),
            TypeInfo::Primitive(PrimitiveKind::I32)
        ));
        assert_eq!(None::<i32>.to_value(), Value::Null);
        assert_eq!(<Option<i32>>::from_value(Value::Null).unwrap(), None);
        assert_eq!(<Option<i32>>::from_value(Value::I32(3)).unwrap(), Some(3));
    }

    #[test]
    fn non_nullable_rejects_null() {
        assert!(matches!(
            i64::from_value(Value::Null),
            Err(BinaryError::NullNotAllowed { .. })
        ));
        assert!(matches!(
            String::from_value(Value::I64(1)),
            Err(BinaryError::TypeMismatch { expected: "string", found: "i64" })
        ));
    }

    #[test]
    fn unsigned_integers_are_unsupported() {
        assert!(matches!(u32::type_info(), TypeInfo::Unsupported("u32")));
        assert_eq!(7_u8.to_value(), Value::Unsupported("u8"));
        assert!(matches!(
            usize::from_value(Value::I64(1)),
            Err(BinaryError::NotSupported("usize"))
        ));
    }

    #[test]
    fn collections_convert_elementwise() {
        let list = VecDeque::from([1_i16, 2]);
        let value = list.to_value();
        assert_eq!(value, Value::List(vec![Value::I16(1), Value::I16(2)]));
        assert_eq!(VecDeque::<i16>::from_value(value).unwrap(), list);
        assert!(Vec::<i16>::from_value(Value::List(vec![Value::I32(1)])).is_err());
    }
}
