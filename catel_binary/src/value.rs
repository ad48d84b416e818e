// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dynamic value tree exchanged between [`Reflect`](crate::Reflect)
//! types and the codec.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::BinaryError;

/// A reflected value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent value.
    Null,
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// Single character.
    Char(char),
    /// Boolean.
    Bool(bool),
    /// Single-precision float.
    F32(f32),
    /// Double-precision float.
    F64(f64),
    /// Decimal number.
    Decimal(Decimal),
    /// UTC date-time.
    DateTime(DateTime<Utc>),
    /// UTF-8 string.
    String(String),
    /// Homogeneous collection.
    List(Vec<Value>),
    /// Object with named properties.
    Object(ObjectValue),
    /// A value of a type the codec cannot encode.
    Unsupported(&'static str),
}

impl Value {
    /// Returns a short name of the variant, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Char(_) => "char",
            Self::Bool(_) => "bool",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Decimal(_) => "decimal",
            Self::DateTime(_) => "date-time",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::Unsupported(name) => name,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Unwraps a list value read for `type_name`.
    ///
    /// # Errors
    ///
    /// [`BinaryError::NullNotAllowed`] for null, [`BinaryError::TypeMismatch`]
    /// for any other variant.
    pub fn into_list(self, type_name: &'static str) -> Result<Vec<Self>, BinaryError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Null => Err(BinaryError::NullNotAllowed { type_name }),
            other => Err(BinaryError::TypeMismatch {
                expected: "list",
                found: other.kind_name(),
            }),
        }
    }

    /// Unwraps an object value read for `type_name`.
    ///
    /// # Errors
    ///
    /// [`BinaryError::NullNotAllowed`] for null, [`BinaryError::TypeMismatch`]
    /// for any other variant.
    pub fn into_object(self, type_name: &'static str) -> Result<ObjectValue, BinaryError> {
        match self {
            Self::Object(fields) => Ok(fields),
            Self::Null => Err(BinaryError::NullNotAllowed { type_name }),
            other => Err(BinaryError::TypeMismatch {
                expected: "object",
                found: other.kind_name(),
            }),
        }
    }
}

/// Named property values of one object, ordered by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectValue {
    fields: BTreeMap<&'static str, Value>,
}

impl ObjectValue {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, returning the previous value.
    pub fn insert(&mut self, name: &'static str, value: Value) -> Option<Value> {
        self.fields.insert(name, value)
    }

    /// Returns a property value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Removes and returns a property value.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates properties in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }
}

impl IntoIterator for ObjectValue {
    type Item = (&'static str, Value);
    type IntoIter = std::collections::btree_map::IntoIter<&'static str, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl FromIterator<(&'static str, Value)> for ObjectValue {
    fn from_iter<I: IntoIterator<Item = (&'static str, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
