// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Catel Binary: a reflective binary serializer.
//!
//! Types describe themselves through [`Reflect`]. The serializer resolves that
//! description into a [`Shape`] once per type, caches it process-wide in the
//! [`ShapeCache`], and walks it recursively to encode and decode values.
//! Only these kinds are supported:
//!
//! - 16, 32 and 64-bit signed integers, `char`, `bool`
//! - `f32`, `f64`, [`Decimal`](rust_decimal::Decimal),
//!   [`DateTime<Utc>`](chrono::DateTime), `String`
//! - `Vec<T>` and `VecDeque<T>` of supported types
//! - objects whose read-write properties are supported types
//!
//! Anything else fails with [`BinaryError::NotSupported`]. `Option<T>` marks a
//! nullable value.
//!
//! ## Quick Start
//!
//! ```rust
//! use catel_binary::{reflect_struct, BinarySerializer};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Item {
//!     name: String,
//! }
//!
//! reflect_struct!(Item { name: String => "Name" });
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Order {
//!     id: i64,
//!     items: Vec<Item>,
//!     note: Option<String>,
//! }
//!
//! reflect_struct!(Order {
//!     id: i64 => "Id",
//!     items: Vec<Item> => "Items",
//!     note: Option<String> => "Note",
//! });
//!
//! let order = Order {
//!     id: 7,
//!     items: vec![Item { name: String::from("Pen") }],
//!     note: None,
//! };
//!
//! let serializer = BinarySerializer::new();
//! let bytes = serializer.to_bytes(&order).unwrap();
//! assert_eq!(serializer.from_bytes::<Order>(&bytes).unwrap(), order);
//! ```
//!
//! See the [`serializer`] module for the wire format.

mod error;
mod reflect;
pub mod serializer;
mod shape;
mod value;

pub use error::BinaryError;
pub use reflect::{Access, PrimitiveKind, PropertyInfo, Reflect, TypeInfo};
pub use serializer::{
    BinaryOptions, BinarySerializer, MAX_ZERO_WIDTH_ELEMENTS, NULL_SENTINEL, NullEncoding,
};
pub use shape::{ObjectShape, PropertyShape, Shape, ShapeCache};
pub use value::{ObjectValue, Value};
