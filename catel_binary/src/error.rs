// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serializer errors.

use thiserror::Error;

/// Failures of shape discovery, encoding and decoding.
///
/// Serialization is all-or-nothing: any of these aborts the whole operation.
#[derive(Debug, Error)]
pub enum BinaryError {
    /// The type cannot be encoded.
    #[error("data type '{0}' is not supported")]
    NotSupported(&'static str),
    /// A value does not match the shape it is encoded or decoded against.
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        /// What the shape or target type calls for.
        expected: &'static str,
        /// What was supplied.
        found: &'static str,
    },
    /// A null was read into a type that cannot hold one.
    #[error("null is not allowed for '{type_name}'")]
    NullNotAllowed {
        /// The non-nullable target type.
        type_name: &'static str,
    },
    /// The stream does not contain a valid encoding.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// An object value lacks a property its shape lists.
    #[error("property '{name}' of '{type_name}' is missing")]
    MissingProperty {
        /// Object type.
        type_name: &'static str,
        /// Property name.
        name: &'static str,
    },
    /// The underlying stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
