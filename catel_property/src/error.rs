// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property system errors.

use thiserror::Error;

/// Programmer errors raised by property registration and lookup.
///
/// Invalid *data* is never reported through this type; it ends up in a
/// model's validation context instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// A property name was empty.
    #[error("property name must not be empty")]
    EmptyName,
    /// The property is not registered on the type.
    #[error("property '{name}' is not registered on '{owner}'")]
    NotRegistered {
        /// Type the lookup was made against.
        owner: &'static str,
        /// Requested property name.
        name: String,
    },
    /// The same type registered a property name twice.
    #[error("property '{name}' is already registered on '{owner}'")]
    AlreadyRegistered {
        /// Type that registered the property.
        owner: &'static str,
        /// Duplicate property name.
        name: &'static str,
    },
    /// A derived type registered a name already declared on its base chain.
    #[error("property '{name}' on '{owner}' is already registered on base type '{base}'")]
    ShadowedProperty {
        /// Derived type attempting the registration.
        owner: &'static str,
        /// Base type that declared the name first.
        base: &'static str,
        /// Property name.
        name: &'static str,
    },
    /// A value or key type does not match the registered property type.
    #[error("property '{name}' holds '{expected}', not '{found}'")]
    TypeMismatch {
        /// Property name.
        name: String,
        /// Registered value type.
        expected: &'static str,
        /// Type that was supplied or requested.
        found: &'static str,
    },
    /// Calculated properties have no stored value.
    #[error("property '{name}' is calculated and cannot be stored")]
    CalculatedProperty {
        /// Property name.
        name: &'static str,
    },
}
