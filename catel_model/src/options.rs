// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance model configuration.

/// Behavior switches for one model instance.
///
/// Built with [`ModelOptionsBuilder`]:
///
/// ```rust
/// use catel_model::ModelOptions;
///
/// let options = ModelOptions::builder()
///     .validate_on_property_change(false)
///     .build();
/// assert!(!options.validate_on_property_change());
/// assert!(!options.lean_and_mean());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModelOptions {
    lean_and_mean: bool,
    validate_on_property_change: bool,
    always_validate_field_rules: bool,
}

impl ModelOptions {
    /// Starts building options from the defaults.
    #[must_use]
    pub fn builder() -> ModelOptionsBuilder {
        ModelOptionsBuilder::new()
    }

    /// Returns whether change notification and validation are permanently
    /// suspended.
    #[must_use]
    #[inline]
    pub fn lean_and_mean(&self) -> bool {
        self.lean_and_mean
    }

    /// Returns whether a property change validates that property right away.
    #[must_use]
    #[inline]
    pub fn validate_on_property_change(&self) -> bool {
        self.validate_on_property_change
    }

    /// Returns whether descriptor field rules run even while validation is
    /// suspended.
    #[must_use]
    #[inline]
    pub fn always_validate_field_rules(&self) -> bool {
        self.always_validate_field_rules
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            lean_and_mean: false,
            validate_on_property_change: true,
            always_validate_field_rules: false,
        }
    }
}

/// Builder for [`ModelOptions`].
#[derive(Clone, Debug, Default)]
pub struct ModelOptionsBuilder {
    options: ModelOptions,
}

impl ModelOptionsBuilder {
    /// Creates a builder holding the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently suspends change notification and validation.
    ///
    /// Dirty tracking still works. Useful for bulk data objects that are
    /// never bound to a view.
    #[must_use]
    pub fn lean_and_mean(mut self, lean: bool) -> Self {
        self.options.lean_and_mean = lean;
        self
    }

    /// Sets whether a property change validates that property right away.
    #[must_use]
    pub fn validate_on_property_change(mut self, validate: bool) -> Self {
        self.options.validate_on_property_change = validate;
        self
    }

    /// Sets whether descriptor field rules run while validation is suspended.
    #[must_use]
    pub fn always_validate_field_rules(mut self, always: bool) -> Self {
        self.options.always_validate_field_rules = always;
        self
    }

    /// Builds the options.
    #[must_use]
    pub fn build(self) -> ModelOptions {
        self.options
    }
}
