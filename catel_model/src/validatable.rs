// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running validation on a model.
//!
//! A full run collects field results (descriptor rules, the model's
//! [`validate_fields`](crate::Model::validate_fields) hook, the injected
//! [`Validator`](crate::Validator)) and business rule results, then
//! synchronizes the model's [`ValidationContext`]. Partial runs validate
//! selected properties after a change and leave business rules alone.

use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::model::Model;
use crate::validation::{FieldValidationResult, ValidationContext};

/// Validation for every [`Model`].
pub trait ValidatableModel: Model {
    /// Validates the whole model.
    ///
    /// While validation is suspended nothing happens unless `force` is set;
    /// a forced run inside a suspension skips descriptor field rules unless
    /// the model was configured with
    /// [`always_validate_field_rules`](crate::ModelOptionsBuilder::always_validate_field_rules).
    fn validate_with(&mut self, force: bool) {
        let base = self.model();
        let suspended = base.validation_suspended();
        if suspended && !force {
            return;
        }
        let validator = base.validator().cloned();

        if let Some(validator) = &validator {
            validator.before_validation(base);
            validator.before_validate_fields(base);
        }
        let mut fields = Vec::new();
        if !suspended || base.options().always_validate_field_rules() {
            base.check_rules(None, &mut fields);
        }
        self.validate_fields(&mut fields);
        let mut business_rules = Vec::new();
        if let Some(validator) = &validator {
            validator.validate_fields(base, &mut fields);
            validator.after_validate_fields(base, &fields);
            validator.before_validate_business_rules(base);
        }
        self.validate_business_rules(&mut business_rules);
        if let Some(validator) = &validator {
            validator.validate_business_rules(base, &mut business_rules);
            validator.after_validate_business_rules(base, &business_rules);
            validator.after_validation(base, &fields, &business_rules);
        }

        self.model_mut().apply_validation(fields, business_rules);
    }

    /// Validates the whole model unless validation is suspended.
    fn validate(&mut self) {
        self.validate_with(false);
    }

    /// Re-validates the field results of `properties`.
    ///
    /// Business rule results are kept as they are.
    fn validate_properties(&mut self, properties: &[&str]) {
        let base = self.model();
        let mut fields = Vec::new();
        if !base.validation_suspended() || base.options().always_validate_field_rules() {
            base.check_rules(Some(properties), &mut fields);
        }
        let mut custom = Vec::new();
        self.validate_fields(&mut custom);
        if let Some(validator) = base.validator() {
            validator.validate_fields(base, &mut custom);
        }
        fields.extend(custom);
        self.model_mut().apply_field_validation(properties, fields);
    }

    /// Returns the current results without validating.
    fn validation_context(&self) -> &ValidationContext {
        self.model().validation_context()
    }

    /// Returns `true` if the model has errors, validating first if the
    /// results are outdated and validation is not suspended.
    fn has_errors(&mut self) -> bool {
        self.refresh_validation();
        self.validation_context().has_errors()
    }

    /// Returns `true` if the model has warnings, validating first if the
    /// results are outdated and validation is not suspended.
    fn has_warnings(&mut self) -> bool {
        self.refresh_validation();
        self.validation_context().has_warnings()
    }

    /// Returns the field errors of `property`, validating first if needed.
    fn field_errors(&mut self, property: &str) -> Vec<FieldValidationResult> {
        self.refresh_validation();
        self.validation_context()
            .field_errors(property)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Validates if the results are outdated and validation is not
    /// suspended.
    fn refresh_validation(&mut self) {
        if self.model().is_validation_stale() {
            self.validate_with(false);
        }
    }

    /// Holds back eager validation until the returned scope is dropped.
    ///
    /// Properties changed inside are validated once each when the outermost
    /// scope closes.
    fn suspend_validation(&mut self) -> ValidationSuspension<'_, Self> {
        self.model_mut().suspend_validation();
        ValidationSuspension { model: self }
    }
}

impl<M: Model + ?Sized> ValidatableModel for M {}

/// Validation suspension scope. Dereferences to the model.
pub struct ValidationSuspension<'a, M: Model + ?Sized> {
    model: &'a mut M,
}

impl<M: Model + ?Sized> Deref for ValidationSuspension<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: Model + ?Sized> DerefMut for ValidationSuspension<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.model
    }
}

impl<M: Model + ?Sized> Drop for ValidationSuspension<'_, M> {
    fn drop(&mut self) {
        let queued = self.model.model_mut().resume_validation();
        if !queued.is_empty() && !std::thread::panicking() {
            self.model.validate_properties(&queued);
        }
    }
}

impl<M: Model + ?Sized> fmt::Debug for ValidationSuspension<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationSuspension")
            .field("type", &self.model.model().metadata().type_name())
            .finish_non_exhaustive()
    }
}
