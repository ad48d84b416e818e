// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validation results, the validation context and validator hooks.
//!
//! Invalid data is never an error in this crate: field rules, model hooks and
//! an optional [`Validator`] produce results that a model keeps in its
//! [`ValidationContext`]. Each validation run is synchronized against the
//! previous one, so listeners only hear about results that were actually
//! added or removed.

use core::fmt;

use catel_property::{RuleViolation, ValidationKind};

use crate::base::ModelBase;

/// A result attached to one property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldValidationResult {
    /// The validated property.
    pub property: String,
    /// Severity.
    pub kind: ValidationKind,
    /// Human readable message.
    pub message: String,
    /// Optional grouping tag.
    pub tag: Option<String>,
}

impl FieldValidationResult {
    /// Creates an error for `property`.
    #[must_use]
    pub fn error(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            kind: ValidationKind::Error,
            message: message.into(),
            tag: None,
        }
    }

    /// Creates a warning for `property`.
    #[must_use]
    pub fn warning(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            kind: ValidationKind::Warning,
            message: message.into(),
            tag: None,
        }
    }

    /// Converts a failed field rule into a result for `property`.
    #[must_use]
    pub fn from_violation(property: impl Into<String>, violation: RuleViolation) -> Self {
        Self {
            property: property.into(),
            kind: violation.kind,
            message: violation.message,
            tag: violation.tag,
        }
    }

    /// Attaches a grouping tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// A result about the object as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusinessRuleValidationResult {
    /// Severity.
    pub kind: ValidationKind,
    /// Human readable message.
    pub message: String,
    /// Optional grouping tag.
    pub tag: Option<String>,
}

impl BusinessRuleValidationResult {
    /// Creates a business rule error.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::Error,
            message: message.into(),
            tag: None,
        }
    }

    /// Creates a business rule warning.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::Warning,
            message: message.into(),
            tag: None,
        }
    }

    /// Attaches a grouping tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Either kind of validation result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    /// A field result.
    Field(FieldValidationResult),
    /// A business rule result.
    BusinessRule(BusinessRuleValidationResult),
}

impl ValidationResult {
    /// Returns the severity.
    #[must_use]
    pub fn kind(&self) -> ValidationKind {
        match self {
            Self::Field(result) => result.kind,
            Self::BusinessRule(result) => result.kind,
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Field(result) => &result.message,
            Self::BusinessRule(result) => &result.message,
        }
    }

    /// Returns the grouping tag.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Field(result) => result.tag.as_deref(),
            Self::BusinessRule(result) => result.tag.as_deref(),
        }
    }

    /// Returns the property of a field result, `None` for business rules.
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::Field(result) => Some(&result.property),
            Self::BusinessRule(_) => None,
        }
    }
}

impl From<FieldValidationResult> for ValidationResult {
    fn from(result: FieldValidationResult) -> Self {
        Self::Field(result)
    }
}

impl From<BusinessRuleValidationResult> for ValidationResult {
    fn from(result: BusinessRuleValidationResult) -> Self {
        Self::BusinessRule(result)
    }
}

/// What a synchronization added to and removed from a context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationContextChanges {
    /// Results present now but not before.
    pub added: Vec<ValidationResult>,
    /// Results present before but not now.
    pub removed: Vec<ValidationResult>,
}

impl ValidationContextChanges {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Returns every affected property once, in first-seen order.
    ///
    /// `None` stands for the business rules.
    #[must_use]
    pub fn affected(&self) -> Vec<Option<&str>> {
        let mut affected: Vec<Option<&str>> = Vec::new();
        for result in self.added.iter().chain(&self.removed) {
            let property = result.property();
            if !affected.contains(&property) {
                affected.push(property);
            }
        }
        affected
    }
}

/// The current warnings and errors of one model.
///
/// ```rust
/// use catel_model::{FieldValidationResult, ValidationContext, ValidationResult};
///
/// let mut context = ValidationContext::new();
/// let changes = context.synchronize(vec![
///     FieldValidationResult::error("Name", "Name is required").into(),
/// ]);
/// assert_eq!(changes.affected(), [Some("Name")]);
/// assert!(context.has_errors());
///
/// let changes = context.synchronize(Vec::new());
/// assert_eq!(changes.removed.len(), 1);
/// assert!(context.is_empty());
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    results: Vec<ValidationResult>,
}

impl ValidationContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if there are no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates every result.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter()
    }

    /// Returns `true` if any result is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.kind() == ValidationKind::Error)
    }

    /// Returns `true` if any result is a warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.results.iter().any(|r| r.kind() == ValidationKind::Warning)
    }

    /// Iterates field results.
    pub fn field_results(&self) -> impl Iterator<Item = &FieldValidationResult> {
        self.results.iter().filter_map(|r| match r {
            ValidationResult::Field(result) => Some(result),
            ValidationResult::BusinessRule(_) => None,
        })
    }

    /// Iterates business rule results.
    pub fn business_rule_results(&self) -> impl Iterator<Item = &BusinessRuleValidationResult> {
        self.results.iter().filter_map(|r| match r {
            ValidationResult::BusinessRule(result) => Some(result),
            ValidationResult::Field(_) => None,
        })
    }

    /// Returns the field errors of `property`.
    #[must_use]
    pub fn field_errors(&self, property: &str) -> Vec<&FieldValidationResult> {
        self.field_results_of(property, ValidationKind::Error)
    }

    /// Returns the field warnings of `property`.
    #[must_use]
    pub fn field_warnings(&self, property: &str) -> Vec<&FieldValidationResult> {
        self.field_results_of(property, ValidationKind::Warning)
    }

    fn field_results_of(&self, property: &str, kind: ValidationKind) -> Vec<&FieldValidationResult> {
        self.field_results()
            .filter(|r| r.property == property && r.kind == kind)
            .collect()
    }

    /// Returns the business rule errors.
    #[must_use]
    pub fn business_rule_errors(&self) -> Vec<&BusinessRuleValidationResult> {
        self.business_rule_results()
            .filter(|r| r.kind == ValidationKind::Error)
            .collect()
    }

    /// Returns the business rule warnings.
    #[must_use]
    pub fn business_rule_warnings(&self) -> Vec<&BusinessRuleValidationResult> {
        self.business_rule_results()
            .filter(|r| r.kind == ValidationKind::Warning)
            .collect()
    }

    /// Returns the results carrying `tag`. `None` selects untagged results.
    #[must_use]
    pub fn results_by_tag(&self, tag: Option<&str>) -> Vec<&ValidationResult> {
        self.results.iter().filter(|r| r.tag() == tag).collect()
    }

    /// Replaces every result with `fresh`.
    pub fn synchronize(&mut self, fresh: Vec<ValidationResult>) -> ValidationContextChanges {
        self.synchronize_where(|_| true, fresh)
    }

    /// Replaces the field results of `properties` with `fresh`.
    ///
    /// Results of other properties and business rule results are kept.
    /// Entries of `fresh` for properties outside `properties` are ignored.
    pub fn synchronize_fields(
        &mut self,
        properties: &[&str],
        fresh: Vec<FieldValidationResult>,
    ) -> ValidationContextChanges {
        let in_scope = |r: &ValidationResult| {
            r.property()
                .is_some_and(|p| properties.iter().any(|name| *name == p))
        };
        let fresh = fresh
            .into_iter()
            .map(ValidationResult::Field)
            .filter(|r| in_scope(r))
            .collect();
        self.synchronize_where(in_scope, fresh)
    }

    fn synchronize_where(
        &mut self,
        in_scope: impl Fn(&ValidationResult) -> bool,
        fresh: Vec<ValidationResult>,
    ) -> ValidationContextChanges {
        let removed = self
            .results
            .iter()
            .filter(|r| in_scope(r) && !fresh.contains(r))
            .cloned()
            .collect();
        let added = fresh
            .iter()
            .filter(|r| !self.results.contains(r))
            .cloned()
            .collect();
        self.results.retain(|r| !in_scope(r));
        self.results.extend(fresh);
        ValidationContextChanges { added, removed }
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.results).finish()
    }
}

/// Hooks around a model's validation run.
///
/// Every hook defaults to doing nothing. A model calls them in this order:
/// `before_validation`, `before_validate_fields`, `validate_fields`,
/// `after_validate_fields`, `before_validate_business_rules`,
/// `validate_business_rules`, `after_validate_business_rules`,
/// `after_validation`.
#[allow(unused_variables, reason = "default hooks ignore their arguments")]
pub trait Validator {
    /// Called before anything is validated.
    fn before_validation(&self, model: &ModelBase) {}

    /// Called before field validation.
    fn before_validate_fields(&self, model: &ModelBase) {}

    /// Adds field results.
    fn validate_fields(&self, model: &ModelBase, results: &mut Vec<FieldValidationResult>) {}

    /// Called with every field result of this run.
    fn after_validate_fields(&self, model: &ModelBase, results: &[FieldValidationResult]) {}

    /// Called before business rule validation.
    fn before_validate_business_rules(&self, model: &ModelBase) {}

    /// Adds business rule results.
    fn validate_business_rules(
        &self,
        model: &ModelBase,
        results: &mut Vec<BusinessRuleValidationResult>,
    ) {
    }

    /// Called with every business rule result of this run.
    fn after_validate_business_rules(
        &self,
        model: &ModelBase,
        results: &[BusinessRuleValidationResult],
    ) {
    }

    /// Called after both phases.
    fn after_validation(
        &self,
        model: &ModelBase,
        fields: &[FieldValidationResult],
        business_rules: &[BusinessRuleValidationResult],
    ) {
    }
}
