//! Single-field rules
//!
//! A rule inspects one field of a [`ValidationContext`] and yields at most
//! one failure. [`FieldRule`] runs a synchronous validator, [`LookupRule`]
//! consults the user datastore.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::context::ValidationContext;
use super::validators::Validator;
use crate::core::error::{FieldValidationError, GuardResult, LookupError};
use crate::core::field;
use crate::core::service::UserLookup;

static NULL: Value = Value::Null;

/// Whether a rule runs when its field is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Runs against `null` when the field is absent
    Required,
    /// Skipped when the field is absent
    Optional,
}

/// One validation step over one field
#[async_trait]
pub trait Rule: Send + Sync {
    /// Name of the field this rule inspects
    fn field(&self) -> &str;

    /// Evaluate the rule
    ///
    /// `Ok(Some(_))` is a validation failure to be batched; `Err(_)` is a
    /// fault that stops the chain.
    async fn evaluate(&self, ctx: &ValidationContext) -> GuardResult<Option<FieldValidationError>>;
}

// =============================================================================
// FieldRule
// =============================================================================

/// A synchronous predicate over one field
#[derive(Clone)]
pub struct FieldRule {
    field: String,
    message: Option<String>,
    presence: Presence,
    validator: Validator,
}

impl FieldRule {
    pub fn new(
        field: impl Into<String>,
        validator: impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            field: field.into(),
            message: None,
            presence: Presence::Required,
            validator: Arc::new(validator),
        }
    }

    /// Report this message instead of the validator's own
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("field", &self.field)
            .field("message", &self.message)
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Rule for FieldRule {
    fn field(&self) -> &str {
        &self.field
    }

    async fn evaluate(&self, ctx: &ValidationContext) -> GuardResult<Option<FieldValidationError>> {
        let (value, location) = match ctx.get(&self.field) {
            Some(entry) => (&entry.value, Some(entry.location)),
            None if self.presence == Presence::Optional => {
                tracing::debug!(field = %self.field, "optional field absent, rule skipped");
                return Ok(None);
            }
            None => (&NULL, None),
        };

        Ok((self.validator)(&self.field, value).err().map(|reason| {
            let message = self.message.clone().unwrap_or(reason);
            FieldValidationError::new(self.field.clone(), message).at(location)
        }))
    }
}

// =============================================================================
// LookupRule
// =============================================================================

/// Which lookup a [`LookupRule`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupBy {
    Email,
    Id,
}

/// The lookup outcome a [`LookupRule`] requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Fails when a user is found
    Unused,
    /// Fails when no user is found
    Existing,
}

/// An asynchronous uniqueness or existence check
///
/// Performs exactly one lookup per evaluation, keyed by the rendered field
/// value. An absent field is looked up with the empty key unless
/// `lookup_absent` is turned off.
#[derive(Clone)]
pub struct LookupRule {
    field: String,
    message: String,
    presence: Presence,
    by: LookupBy,
    expect: Expectation,
    lookup_absent: bool,
    lookup: Arc<dyn UserLookup>,
}

impl LookupRule {
    pub fn new(
        field: impl Into<String>,
        by: LookupBy,
        expect: Expectation,
        message: impl Into<String>,
        lookup: Arc<dyn UserLookup>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            presence: Presence::Required,
            by,
            expect,
            lookup_absent: true,
            lookup,
        }
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn lookup_absent(mut self, enabled: bool) -> Self {
        self.lookup_absent = enabled;
        self
    }
}

impl std::fmt::Debug for LookupRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupRule")
            .field("field", &self.field)
            .field("by", &self.by)
            .field("expect", &self.expect)
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Rule for LookupRule {
    fn field(&self) -> &str {
        &self.field
    }

    async fn evaluate(&self, ctx: &ValidationContext) -> GuardResult<Option<FieldValidationError>> {
        let entry = ctx.get(&self.field);
        if entry.is_none() && (self.presence == Presence::Optional || !self.lookup_absent) {
            tracing::debug!(field = %self.field, "field absent, lookup skipped");
            return Ok(None);
        }

        let key = entry.map(|e| field::render(&e.value)).unwrap_or_default();
        let found = match self.by {
            LookupBy::Email => self.lookup.find_by_email(&key).await,
            LookupBy::Id => self.lookup.find_by_id(&key).await,
        }
        .map_err(|e| {
            tracing::warn!(field = %self.field, error = %e, "user lookup failed");
            LookupError::Failed {
                field: self.field.clone(),
            }
        })?
        .is_some();

        let violated = match self.expect {
            Expectation::Unused => found,
            Expectation::Existing => !found,
        };

        Ok(violated.then(|| {
            FieldValidationError::new(self.field.clone(), self.message.clone())
                .at(entry.map(|e| e.location))
        }))
    }
}
