//! Reusable field validators
//!
//! Each validator receives the field name and the submitted value and
//! returns a descriptive message on failure. Rules may replace that message
//! with their own.

use serde_json::Value;

use crate::core::field::{self, DateFormat, FieldFormat};

/// Boxed form stored by [`FieldRule`](super::rule::FieldRule)
pub type Validator = std::sync::Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Validator: value must not be empty
pub fn not_empty() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if field::is_empty(value) {
            Err(format!("'{}' is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be a valid email address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if FieldFormat::Email.validate(value) {
            Ok(())
        } else {
            Err(format!("'{}' must be a valid email address", field))
        }
    }
}

/// Validator: value must be a datastore object id
pub fn object_id() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if FieldFormat::ObjectId.validate(value) {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be a 24 character hexadecimal id (value: {})",
                field,
                field::render(value)
            ))
        }
    }
}

/// Validator: value must be one of the allowed strings
///
/// Non-string values never match.
pub fn one_of(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
        _ => Err(format!(
            "'{}' must be one of: {:?} (value: {})",
            field,
            allowed,
            field::render(value)
        )),
    }
}

/// Validator: date must match the layout
pub fn date_format(
    format: DateFormat,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if value.as_str().is_some_and(|s| format.matches(s)) {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be a date in {} format (value: {})",
                field,
                format.layout(),
                field::render(value)
            ))
        }
    }
}
