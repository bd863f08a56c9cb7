//! Validation chains for user requests
//!
//! This module turns a request into a [`ValidationContext`], runs the
//! ordered rules for the matching operation and aggregates every failure
//! into a single error.

pub mod chain;
pub mod context;
pub mod extractor;
pub mod rule;
pub mod validators;

pub use chain::{RuleChain, UserValidations, post_request_validations, put_request_validations};
pub use context::{FieldEntry, FieldLocation, ValidationContext};
pub use extractor::{ValidatedUser, ValidationState};
pub use rule::{Expectation, FieldRule, LookupBy, LookupRule, Presence, Rule};
