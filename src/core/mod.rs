//! Core types: errors, field formats, the lookup trait and validation chains

pub mod error;
pub mod field;
pub mod service;
pub mod user;
pub mod validation;

pub use error::{
    ConfigError, ErrorResponse, FieldValidationError, GuardError, GuardResult, LookupError,
    RequestError, ValidationError,
};
pub use field::{DateFormat, FieldFormat};
pub use service::UserLookup;
pub use user::User;
