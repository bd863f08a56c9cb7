//! Server module for wiring validation chains into HTTP apps
//!
//! This module provides:
//! - `enforce_user_validations`, the middleware running the chains
//! - `ServerBuilder`, which installs the middleware on user routes

pub mod builder;
pub mod middleware;

pub use builder::ServerBuilder;
pub use middleware::enforce_user_validations;
