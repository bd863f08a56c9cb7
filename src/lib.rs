//! # user-guard
//!
//! Declarative request validation for user-management REST APIs built on
//! axum.
//!
//! ## Features
//!
//! - **Ordered rule chains**: one chain for user creation, one for updates
//! - **Batched failures**: every field problem is reported in a single 400
//! - **Datastore checks**: email uniqueness and id existence through a
//!   pluggable [`UserLookup`](core::UserLookup)
//! - **Axum integration**: a middleware and a `ValidatedUser` extractor
//! - **Configuration-Based**: roles and date layout from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use user_guard::prelude::*;
//!
//! let store = InMemoryUserStore::new();
//!
//! let app = ServerBuilder::new()
//!     .with_lookup(store.clone())
//!     .with_user_routes(
//!         Router::new()
//!             .route("/users", post(create_user))
//!             .route("/users/{id}", put(update_user)),
//!     )
//!     .build()?;
//! ```
//!
//! Chains can also be run directly:
//!
//! ```rust,ignore
//! let validations = UserValidations::new(Arc::new(store), &ValidationConfig::default())?;
//! let ctx = ValidationContext::from_body(json!({ "name": "A" }))?;
//! validations.post.run(&ctx).await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{
            ConfigError, ErrorResponse, FieldValidationError, GuardError, GuardResult,
            LookupError, RequestError, ValidationError,
        },
        field::{DateFormat, FieldFormat},
        service::UserLookup,
        user::User,
    };

    // === Validation ===
    pub use crate::core::validation::{
        Expectation, FieldLocation, FieldRule, LookupBy, LookupRule, Presence, Rule, RuleChain,
        UserValidations, ValidatedUser, ValidationContext, ValidationState, chain::messages,
        post_request_validations, put_request_validations,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryUserStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoUserLookup;

    // === Config ===
    pub use crate::config::ValidationConfig;

    // === Server ===
    pub use crate::server::{ServerBuilder, enforce_user_validations};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        routing::{get, patch, post, put},
    };
}
