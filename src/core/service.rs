//! Lookup trait consumed by the asynchronous rules

use crate::core::user::User;
use anyhow::Result;
use async_trait::async_trait;

/// Read-only access to the user datastore
///
/// Implementations return `Ok(None)` when no user matches. An `Err` means
/// the datastore itself failed; rule chains treat that as fatal rather than
/// as a validation failure.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Find a user by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a user by id
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
}
