//! Ordered rule chains for the create and update operations
//!
//! A [`RuleChain`] runs its rules one after the other against a single
//! [`ValidationContext`], batches every failure, and finishes with the
//! aggregation step: either the request may proceed or one 400 error lists
//! every problem at once.
//!
//! Chains are built once at startup and shared behind an `Arc`:
//!
//! ```rust,ignore
//! let validations = Arc::new(UserValidations::new(lookup, &config)?);
//! validations.post.run(&ctx).await?;
//! ```

use axum::http::Method;
use std::sync::Arc;

use super::context::ValidationContext;
use super::rule::{Expectation, FieldRule, LookupBy, LookupRule, Rule};
use super::validators::{date_format, email, not_empty, object_id, one_of};
use crate::config::ValidationConfig;
use crate::core::error::{ConfigError, FieldValidationError, GuardResult, ValidationError};
use crate::core::service::UserLookup;

/// Failure messages reported by the user chains
pub mod messages {
    pub const NAME_REQUIRED: &str = "Name required";
    pub const LAST_NAME_REQUIRED: &str = "Last Name required";
    pub const EMAIL_REQUIRED: &str = "Email required";
    pub const EMAIL_INVALID: &str = "Email is invalid";
    pub const EMAIL_TAKEN: &str = "Email already exist in DB";
    pub const PASSWORD_REQUIRED: &str = "Password required";
    pub const INVALID_ROLE: &str = "Invalid Role";
    pub const ID_NOT_FOUND: &str = "The id does not exist in DB";
}

/// An ordered, immutable list of rules
pub struct RuleChain {
    name: String,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleChain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Append a rule; rules run in the order they are added
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Field inspected by each rule, in evaluation order
    pub fn fields(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.field()).collect()
    }

    /// Run every rule and return the recorded failures
    ///
    /// Lookups are awaited one at a time. A lookup fault stops the chain and
    /// is returned as the error.
    pub async fn collect(&self, ctx: &ValidationContext) -> GuardResult<Vec<FieldValidationError>> {
        let mut failures = Vec::new();
        for rule in &self.rules {
            if let Some(failure) = rule.evaluate(ctx).await? {
                tracing::debug!(
                    chain = %self.name,
                    field = %failure.field,
                    message = %failure.message,
                    "validation rule failed"
                );
                failures.push(failure);
            }
        }
        Ok(failures)
    }

    /// Run the chain and aggregate its failures
    pub async fn run(&self, ctx: &ValidationContext) -> GuardResult<()> {
        let failures = self.collect(ctx).await?;
        if !failures.is_empty() {
            tracing::info!(
                chain = %self.name,
                failures = failures.len(),
                "request rejected by validation"
            );
        }
        ValidationError::aggregate(failures)
    }
}

impl std::fmt::Debug for RuleChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleChain")
            .field("name", &self.name)
            .field("fields", &self.fields())
            .finish()
    }
}

fn role_rule(config: &ValidationConfig) -> FieldRule {
    FieldRule::new("role", one_of(config.roles.clone()))
        .with_message(messages::INVALID_ROLE)
        .optional()
}

fn birthdate_rule(config: &ValidationConfig) -> Result<FieldRule, ConfigError> {
    Ok(FieldRule::new("birthdate", date_format(config.date_format()?)).optional())
}

fn email_unused(lookup: Arc<dyn UserLookup>) -> LookupRule {
    LookupRule::new(
        "email",
        LookupBy::Email,
        Expectation::Unused,
        messages::EMAIL_TAKEN,
        lookup,
    )
}

/// Rules guarding user creation
pub fn post_request_validations(
    lookup: Arc<dyn UserLookup>,
    config: &ValidationConfig,
) -> Result<RuleChain, ConfigError> {
    Ok(RuleChain::new("create_user")
        .rule(FieldRule::new("name", not_empty()).with_message(messages::NAME_REQUIRED))
        .rule(FieldRule::new("lastName", not_empty()).with_message(messages::LAST_NAME_REQUIRED))
        .rule(FieldRule::new("email", not_empty()).with_message(messages::EMAIL_REQUIRED))
        .rule(FieldRule::new("email", email()).with_message(messages::EMAIL_INVALID))
        .rule(email_unused(lookup).lookup_absent(config.lookup_absent_fields))
        .rule(FieldRule::new("password", not_empty()).with_message(messages::PASSWORD_REQUIRED))
        .rule(role_rule(config))
        .rule(birthdate_rule(config)?))
}

/// Rules guarding user updates
pub fn put_request_validations(
    lookup: Arc<dyn UserLookup>,
    config: &ValidationConfig,
) -> Result<RuleChain, ConfigError> {
    let id_exists = LookupRule::new(
        "id",
        LookupBy::Id,
        Expectation::Existing,
        messages::ID_NOT_FOUND,
        lookup.clone(),
    )
    .lookup_absent(config.lookup_absent_fields);

    Ok(RuleChain::new("update_user")
        .rule(FieldRule::new("id", not_empty()))
        .rule(FieldRule::new("id", object_id()))
        .rule(id_exists)
        .rule(
            FieldRule::new("email", email())
                .with_message(messages::EMAIL_INVALID)
                .optional(),
        )
        .rule(email_unused(lookup).optional())
        .rule(role_rule(config))
        .rule(birthdate_rule(config)?))
}

/// Both user chains, built once per process
#[derive(Debug)]
pub struct UserValidations {
    pub post: RuleChain,
    pub put: RuleChain,
}

impl UserValidations {
    pub fn new(lookup: Arc<dyn UserLookup>, config: &ValidationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            post: post_request_validations(lookup.clone(), config)?,
            put: put_request_validations(lookup, config)?,
        })
    }

    /// Chain guarding requests with this method
    ///
    /// POST creates, PUT and PATCH update; other methods are not guarded.
    pub fn for_method(&self, method: &Method) -> Option<&RuleChain> {
        match *method {
            Method::POST => Some(&self.post),
            Method::PUT | Method::PATCH => Some(&self.put),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::user::User;
    use async_trait::async_trait;

    struct EmptyLookup;

    #[async_trait]
    impl UserLookup for EmptyLookup {
        async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }
    }

    fn validations() -> UserValidations {
        UserValidations::new(Arc::new(EmptyLookup), &ValidationConfig::default()).unwrap()
    }

    #[test]
    fn test_post_chain_order() {
        let v = validations();
        assert_eq!(
            v.post.fields(),
            vec![
                "name",
                "lastName",
                "email",
                "email",
                "email",
                "password",
                "role",
                "birthdate"
            ]
        );
    }

    #[test]
    fn test_put_chain_order() {
        let v = validations();
        assert_eq!(
            v.put.fields(),
            vec!["id", "id", "id", "email", "email", "role", "birthdate"]
        );
    }

    #[test]
    fn test_for_method() {
        let v = validations();
        assert_eq!(v.for_method(&Method::POST).unwrap().name(), "create_user");
        assert_eq!(v.for_method(&Method::PUT).unwrap().name(), "update_user");
        assert_eq!(v.for_method(&Method::PATCH).unwrap().name(), "update_user");
        assert!(v.for_method(&Method::GET).is_none());
        assert!(v.for_method(&Method::DELETE).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ValidationConfig::default().with_roles(Vec::<String>::new());
        assert!(UserValidations::new(Arc::new(EmptyLookup), &config).is_err());
    }

    #[tokio::test]
    async fn test_empty_chain_passes() {
        let chain = RuleChain::new("noop");
        assert!(chain.is_empty());
        assert!(chain.run(&ValidationContext::new()).await.is_ok());
    }
}
