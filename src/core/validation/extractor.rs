//! Axum extractor for validated user payloads
//!
//! [`ValidatedUser`] reads the JSON body, path parameters and query string
//! into a [`ValidationContext`], runs the chain matching the request method
//! and hands the body to the handler only when every rule passed.

use axum::body::{Body, Bytes};
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::chain::UserValidations;
use super::context::ValidationContext;
use crate::core::error::{GuardError, GuardResult, RequestError};

/// Validation chains plus the request limits used to read bodies
///
/// Installed as a request extension by the server builder so both the
/// middleware and the extractor can reach it.
#[derive(Clone, Debug)]
pub struct ValidationState {
    pub validations: Arc<UserValidations>,
    pub max_body_bytes: usize,
}

impl ValidationState {
    pub fn new(validations: Arc<UserValidations>, max_body_bytes: usize) -> Self {
        Self {
            validations,
            max_body_bytes,
        }
    }
}

/// Marker left on requests that already passed their chain
#[derive(Clone, Copy, Debug)]
pub(crate) struct AlreadyValidated;

/// Read a request into a validation context
///
/// Returns the request head and the buffered body so the caller can rebuild
/// the request afterwards.
pub(crate) async fn read_context(
    req: Request,
    max_body_bytes: usize,
) -> GuardResult<(Parts, Bytes, ValidationContext)> {
    let (mut parts, body) = req.into_parts();

    // Requests that never went through the router carry no path params
    let params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await {
        Ok(Path(params)) => params,
        Err(PathRejection::MissingPathParams(_)) => HashMap::new(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "path parameters rejected");
            return Err(RequestError::InvalidPath {
                message: rejection.body_text(),
            }
            .into());
        }
    };
    let query = Query::<HashMap<String, String>>::from_request_parts(&mut parts, &())
        .await
        .map(|Query(query)| query)
        .unwrap_or_default();

    let bytes = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|_| RequestError::BodyTooLarge {
            limit: max_body_bytes,
        })?;

    let payload = parse_body(&bytes)?;
    let ctx = ValidationContext::from_body(payload)?
        .with_params(params)
        .with_query(query);

    Ok((parts, bytes, ctx))
}

fn parse_body(bytes: &Bytes) -> GuardResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Extractor yielding the JSON body of a request that passed validation
///
/// # Usage
///
/// ```rust,ignore
/// async fn create_user(ValidatedUser(payload): ValidatedUser) -> impl IntoResponse {
///     // payload already passed the create chain
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedUser(pub Value);

impl ValidatedUser {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl std::ops::Deref for ValidatedUser {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequest<S> for ValidatedUser
where
    S: Send + Sync,
{
    type Rejection = GuardError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let state = req
            .extensions()
            .get::<ValidationState>()
            .cloned()
            .ok_or(RequestError::MissingValidations)?;
        let already_validated = req.extensions().get::<AlreadyValidated>().is_some();
        let method = req.method().clone();

        let (_parts, bytes, ctx) = read_context(req, state.max_body_bytes).await?;

        if !already_validated
            && let Some(chain) = state.validations.for_method(&method)
        {
            chain.run(&ctx).await?;
        }

        Ok(ValidatedUser(parse_body(&bytes)?))
    }
}

/// Rebuild a request from the parts returned by [`read_context`]
pub(crate) fn rebuild(parts: Parts, bytes: Bytes) -> Request {
    Request::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    fn request(method: Method, uri: &str, body: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_context_body_and_query() {
        let req = request(Method::POST, "/users?role=USER_ROLE", r#"{"name":"A"}"#);
        let (_, bytes, ctx) = read_context(req, 1024).await.unwrap();

        assert_eq!(ctx.value("name"), Some(&json!("A")));
        assert_eq!(ctx.value("role"), Some(&json!("USER_ROLE")));
        assert_eq!(&bytes[..], br#"{"name":"A"}"#);
    }

    #[tokio::test]
    async fn test_read_context_empty_body() {
        let req = request(Method::PUT, "/users", "");
        let (_, _, ctx) = read_context(req, 1024).await.unwrap();
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn test_read_context_invalid_json() {
        let req = request(Method::POST, "/users", "{not json");
        let err = read_context(req, 1024).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
    }

    #[tokio::test]
    async fn test_read_context_body_too_large() {
        let req = request(Method::POST, "/users", r#"{"name":"a very long name"}"#);
        let err = read_context(req, 4).await.unwrap_err();
        assert_eq!(err.error_code(), "BODY_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_extractor_without_state_is_rejected() {
        let req = request(Method::POST, "/users", "{}");
        let err = ValidatedUser::from_request(req, &()).await.unwrap_err();
        assert!(matches!(
            err,
            GuardError::Request(RequestError::MissingValidations)
        ));
    }
}
