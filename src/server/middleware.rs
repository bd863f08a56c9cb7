//! Middleware running the user chains in front of route handlers

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::core::error::GuardResult;
use crate::core::validation::extractor::{AlreadyValidated, ValidationState, read_context, rebuild};

/// Run the chain for the request method before the handler
///
/// POST runs the create chain, PUT and PATCH the update chain; other
/// methods pass straight through. The buffered body is handed on to the
/// handler unchanged.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/users", post(create_user))
///     .layer(axum::middleware::from_fn_with_state(state, enforce_user_validations));
/// ```
pub async fn enforce_user_validations(
    State(state): State<ValidationState>,
    req: Request,
    next: Next,
) -> GuardResult<Response> {
    let Some(chain) = state.validations.for_method(req.method()) else {
        return Ok(next.run(req).await);
    };

    let (mut parts, bytes, ctx) = read_context(req, state.max_body_bytes).await?;
    chain.run(&ctx).await?;

    tracing::debug!(chain = %chain.name(), path = %parts.uri.path(), "request passed validation");
    parts.extensions.insert(AlreadyValidated);
    Ok(next.run(rebuild(parts, bytes)).await)
}
