//! Small user API guarded by the validation chains
//!
//! ```sh
//! cargo run --example user_api
//! curl -X POST localhost:3000/users -H 'content-type: application/json' \
//!      -d '{"name":"","lastName":"B","email":"bad","password":""}'
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use user_guard::prelude::*;

fn text(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

async fn create_user(
    State(store): State<InMemoryUserStore>,
    ValidatedUser(body): ValidatedUser,
) -> Result<impl IntoResponse, GuardError> {
    let mut user = User::new(
        text(&body, "name").unwrap_or_default(),
        text(&body, "lastName").unwrap_or_default(),
        text(&body, "email").unwrap_or_default(),
    );
    user.role = text(&body, "role");
    user.birthdate = text(&body, "birthdate");

    let created = store.insert(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_user(
    State(store): State<InMemoryUserStore>,
    Path(id): Path<String>,
    ValidatedUser(body): ValidatedUser,
) -> Result<impl IntoResponse, GuardError> {
    let mut user = store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| GuardError::Internal(format!("user {} vanished", id)))?;

    if let Some(email) = text(&body, "email") {
        user.email = email;
    }
    if let Some(name) = text(&body, "name") {
        user.name = name;
    }
    if let Some(role) = text(&body, "role") {
        user.role = Some(role);
    }
    if let Some(birthdate) = text(&body, "birthdate") {
        user.birthdate = Some(birthdate);
    }

    Ok(Json(store.update(user).await?))
}

async fn list_users(State(store): State<InMemoryUserStore>) -> impl IntoResponse {
    Json(json!({ "users": store.list().await }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,user_guard=debug")),
        )
        .init();

    let store = InMemoryUserStore::new();
    store
        .insert(User::new("Ada", "Lovelace", "ada@example.com").with_role("ADMIN_ROLE"))
        .await?;

    let user_routes = Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{id}", put(update_user))
        .with_state(store.clone());

    let health = Router::new().route("/health", get(|| async { "ok" }));

    ServerBuilder::new()
        .with_lookup(store)
        .with_user_routes(user_routes)
        .with_custom_routes(health)
        .serve("127.0.0.1:3000")
        .await
}
