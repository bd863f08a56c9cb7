//! ServerBuilder for wiring validation chains into an axum app

use super::middleware::enforce_user_validations;
use crate::config::ValidationConfig;
use crate::core::service::UserLookup;
use crate::core::validation::{UserValidations, ValidationState};
use anyhow::Result;
use axum::{Extension, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Builder for an HTTP app whose user routes are guarded by the chains
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_lookup(InMemoryUserStore::new())
///     .with_user_routes(
///         Router::new()
///             .route("/users", post(create_user))
///             .route("/users/{id}", put(update_user)),
///     )
///     .build()?;
/// ```
pub struct ServerBuilder {
    lookup: Option<Arc<dyn UserLookup>>,
    config: ValidationConfig,
    user_routes: Vec<Router>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            lookup: None,
            config: ValidationConfig::default(),
            user_routes: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the user lookup (required)
    pub fn with_lookup(mut self, lookup: impl UserLookup + 'static) -> Self {
        self.lookup = Some(Arc::new(lookup));
        self
    }

    /// Set an already shared user lookup
    pub fn with_shared_lookup(mut self, lookup: Arc<dyn UserLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Add routes guarded by the user chains
    ///
    /// POST requests run the create chain and PUT/PATCH requests the update
    /// chain before the handler is called.
    pub fn with_user_routes(mut self, routes: Router) -> Self {
        self.user_routes.push(routes);
        self
    }

    /// Add routes that bypass validation (health checks, listings, ...)
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build both chains from the lookup and configuration
    pub fn build_validations(&self) -> Result<UserValidations> {
        let lookup = self
            .lookup
            .clone()
            .ok_or_else(|| anyhow::anyhow!("UserLookup is required. Call .with_lookup()"))?;

        Ok(UserValidations::new(lookup, &self.config)?)
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let validations = Arc::new(self.build_validations()?);
        let state = ValidationState::new(validations, self.config.max_body_bytes);

        let guarded = std::mem::take(&mut self.user_routes)
            .into_iter()
            .fold(Router::new(), Router::merge)
            .layer(
                ServiceBuilder::new()
                    .layer(Extension(state.clone()))
                    .layer(axum::middleware::from_fn_with_state(
                        state,
                        enforce_user_validations,
                    )),
            );

        let app = self
            .custom_routes
            .into_iter()
            .fold(guarded, Router::merge)
            .layer(TraceLayer::new_for_http());

        Ok(app)
    }

    /// Serve the application with graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
