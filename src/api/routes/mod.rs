//! API routes module - organizes all route handlers.
//!
//! Diagram CRUD lives under `/api/v1/diagrams`; `/health` sits outside the
//! versioned prefix and outside authentication.

pub mod app_state;
pub mod auth_context;
pub mod diagrams;
pub mod error;
pub mod openapi;

use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::middleware::{create_cors_layer, rate_limit_middleware};
use crate::storage::StorageError;

pub use app_state::AppState;
pub use auth_context::AuthContext;
pub use error::ApiError;

/// Create the versioned API router with state and rate limiting applied.
pub fn create_api_router(app_state: AppState) -> Router {
    let limiter = app_state.rate_limiter.clone();
    Router::new()
        .merge(diagrams::diagrams_router())
        .merge(openapi::openapi_router())
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
        .with_state(app_state)
}

/// Full application: health check plus the API nested under `/api/v1`,
/// wrapped in request tracing and CORS.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_api_router(app_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer()),
        )
}

/// Create the application state, initializing storage from configuration.
pub async fn create_app_state(config: ServerConfig) -> Result<AppState, StorageError> {
    AppState::from_config(config).await
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
