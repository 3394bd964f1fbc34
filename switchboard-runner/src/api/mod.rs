//! HTTP API.
//!
//! The dispatch protocol is served at `/` (POST with a JSON body, or GET with
//! a query string). Model administration lives under `/v1`.

pub mod dispatch;
pub mod health;
pub mod logging;
pub mod models;

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the `/v1` API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().merge(models::router())
}

/// Build the complete application with all routes and layers.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(dispatch::router())
        .nest("/v1", router())
        .route("/health", get(health::health))
        .layer(middleware::from_fn(logging::request_logger))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
