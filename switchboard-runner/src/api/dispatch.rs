//! Dispatch endpoint.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use switchboard_common::DispatchResponse;

use crate::state::AppState;

/// Build the dispatch router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(dispatch_query).post(dispatch_body))
}

/// POST / - Dispatch a JSON request body.
///
/// Always answers 200; failures are reported in the body's `error` field.
async fn dispatch_body(State(state): State<Arc<AppState>>, body: Bytes) -> Json<DispatchResponse> {
    Json(state.dispatcher.dispatch_json(&body).await)
}

/// GET / - Dispatch a request encoded in the query string.
async fn dispatch_query(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<DispatchResponse> {
    Json(state.dispatcher.dispatch_query(pairs).await)
}
