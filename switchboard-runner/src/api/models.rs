//! Model administration endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use switchboard_common::{FunctionSignature, ModelsResponse};

use crate::error::Result;
use crate::state::AppState;

/// Build the models router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/models", get(list_models))
        .route("/models/:model", axum::routing::delete(unregister_model))
        .route("/models/:model/functions/:function", get(function_signature))
}

/// GET /v1/models - List registered models.
async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(state.registry().list().await)
}

/// GET /v1/models/:model/functions/:function - Describe one function.
async fn function_signature(
    State(state): State<Arc<AppState>>,
    Path((model, function)): Path<(String, String)>,
) -> Result<Json<FunctionSignature>> {
    let signature = state.registry().function_signature(&model, &function).await?;
    Ok(Json(signature))
}

/// DELETE /v1/models/:model - Unregister a model. Unknown names are a no-op.
async fn unregister_model(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> StatusCode {
    state.registry().unregister(&model).await;
    StatusCode::NO_CONTENT
}
