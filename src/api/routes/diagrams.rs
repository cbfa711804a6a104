//! Diagram CRUD routes.
//!
//! All endpoints require a bearer token whose subject is the owner id.
//! Responses use the `{ success, data, message, count }` envelope.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use tracing::debug;
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{
    ApiEnvelope, CreateDiagramRequest, DeletedDiagram, Diagram, UpdateDiagramRequest,
};

type ApiResult<T> = Result<T, ApiError>;

/// Create the diagrams router
pub fn diagrams_router() -> Router<AppState> {
    Router::new()
        .route("/diagrams", get(list_diagrams).post(create_diagram))
        .route(
            "/diagrams/{id}",
            get(get_diagram).put(update_diagram).delete(delete_diagram),
        )
}

/// A malformed id cannot name one of the caller's diagrams.
fn parse_diagram_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        debug!("Rejecting malformed diagram id {:?}", raw);
        ApiError::not_found()
    })
}

/// GET /diagrams - List the caller's diagrams, most recently updated first
#[utoipa::path(
    get,
    path = "/diagrams",
    tag = "Diagrams",
    responses(
        (status = 200, description = "Diagrams owned by the caller", body = Object),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_diagrams(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiEnvelope<Vec<Diagram>>>> {
    let diagrams = state.diagrams.list(&auth.owner_id).await?;
    let count = diagrams.len();
    Ok(Json(ApiEnvelope::ok(diagrams).with_count(count)))
}

/// POST /diagrams - Create a diagram owned by the caller
#[utoipa::path(
    post,
    path = "/diagrams",
    tag = "Diagrams",
    request_body(content = Object, description = "Title and optional initial nodes and edges"),
    responses(
        (status = 201, description = "Diagram created successfully", body = Object),
        (status = 400, description = "Title is required, or the graph is invalid"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CreateDiagramRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Diagram>>)> {
    let Json(request) = payload?;
    let diagram = state.diagrams.create(&auth.owner_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(diagram).with_message("Diagram created successfully")),
    ))
}

/// GET /diagrams/{id} - Get one of the caller's diagrams
#[utoipa::path(
    get,
    path = "/diagrams/{id}",
    tag = "Diagrams",
    params(("id" = String, Path, description = "Diagram id")),
    responses(
        (status = 200, description = "The diagram", body = Object),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Diagram not found or you don't have access to it")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<Diagram>>> {
    let id = parse_diagram_id(&id)?;
    let diagram = state.diagrams.get(&auth.owner_id, id).await?;
    Ok(Json(ApiEnvelope::ok(diagram)))
}

/// PUT /diagrams/{id} - Overwrite the provided top-level fields
#[utoipa::path(
    put,
    path = "/diagrams/{id}",
    tag = "Diagrams",
    params(("id" = String, Path, description = "Diagram id")),
    request_body(content = Object, description = "Top-level fields to overwrite"),
    responses(
        (status = 200, description = "Diagram updated successfully", body = Object),
        (status = 400, description = "Invalid title or graph"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Diagram not found or you don't have access to it")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDiagramRequest>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<Diagram>>> {
    let id = parse_diagram_id(&id)?;
    let Json(request) = payload?;
    let diagram = state.diagrams.update(&auth.owner_id, id, request).await?;
    Ok(Json(
        ApiEnvelope::ok(diagram).with_message("Diagram updated successfully"),
    ))
}

/// DELETE /diagrams/{id} - Permanently delete one of the caller's diagrams
#[utoipa::path(
    delete,
    path = "/diagrams/{id}",
    tag = "Diagrams",
    params(("id" = String, Path, description = "Diagram id")),
    responses(
        (status = 200, description = "Diagram deleted successfully", body = Object),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Diagram not found or you don't have access to it")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<DeletedDiagram>>> {
    let id = parse_diagram_id(&id)?;
    state.diagrams.delete(&auth.owner_id, id).await?;
    Ok(Json(
        ApiEnvelope::ok(DeletedDiagram { id }).with_message("Diagram deleted successfully"),
    ))
}
