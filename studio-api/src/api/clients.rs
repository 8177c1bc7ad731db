//! Client endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use studio_common::db::Client;

use super::parse_id;
use crate::db::clients::{self, ClientPatch, NewClient};
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::AppState;

/// GET /api/clients
pub async fn list_clients(State(state): State<AppState>) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(clients::list_clients(&state.db).await?))
}

/// GET /api/clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    let id = parse_id("id", &id)?;
    clients::get_client(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Client {}", id)))
}

/// POST /api/clients
pub async fn create_client(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewClient>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let client = clients::create_client(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /api/clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ClientPatch>,
) -> ApiResult<Json<Client>> {
    let id = parse_id("id", &id)?;
    clients::update_client(&state.db, id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Client {}", id)))
}

/// DELETE /api/clients/:id
///
/// Removes the client's enrollments and attendance history with it.
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("id", &id)?;
    if !clients::delete_client(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Client {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_clients).post(create_client))
        .route(
            "/api/clients/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}
