//! Class schedule endpoints, backed by the Class Registry

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use studio_common::db::Class;

use super::parse_id;
use crate::db::classes::{ClassOccupancy, ClassPatch, NewClass};
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

/// GET /api/classes
///
/// Weekly order, each class with its modality name and enrolled count.
pub async fn list_classes(State(state): State<AppState>) -> ApiResult<Json<Vec<ClassOccupancy>>> {
    Ok(Json(state.classes.list_with_occupancy().await?))
}

/// GET /api/classes/:id
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Class>> {
    let id = parse_id("id", &id)?;
    Ok(Json(state.classes.get(id).await?))
}

/// POST /api/classes
pub async fn create_class(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewClass>,
) -> ApiResult<(StatusCode, Json<Class>)> {
    let class = state.classes.create(input).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// PUT /api/classes/:id
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ClassPatch>,
) -> ApiResult<Json<Class>> {
    let id = parse_id("id", &id)?;
    Ok(Json(state.classes.update(id, patch).await?))
}

/// DELETE /api/classes/:id
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("id", &id)?;
    state.classes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/api/classes", get(list_classes).post(create_class))
        .route(
            "/api/classes/:id",
            get(get_class).put(update_class).delete(delete_class),
        )
}
