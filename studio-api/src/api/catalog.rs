//! Modalities, instructors and the instructor/modality association
//!
//! Plain store pass-throughs; none of these writes touch enrollment state.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use studio_common::db::{Instructor, InstructorModality, Modality};
use uuid::Uuid;

use super::parse_id;
use crate::db::instructors::{self, InstructorPatch, NewInstructor};
use crate::db::modalities::{self, ModalityPatch, NewModality};
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::AppState;

/// Body of POST/DELETE /api/instructor-modalities
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorModalityRequest {
    pub instructor_id: Uuid,
    pub modality_id: Uuid,
}

/// GET /api/modalities
pub async fn list_modalities(State(state): State<AppState>) -> ApiResult<Json<Vec<Modality>>> {
    Ok(Json(modalities::list_modalities(&state.db).await?))
}

/// GET /api/modalities/:id
pub async fn get_modality(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Modality>> {
    let id = parse_id("id", &id)?;
    modalities::get_modality(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Modality {}", id)))
}

/// POST /api/modalities
pub async fn create_modality(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewModality>,
) -> ApiResult<(StatusCode, Json<Modality>)> {
    let modality = modalities::create_modality(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(modality)))
}

/// PUT /api/modalities/:id
pub async fn update_modality(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ModalityPatch>,
) -> ApiResult<Json<Modality>> {
    let id = parse_id("id", &id)?;
    modalities::update_modality(&state.db, id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Modality {}", id)))
}

/// DELETE /api/modalities/:id
pub async fn delete_modality(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("id", &id)?;
    if !modalities::delete_modality(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Modality {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/instructors
pub async fn list_instructors(State(state): State<AppState>) -> ApiResult<Json<Vec<Instructor>>> {
    Ok(Json(instructors::list_instructors(&state.db).await?))
}

/// GET /api/instructors/:id
pub async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Instructor>> {
    let id = parse_id("id", &id)?;
    instructors::get_instructor(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Instructor {}", id)))
}

/// POST /api/instructors
pub async fn create_instructor(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewInstructor>,
) -> ApiResult<(StatusCode, Json<Instructor>)> {
    let instructor = instructors::create_instructor(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(instructor)))
}

/// PUT /api/instructors/:id
pub async fn update_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<InstructorPatch>,
) -> ApiResult<Json<Instructor>> {
    let id = parse_id("id", &id)?;
    instructors::update_instructor(&state.db, id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Instructor {}", id)))
}

/// DELETE /api/instructors/:id
pub async fn delete_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("id", &id)?;
    if !instructors::delete_instructor(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Instructor {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/instructors/:id/modalities
pub async fn instructor_modalities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Modality>>> {
    let id = parse_id("id", &id)?;
    if instructors::get_instructor(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Instructor {}", id)));
    }
    Ok(Json(instructors::modalities_for_instructor(&state.db, id).await?))
}

/// GET /api/instructors-modalities-map
pub async fn instructor_modality_map(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<Uuid, Vec<Modality>>>> {
    Ok(Json(instructors::instructor_modality_map(&state.db).await?))
}

/// POST /api/instructor-modalities
pub async fn add_instructor_modality(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InstructorModalityRequest>,
) -> ApiResult<(StatusCode, Json<InstructorModality>)> {
    let link =
        instructors::add_instructor_modality(&state.db, req.instructor_id, req.modality_id).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/instructor-modalities
pub async fn remove_instructor_modality(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InstructorModalityRequest>,
) -> ApiResult<StatusCode> {
    if !instructors::remove_instructor_modality(&state.db, req.instructor_id, req.modality_id).await? {
        return Err(ApiError::NotFound(format!(
            "Instructor {} is not linked to modality {}",
            req.instructor_id, req.modality_id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/modalities", get(list_modalities).post(create_modality))
        .route(
            "/api/modalities/:id",
            get(get_modality).put(update_modality).delete(delete_modality),
        )
        .route("/api/instructors", get(list_instructors).post(create_instructor))
        .route(
            "/api/instructors/:id",
            get(get_instructor).put(update_instructor).delete(delete_instructor),
        )
        .route("/api/instructors/:id/modalities", get(instructor_modalities))
        .route("/api/instructors-modalities-map", get(instructor_modality_map))
        .route(
            "/api/instructor-modalities",
            post(add_instructor_modality).delete(remove_instructor_modality),
        )
}
