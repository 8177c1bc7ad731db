//! Enrollment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use studio_common::db::Enrollment;
use uuid::Uuid;

use super::{parse_id, parse_optional_id};
use crate::error::{ApiJson, ApiQuery, ApiResult};
use crate::AppState;

/// POST /api/enrollments request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub class_id: Uuid,
    pub client_id: Uuid,
}

/// GET /api/enrollments query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentQuery {
    pub class_id: Option<String>,
}

/// POST /api/enrollments
///
/// 409 with code `CAPACITY_EXCEEDED` when the class is full.
pub async fn enroll(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EnrollRequest>,
) -> ApiResult<(StatusCode, Json<Enrollment>)> {
    let enrollment = state.enrollments.enroll(req.class_id, req.client_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// GET /api/enrollments?classId=
pub async fn list_enrollments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EnrollmentQuery>,
) -> ApiResult<Json<Vec<Enrollment>>> {
    let class_id = parse_optional_id("classId", query.class_id.as_deref())?;
    Ok(Json(state.enrollments.list(class_id).await?))
}

/// GET /api/enrollments/:id
pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Enrollment>> {
    let id = parse_id("id", &id)?;
    Ok(Json(state.enrollments.get(id).await?))
}

/// DELETE /api/enrollments/:id
pub async fn unenroll(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("id", &id)?;
    state.enrollments.unenroll(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/enrollments", get(list_enrollments).post(enroll))
        .route("/api/enrollments/:id", delete(unenroll).get(get_enrollment))
}
