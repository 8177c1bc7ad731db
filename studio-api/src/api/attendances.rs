//! Attendance / check-in endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use studio_common::db::Attendance;
use studio_common::time::parse_day;
use uuid::Uuid;

use super::{parse_id, parse_optional_id};
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::services::NewAttendance;
use crate::AppState;

/// GET /api/attendances query; every filter optional
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub class_id: Option<String>,
    pub client_id: Option<String>,
    pub date: Option<String>,
}

/// POST /api/attendances/bulk request
#[derive(Debug, Deserialize)]
pub struct BulkPresenceRequest {
    pub ids: Vec<Uuid>,
    pub present: bool,
}

/// POST /api/attendances
pub async fn record_attendance(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewAttendance>,
) -> ApiResult<(StatusCode, Json<Attendance>)> {
    let attendance = state.attendance.record(input).await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

/// GET /api/attendances?classId=&clientId=&date=
pub async fn query_attendances(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AttendanceQuery>,
) -> ApiResult<Json<Vec<Attendance>>> {
    let class_id = parse_optional_id("classId", query.class_id.as_deref())?;
    let client_id = parse_optional_id("clientId", query.client_id.as_deref())?;
    let day = query
        .date
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(parse_day)
        .transpose()?;

    Ok(Json(state.attendance.query(class_id, client_id, day).await?))
}

/// GET /api/attendances/:id
pub async fn get_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Attendance>> {
    let id = parse_id("id", &id)?;
    Ok(Json(state.attendance.get(id).await?))
}

/// PUT /api/attendances/:id `{"present": bool}`
///
/// Any body whose `present` is not a JSON boolean is a 400.
pub async fn set_presence(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Attendance>> {
    let id = parse_id("id", &id)?;
    let present = body
        .get("present")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::BadRequest("present must be a boolean".to_string()))?;

    Ok(Json(state.attendance.set_presence(id, present).await?))
}

/// POST /api/attendances/bulk
pub async fn set_presence_many(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BulkPresenceRequest>,
) -> ApiResult<Json<Vec<Attendance>>> {
    tracing::info!(count = req.ids.len(), present = req.present, "Bulk presence change");
    Ok(Json(state.attendance.set_presence_many(&req.ids, req.present).await?))
}

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/attendances", get(query_attendances).post(record_attendance))
        .route("/api/attendances/bulk", post(set_presence_many))
        .route("/api/attendances/:id", get(get_attendance).put(set_presence))
}
