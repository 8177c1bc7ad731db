//! Dashboard statistics

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiQuery, ApiResult};
use crate::services::{DashboardStats, TopClass, DEFAULT_TOP_CLASSES};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TopClassesQuery {
    pub limit: Option<usize>,
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.occupancy.dashboard_stats().await?))
}

/// GET /api/dashboard/top-classes?limit=
pub async fn top_classes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TopClassesQuery>,
) -> ApiResult<Json<Vec<TopClass>>> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_CLASSES);
    Ok(Json(state.occupancy.top_classes(limit).await?))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/dashboard/top-classes", get(top_classes))
}
