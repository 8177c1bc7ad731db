//! studio-api library: enrollment, attendance and occupancy over HTTP
//!
//! Stores live in `db`, the enrollment core in `services`, and the axum
//! handlers in `api`. `AppState` owns the pool and the services built on it.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod services;

use services::{AttendanceTracker, ClassLocks, ClassRegistry, EnrollmentEngine, OccupancyReporter};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub classes: ClassRegistry,
    pub enrollments: EnrollmentEngine,
    pub attendance: AttendanceTracker,
    pub occupancy: OccupancyReporter,
}

impl AppState {
    /// Build every service over `db`
    ///
    /// The Class Registry and Enrollment Engine share one lock table.
    pub fn new(db: SqlitePool) -> Self {
        let locks = ClassLocks::new();
        Self {
            classes: ClassRegistry::new(db.clone(), locks.clone()),
            enrollments: EnrollmentEngine::new(db.clone(), locks),
            attendance: AttendanceTracker::new(db.clone()),
            occupancy: OccupancyReporter::new(db.clone()),
            db,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::catalog_routes())
        .merge(api::client_routes())
        .merge(api::class_routes())
        .merge(api::enrollment_routes())
        .merge(api::attendance_routes())
        .merge(api::dashboard_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
