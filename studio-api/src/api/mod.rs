//! HTTP API handlers for studio-api

pub mod attendances;
pub mod catalog;
pub mod classes;
pub mod clients;
pub mod dashboard;
pub mod enrollments;
pub mod health;

pub use attendances::attendance_routes;
pub use catalog::catalog_routes;
pub use classes::class_routes;
pub use clients::client_routes;
pub use dashboard::dashboard_routes;
pub use enrollments::enrollment_routes;
pub use health::health_routes;

use studio_common::uuid_utils::parse_input;
use uuid::Uuid;

use crate::error::ApiResult;

/// Parse a path or query id; malformed ids are a 400, not a 404
pub(crate) fn parse_id(field: &str, raw: &str) -> ApiResult<Uuid> {
    Ok(parse_input(field, raw)?)
}

/// Parse an optional query id
pub(crate) fn parse_optional_id(field: &str, raw: Option<&str>) -> ApiResult<Option<Uuid>> {
    raw.filter(|value| !value.is_empty())
        .map(|value| parse_id(field, value))
        .transpose()
}
