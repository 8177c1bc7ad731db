//! Attendance rows
//!
//! Only `services::AttendanceTracker` writes here. Each row carries the UTC
//! calendar `day` of its `date`; `(enrollment_id, day)` is unique.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use studio_common::db::Attendance;
use studio_common::time::{format_day, to_storage};
use studio_common::uuid_utils::generate;
use studio_common::Result;
use uuid::Uuid;

/// Optional filters for `query_attendances`; `None` matches everything
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub class_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub day: Option<NaiveDate>,
}

/// Insert the row for (enrollment, day), or overwrite presence on the
/// existing one
pub async fn upsert_attendance(
    pool: &SqlitePool,
    enrollment_id: Uuid,
    class_id: Uuid,
    client_id: Uuid,
    date: DateTime<Utc>,
    checked_in_at: Option<DateTime<Utc>>,
) -> Result<Attendance> {
    let row = sqlx::query(
        r#"
        INSERT INTO attendances
            (guid, enrollment_id, class_id, client_id, date, day, present, checked_in_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(enrollment_id, day) DO UPDATE SET
            present = excluded.present,
            checked_in_at = excluded.checked_in_at
        RETURNING *
        "#,
    )
    .bind(generate().to_string())
    .bind(enrollment_id.to_string())
    .bind(class_id.to_string())
    .bind(client_id.to_string())
    .bind(to_storage(&date))
    .bind(format_day(date.date_naive()))
    .bind(checked_in_at.is_some())
    .bind(checked_in_at.as_ref().map(to_storage))
    .fetch_one(pool)
    .await?;

    Attendance::from_row(&row)
}

/// Set presence on an existing row; `None` when the id is unknown
pub async fn update_presence(
    pool: &SqlitePool,
    id: Uuid,
    checked_in_at: Option<DateTime<Utc>>,
) -> Result<Option<Attendance>> {
    let row = sqlx::query(
        "UPDATE attendances SET present = ?, checked_in_at = ? WHERE guid = ? RETURNING *",
    )
    .bind(checked_in_at.is_some())
    .bind(checked_in_at.as_ref().map(to_storage))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Attendance::from_row).transpose()
}

pub async fn get_attendance(pool: &SqlitePool, id: Uuid) -> Result<Option<Attendance>> {
    let row = sqlx::query("SELECT * FROM attendances WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Attendance::from_row).transpose()
}

/// Attendances matching every supplied filter, in insertion order
pub async fn query_attendances(pool: &SqlitePool, filter: &AttendanceFilter) -> Result<Vec<Attendance>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM attendances WHERE 1 = 1");

    if let Some(class_id) = filter.class_id {
        query.push(" AND class_id = ").push_bind(class_id.to_string());
    }
    if let Some(client_id) = filter.client_id {
        query.push(" AND client_id = ").push_bind(client_id.to_string());
    }
    if let Some(day) = filter.day {
        query.push(" AND day = ").push_bind(format_day(day));
    }
    query.push(" ORDER BY rowid");

    let rows = query.build().fetch_all(pool).await?;
    rows.iter().map(Attendance::from_row).collect()
}
