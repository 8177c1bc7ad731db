//! Enrollment rows
//!
//! Only `services::EnrollmentEngine` writes here.

use sqlx::SqlitePool;
use studio_common::db::Enrollment;
use studio_common::time::{now, to_storage};
use studio_common::uuid_utils::generate;
use studio_common::{Error, Result};
use uuid::Uuid;

/// Insert an enrollment only while the class has a free seat
///
/// The count and the insert are one statement, so SQLite evaluates the
/// capacity guard under the write lock. Returns `None` when nothing was
/// inserted (class full or missing); a client removed underneath the insert
/// is `NotFound`.
pub async fn insert_if_seat_free(
    pool: &SqlitePool,
    class_id: Uuid,
    client_id: Uuid,
) -> Result<Option<Enrollment>> {
    let enrollment = Enrollment {
        id: generate(),
        class_id,
        client_id,
        enrolled_at: now(),
    };
    let class_key = class_id.to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO enrollments (guid, class_id, client_id, enrolled_at)
        SELECT ?, ?, ?, ?
        WHERE (SELECT COUNT(*) FROM enrollments WHERE class_id = ?)
            < (SELECT capacity FROM classes WHERE guid = ?)
        "#,
    )
    .bind(enrollment.id.to_string())
    .bind(&class_key)
    .bind(client_id.to_string())
    .bind(to_storage(&enrollment.enrolled_at))
    .bind(&class_key)
    .bind(&class_key)
    .execute(pool)
    .await
    .map_err(|e| Error::from_reference(e, "Client", client_id))?;

    Ok((result.rows_affected() == 1).then_some(enrollment))
}

/// Enrollments in insertion order, optionally for one class
pub async fn list_enrollments(pool: &SqlitePool, class_id: Option<Uuid>) -> Result<Vec<Enrollment>> {
    let rows = match class_id {
        Some(class_id) => {
            sqlx::query("SELECT * FROM enrollments WHERE class_id = ? ORDER BY rowid")
                .bind(class_id.to_string())
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT * FROM enrollments ORDER BY rowid")
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(Enrollment::from_row).collect()
}

pub async fn get_enrollment(pool: &SqlitePool, id: Uuid) -> Result<Option<Enrollment>> {
    let row = sqlx::query("SELECT * FROM enrollments WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Enrollment::from_row).transpose()
}

/// Delete an enrollment; its attendances go with it
pub async fn delete_enrollment(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM enrollments WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_for_class(pool: &SqlitePool, class_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE class_id = ?")
        .bind(class_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(count)
}
