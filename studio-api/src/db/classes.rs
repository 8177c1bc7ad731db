//! Class store: weekly recurring slots
//!
//! Writes that must respect enrollment counts go through
//! `services::ClassRegistry`; this module only validates shape and talks
//! to the `classes` table.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use studio_common::db::Class;
use studio_common::time::{now, to_storage};
use studio_common::uuid_utils::generate;
use studio_common::{Error, Result};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub modality_id: Uuid,
    pub instructor_id: Uuid,
    pub day_of_week: i64,
    pub time: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatch {
    pub modality_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub day_of_week: Option<i64>,
    pub time: Option<String>,
    pub capacity: Option<i64>,
}

impl ClassPatch {
    /// Merge into `current`, validating every supplied field
    pub fn apply(self, mut current: Class) -> Result<Class> {
        if let Some(modality_id) = self.modality_id {
            current.modality_id = modality_id;
        }
        if let Some(instructor_id) = self.instructor_id {
            current.instructor_id = instructor_id;
        }
        if let Some(day) = self.day_of_week {
            current.day_of_week = validate_day_of_week(day)?;
        }
        if let Some(time) = self.time {
            current.time = validate_time(&time)?;
        }
        if let Some(capacity) = self.capacity {
            current.capacity = validate_capacity(capacity)?;
        }
        Ok(current)
    }
}

/// Class row joined with its modality name and live enrollment count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOccupancy {
    #[serde(flatten)]
    pub class: Class,
    pub modality_name: String,
    pub enrolled: i64,
}

pub fn validate_day_of_week(day: i64) -> Result<i64> {
    if !(0..=6).contains(&day) {
        return Err(Error::InvalidInput(format!(
            "dayOfWeek must be between 0 and 6, got {}",
            day
        )));
    }
    Ok(day)
}

/// `HH:MM`, 24-hour clock
pub fn validate_time(time: &str) -> Result<String> {
    let time = time.trim();
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| Error::InvalidInput(format!("time must be HH:MM, got '{}'", time)))?;
    Ok(parsed.format("%H:%M").to_string())
}

pub fn validate_capacity(capacity: i64) -> Result<i64> {
    if capacity < 1 {
        return Err(Error::InvalidInput(format!(
            "capacity must be a positive integer, got {}",
            capacity
        )));
    }
    Ok(capacity)
}

pub async fn insert_class(pool: &SqlitePool, input: &NewClass) -> Result<Class> {
    let class = Class {
        id: generate(),
        modality_id: input.modality_id,
        instructor_id: input.instructor_id,
        day_of_week: validate_day_of_week(input.day_of_week)?,
        time: validate_time(&input.time)?,
        capacity: validate_capacity(input.capacity)?,
        created_at: now(),
    };

    sqlx::query(
        r#"
        INSERT INTO classes (guid, modality_id, instructor_id, day_of_week, time, capacity, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(class.id.to_string())
    .bind(class.modality_id.to_string())
    .bind(class.instructor_id.to_string())
    .bind(class.day_of_week)
    .bind(&class.time)
    .bind(class.capacity)
    .bind(to_storage(&class.created_at))
    .execute(pool)
    .await?;

    Ok(class)
}

pub async fn get_class(pool: &SqlitePool, id: Uuid) -> Result<Option<Class>> {
    let row = sqlx::query("SELECT * FROM classes WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Class::from_row).transpose()
}

/// Write back every mutable column of `class`
pub async fn save_class(pool: &SqlitePool, class: &Class) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE classes
        SET modality_id = ?, instructor_id = ?, day_of_week = ?, time = ?, capacity = ?
        WHERE guid = ?
        "#,
    )
    .bind(class.modality_id.to_string())
    .bind(class.instructor_id.to_string())
    .bind(class.day_of_week)
    .bind(&class.time)
    .bind(class.capacity)
    .bind(class.id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a class; enrollments and their attendances go with it
pub async fn delete_class(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM classes WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Every class with modality name and enrollment count, in weekly order
/// (day, then time, then creation)
pub async fn list_class_occupancy(pool: &SqlitePool) -> Result<Vec<ClassOccupancy>> {
    let rows = sqlx::query(
        r#"
        SELECT c.*,
               m.name AS modality_name,
               (SELECT COUNT(*) FROM enrollments e WHERE e.class_id = c.guid) AS enrolled
        FROM classes c
        JOIN modalities m ON m.guid = c.modality_id
        ORDER BY c.day_of_week, c.time, c.rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(ClassOccupancy {
                class: Class::from_row(row)?,
                modality_name: row.try_get("modality_name")?,
                enrolled: row.try_get("enrolled")?,
            })
        })
        .collect()
}
