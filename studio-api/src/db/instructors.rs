//! Instructor store and the instructor ↔ modality capability links

use std::collections::BTreeMap;

use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use studio_common::db::{Instructor, InstructorModality, Modality};
use studio_common::time::{now, to_storage};
use studio_common::uuid_utils::{generate, parse_column};
use studio_common::{Error, Result};
use uuid::Uuid;

use super::{modalities, required_text, valid_email};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstructor {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl InstructorPatch {
    fn apply(self, mut current: Instructor) -> Result<Instructor> {
        if let Some(name) = self.name {
            current.name = required_text("name", &name)?;
        }
        if let Some(email) = self.email {
            current.email = valid_email(&email)?;
        }
        Ok(current)
    }
}

pub async fn create_instructor(pool: &SqlitePool, input: NewInstructor) -> Result<Instructor> {
    let instructor = Instructor {
        id: generate(),
        name: required_text("name", &input.name)?,
        email: valid_email(&input.email)?,
        created_at: now(),
    };

    sqlx::query("INSERT INTO instructors (guid, name, email, created_at) VALUES (?, ?, ?, ?)")
        .bind(instructor.id.to_string())
        .bind(&instructor.name)
        .bind(&instructor.email)
        .bind(to_storage(&instructor.created_at))
        .execute(pool)
        .await
        .map_err(|e| Error::from_write(e, "instructor email"))?;

    tracing::info!(instructor_id = %instructor.id, "Instructor created");
    Ok(instructor)
}

pub async fn list_instructors(pool: &SqlitePool) -> Result<Vec<Instructor>> {
    let rows = sqlx::query("SELECT * FROM instructors ORDER BY name, rowid")
        .fetch_all(pool)
        .await?;

    rows.iter().map(Instructor::from_row).collect()
}

pub async fn get_instructor(pool: &SqlitePool, id: Uuid) -> Result<Option<Instructor>> {
    let row = sqlx::query("SELECT * FROM instructors WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Instructor::from_row).transpose()
}

pub async fn update_instructor(
    pool: &SqlitePool,
    id: Uuid,
    patch: InstructorPatch,
) -> Result<Option<Instructor>> {
    let Some(current) = get_instructor(pool, id).await? else {
        return Ok(None);
    };
    let updated = patch.apply(current)?;

    sqlx::query("UPDATE instructors SET name = ?, email = ? WHERE guid = ?")
        .bind(&updated.name)
        .bind(&updated.email)
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| Error::from_write(e, "instructor email"))?;

    Ok(Some(updated))
}

/// Delete an instructor; classes taught and modality links go with it
pub async fn delete_instructor(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM instructors WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(instructor_id = %id, "Instructor deleted");
    }
    Ok(result.rows_affected() > 0)
}

/// Modalities an instructor can teach, by name
pub async fn modalities_for_instructor(pool: &SqlitePool, instructor_id: Uuid) -> Result<Vec<Modality>> {
    let rows = sqlx::query(
        r#"
        SELECT m.*
        FROM instructor_modalities im
        JOIN modalities m ON m.guid = im.modality_id
        WHERE im.instructor_id = ?
        ORDER BY m.name
        "#,
    )
    .bind(instructor_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(Modality::from_row).collect()
}

/// Instructor id → modalities, for every instructor with at least one link
pub async fn instructor_modality_map(pool: &SqlitePool) -> Result<BTreeMap<Uuid, Vec<Modality>>> {
    let rows = sqlx::query(
        r#"
        SELECT im.instructor_id, m.*
        FROM instructor_modalities im
        JOIN modalities m ON m.guid = im.modality_id
        ORDER BY m.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut map: BTreeMap<Uuid, Vec<Modality>> = BTreeMap::new();
    for row in &rows {
        let instructor_id: String = row.try_get("instructor_id")?;
        map.entry(parse_column(&instructor_id)?)
            .or_default()
            .push(Modality::from_row(row)?);
    }
    Ok(map)
}

/// Link an instructor to a modality they can teach
pub async fn add_instructor_modality(
    pool: &SqlitePool,
    instructor_id: Uuid,
    modality_id: Uuid,
) -> Result<InstructorModality> {
    if get_instructor(pool, instructor_id).await?.is_none() {
        return Err(Error::not_found("Instructor", instructor_id));
    }
    if modalities::get_modality(pool, modality_id).await?.is_none() {
        return Err(Error::not_found("Modality", modality_id));
    }

    let link = InstructorModality {
        id: generate(),
        instructor_id,
        modality_id,
    };

    sqlx::query("INSERT INTO instructor_modalities (guid, instructor_id, modality_id) VALUES (?, ?, ?)")
        .bind(link.id.to_string())
        .bind(instructor_id.to_string())
        .bind(modality_id.to_string())
        .execute(pool)
        .await
        .map_err(|e| Error::from_write(e, "instructor modality link"))?;

    Ok(link)
}

pub async fn remove_instructor_modality(
    pool: &SqlitePool,
    instructor_id: Uuid,
    modality_id: Uuid,
) -> Result<bool> {
    let result =
        sqlx::query("DELETE FROM instructor_modalities WHERE instructor_id = ? AND modality_id = ?")
            .bind(instructor_id.to_string())
            .bind(modality_id.to_string())
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
