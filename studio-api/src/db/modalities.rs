//! Modality store (catalog)

use serde::Deserialize;
use sqlx::SqlitePool;
use studio_common::db::Modality;
use studio_common::time::{now, to_storage};
use studio_common::uuid_utils::generate;
use studio_common::Result;
use uuid::Uuid;

use super::required_text;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModality {
    pub name: String,
    pub description: String,
}

/// Mutable modality fields; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ModalityPatch {
    fn apply(self, mut current: Modality) -> Result<Modality> {
        if let Some(name) = self.name {
            current.name = required_text("name", &name)?;
        }
        if let Some(description) = self.description {
            current.description = description.trim().to_string();
        }
        Ok(current)
    }
}

pub async fn create_modality(pool: &SqlitePool, input: NewModality) -> Result<Modality> {
    let modality = Modality {
        id: generate(),
        name: required_text("name", &input.name)?,
        description: input.description.trim().to_string(),
        created_at: now(),
    };

    sqlx::query("INSERT INTO modalities (guid, name, description, created_at) VALUES (?, ?, ?, ?)")
        .bind(modality.id.to_string())
        .bind(&modality.name)
        .bind(&modality.description)
        .bind(to_storage(&modality.created_at))
        .execute(pool)
        .await?;

    tracing::info!(modality_id = %modality.id, name = %modality.name, "Modality created");
    Ok(modality)
}

/// All modalities ordered by name
pub async fn list_modalities(pool: &SqlitePool) -> Result<Vec<Modality>> {
    let rows = sqlx::query("SELECT * FROM modalities ORDER BY name, rowid")
        .fetch_all(pool)
        .await?;

    rows.iter().map(Modality::from_row).collect()
}

pub async fn get_modality(pool: &SqlitePool, id: Uuid) -> Result<Option<Modality>> {
    let row = sqlx::query("SELECT * FROM modalities WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Modality::from_row).transpose()
}

pub async fn update_modality(
    pool: &SqlitePool,
    id: Uuid,
    patch: ModalityPatch,
) -> Result<Option<Modality>> {
    let Some(current) = get_modality(pool, id).await? else {
        return Ok(None);
    };
    let updated = patch.apply(current)?;

    sqlx::query("UPDATE modalities SET name = ?, description = ? WHERE guid = ?")
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(Some(updated))
}

/// Delete a modality; its classes and instructor links go with it
pub async fn delete_modality(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM modalities WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(modality_id = %id, "Modality deleted");
    }
    Ok(result.rows_affected() > 0)
}
