//! Client store

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use studio_common::db::{Client, ClientStatus};
use studio_common::time::{self, now, to_storage};
use studio_common::uuid_utils::generate;
use studio_common::{Error, Result};
use uuid::Uuid;

use super::{required_text, valid_email};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Defaults to `active`
    #[serde(default)]
    pub status: Option<ClientStatus>,
    #[serde(deserialize_with = "time::flexible::deserialize")]
    pub start_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<ClientStatus>,
    #[serde(default, deserialize_with = "time::flexible::option::deserialize")]
    pub start_date: Option<DateTime<Utc>>,
}

impl ClientPatch {
    fn apply(self, mut current: Client) -> Result<Client> {
        if let Some(name) = self.name {
            current.name = required_text("name", &name)?;
        }
        if let Some(email) = self.email {
            current.email = valid_email(&email)?;
        }
        if let Some(phone) = self.phone {
            current.phone = required_text("phone", &phone)?;
        }
        if let Some(status) = self.status {
            current.status = status;
        }
        if let Some(start_date) = self.start_date {
            current.start_date = start_date;
        }
        Ok(current)
    }
}

pub async fn create_client(pool: &SqlitePool, input: NewClient) -> Result<Client> {
    let client = Client {
        id: generate(),
        name: required_text("name", &input.name)?,
        email: valid_email(&input.email)?,
        phone: required_text("phone", &input.phone)?,
        status: input.status.unwrap_or_default(),
        start_date: input.start_date,
        created_at: now(),
    };

    sqlx::query(
        r#"
        INSERT INTO clients (guid, name, email, phone, status, start_date, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(client.id.to_string())
    .bind(&client.name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(client.status.as_str())
    .bind(to_storage(&client.start_date))
    .bind(to_storage(&client.created_at))
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "client email"))?;

    tracing::info!(client_id = %client.id, status = %client.status, "Client created");
    Ok(client)
}

pub async fn list_clients(pool: &SqlitePool) -> Result<Vec<Client>> {
    let rows = sqlx::query("SELECT * FROM clients ORDER BY name, rowid")
        .fetch_all(pool)
        .await?;

    rows.iter().map(Client::from_row).collect()
}

pub async fn get_client(pool: &SqlitePool, id: Uuid) -> Result<Option<Client>> {
    let row = sqlx::query("SELECT * FROM clients WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Client::from_row).transpose()
}

pub async fn update_client(pool: &SqlitePool, id: Uuid, patch: ClientPatch) -> Result<Option<Client>> {
    let Some(current) = get_client(pool, id).await? else {
        return Ok(None);
    };
    let updated = patch.apply(current)?;

    sqlx::query(
        r#"
        UPDATE clients
        SET name = ?, email = ?, phone = ?, status = ?, start_date = ?
        WHERE guid = ?
        "#,
    )
    .bind(&updated.name)
    .bind(&updated.email)
    .bind(&updated.phone)
    .bind(updated.status.as_str())
    .bind(to_storage(&updated.start_date))
    .bind(id.to_string())
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "client email"))?;

    Ok(Some(updated))
}

/// Delete a client; enrollments and attendances go with it
pub async fn delete_client(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM clients WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(client_id = %id, "Client deleted");
    }
    Ok(result.rows_affected() > 0)
}

/// (active, total) client counts
pub async fn count_clients(pool: &SqlitePool) -> Result<(i64, i64)> {
    let (active, total): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(status = 'active'), 0), COUNT(*) FROM clients",
    )
    .fetch_one(pool)
    .await?;

    Ok((active, total))
}
