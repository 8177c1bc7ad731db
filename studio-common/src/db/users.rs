//! Opaque user store
//!
//! Accounts live in the `users` table. No HTTP endpoint uses them; the
//! store only creates accounts and looks them up.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::time::{from_storage, now, to_storage};
use crate::uuid_utils::{generate, parse_column};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    password_hash: String,
    password_salt: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    fn from_row(row: &SqliteRow) -> Result<Self> {
        let guid: String = row.try_get("guid")?;
        let created_at: String = row.try_get("created_at")?;
        Ok(Self {
            id: parse_column(&guid)?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            password_salt: row.try_get("password_salt")?,
            created_at: from_storage(&created_at)?,
        })
    }

    /// Check a candidate password against the stored salted hash
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(password, &self.password_salt) == self.password_hash
    }
}

/// SHA-256 of salt + password, as 64 hex characters
fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("username is required".to_string()));
    }
    if password.is_empty() {
        return Err(Error::InvalidInput("password is required".to_string()));
    }

    let salt = generate_salt();
    let user = User {
        id: generate(),
        username: username.to_string(),
        password_hash: hash_password(password, &salt),
        password_salt: salt,
        created_at: now(),
    };

    sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user.id.to_string())
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.password_salt)
    .bind(to_storage(&user.created_at))
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "user"))?;

    Ok(user)
}

pub async fn get_user(pool: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(User::from_row).transpose()
}

pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(User::from_row).transpose()
}
