//! Database row models
//!
//! Ids are stored as TEXT UUIDs and timestamps as RFC 3339 TEXT; the
//! `from_row` constructors convert both back into typed values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::time::from_storage;
use crate::uuid_utils::parse_column;
use crate::{Error, Result};

fn id_column(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let value: String = row.try_get(column)?;
    parse_column(&value)
}

fn ts_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let value: String = row.try_get(column)?;
    from_storage(&value)
}

/// Class type / discipline offered by the studio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modality {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Modality {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: id_column(row, "guid")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: ts_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Instructor {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: id_column(row, "guid")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: ts_column(row, "created_at")?,
        })
    }
}

/// "Instructor can teach modality" association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorModality {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub modality_id: Uuid,
}

impl InstructorModality {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: id_column(row, "guid")?,
            instructor_id: id_column(row, "instructor_id")?,
            modality_id: id_column(row, "modality_id")?,
        })
    }
}

/// Client membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
    Debtor,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
            ClientStatus::Debtor => "debtor",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(ClientStatus::Active),
            "inactive" => Ok(ClientStatus::Inactive),
            "debtor" => Ok(ClientStatus::Debtor),
            other => Err(Error::InvalidInput(format!("Unknown client status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ClientStatus,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: id_column(row, "guid")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            status: status
                .parse()
                .map_err(|_| Error::Internal(format!("Corrupt client status '{}'", status)))?,
            start_date: ts_column(row, "start_date")?,
            created_at: ts_column(row, "created_at")?,
        })
    }
}

/// One recurring weekly slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Uuid,
    pub modality_id: Uuid,
    pub instructor_id: Uuid,
    /// 0 = Sunday … 6 = Saturday
    pub day_of_week: i64,
    /// Time of day, `HH:MM`
    pub time: String,
    pub capacity: i64,
    pub created_at: DateTime<Utc>,
}

impl Class {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: id_column(row, "guid")?,
            modality_id: id_column(row, "modality_id")?,
            instructor_id: id_column(row, "instructor_id")?,
            day_of_week: row.try_get("day_of_week")?,
            time: row.try_get("time")?,
            capacity: row.try_get("capacity")?,
            created_at: ts_column(row, "created_at")?,
        })
    }
}

/// Standing association of a client to a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub class_id: Uuid,
    pub client_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: id_column(row, "guid")?,
            class_id: id_column(row, "class_id")?,
            client_id: id_column(row, "client_id")?,
            enrolled_at: ts_column(row, "enrolled_at")?,
        })
    }
}

/// Presence of an enrolled client on one calendar occurrence
///
/// `present == checked_in_at.is_some()` for every stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub class_id: Uuid,
    pub client_id: Uuid,
    pub date: DateTime<Utc>,
    pub present: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Attendance {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let checked_in_at: Option<String> = row.try_get("checked_in_at")?;
        Ok(Self {
            id: id_column(row, "guid")?,
            enrollment_id: id_column(row, "enrollment_id")?,
            class_id: id_column(row, "class_id")?,
            client_id: id_column(row, "client_id")?,
            date: ts_column(row, "date")?,
            present: row.try_get("present")?,
            checked_in_at: checked_in_at.as_deref().map(from_storage).transpose()?,
        })
    }
}
