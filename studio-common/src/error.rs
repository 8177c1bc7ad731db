//! Common error types for the studio service

use thiserror::Error;
use uuid::Uuid;

/// Common result type for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the stores and the enrollment core
#[derive(Error, Debug)]
pub enum Error {
    /// Storage failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected before any storage access
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Class is already at full capacity
    #[error("Class {class_id} is at full capacity ({capacity})")]
    CapacityExceeded { class_id: Uuid, capacity: i64 },

    /// Uniqueness rule violated (duplicate email, duplicate association)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a unique-constraint violation to `Conflict`, pass anything else through
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict(format!("{} already exists", what))
            }
            _ => Error::Database(err),
        }
    }

    /// Map a foreign-key violation to `NotFound` for the referenced row
    pub fn from_reference(err: sqlx::Error, entity: &str, id: impl std::fmt::Display) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => Error::not_found(entity, id),
            _ => Error::Database(err),
        }
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{} {}", entity, id))
    }
}
