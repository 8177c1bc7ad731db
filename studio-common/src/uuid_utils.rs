//! UUID utilities

use crate::{Error, Result};
use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a UUID stored as TEXT in the database
pub fn parse_column(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| Error::Internal(format!("Corrupt id '{}' in database: {}", value, e)))
}

/// Parse a UUID supplied by a caller
pub fn parse_input(field: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|_| Error::InvalidInput(format!("{} is not a valid id", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_v4() {
        assert_eq!(generate().get_version_num(), 4);
    }

    #[test]
    fn test_parse_input_rejects_garbage() {
        let err = parse_input("classId", "not-a-uuid").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("classId")));
    }

    #[test]
    fn test_parse_column_roundtrip() {
        let id = generate();
        assert_eq!(parse_column(&id.to_string()).unwrap(), id);
    }
}
