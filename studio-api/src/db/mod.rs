//! Store modules, one per entity
//!
//! Every function takes the injected `SqlitePool`; there is no global
//! store. Input types (`New*`) and patch types (`*Patch`) live beside the
//! functions that consume them and are validated before any storage access.

pub mod attendances;
pub mod classes;
pub mod clients;
pub mod enrollments;
pub mod instructors;
pub mod modalities;

use studio_common::{Error, Result};

/// Trimmed, non-empty text field
pub(crate) fn required_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Minimal shape check: `local@domain` with a dot in the domain
pub(crate) fn valid_email(value: &str) -> Result<String> {
    let value = required_text("email", value)?;
    let plausible = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !plausible || value.contains(char::is_whitespace) {
        return Err(Error::InvalidInput(format!("Invalid email: {}", value)));
    }
    Ok(value.to_lowercase())
}
