//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are applied here.

use crate::db::repository::RepoError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product name, category, sub-category
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions and notes
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: EAN codes, serial numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs (images, documents, video links)
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), RepoError> {
    if value.trim().is_empty() {
        return Err(RepoError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(RepoError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), RepoError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(RepoError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that a quantity is not negative.
pub fn validate_quantity(value: i64, field: &str) -> Result<(), RepoError> {
    if value < 0 {
        return Err(RepoError::Validation(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    Ok(())
}

/// Validate that a price is not negative.
pub fn validate_price(value: f64, field: &str) -> Result<(), RepoError> {
    if value < 0.0 {
        return Err(RepoError::Validation(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_oversized() {
        assert!(validate_required_text("PlayStation 5", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(MAX_NAME_LEN + 1), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn quantity_rejects_negative() {
        assert!(validate_quantity(0, "quantity").is_ok());
        assert!(validate_quantity(7, "quantity").is_ok());
        assert!(validate_quantity(-1, "quantity").is_err());
    }
}
