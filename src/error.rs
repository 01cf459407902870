//! Error types for dca_rs
//!
//! Validation errors are shown inline next to the field that caused them and
//! never stop a value from being stored. Load errors come from importing a
//! purchases file.

use crate::purchase::Field;
use thiserror::Error;

/// Validation errors for a single purchase field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must be a non-negative number")]
    NotNonNegative(Field),
}

/// Errors raised while reading a purchases file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Purchases file is not well-formatted JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        assert_eq!(
            ValidationError::NotNonNegative(Field::Units).to_string(),
            "Units must be a non-negative number"
        );
        assert_eq!(
            ValidationError::NotNonNegative(Field::Price).to_string(),
            "Price must be a non-negative number"
        );
    }
}
