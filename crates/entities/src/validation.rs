//! Input validation for create and patch payloads.

use thiserror::Error;

use crate::Patch;

/// Maximum number of characters in a task summary.
pub const MAX_SUMMARY_LENGTH: usize = 255;

/// Errors raised when a payload fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A non-nullable field was sent as `null`.
    #[error("{field} may not be null")]
    NullField { field: &'static str },

    /// A string field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Result type for validation.
pub type ValidationResult = Result<(), ValidationError>;

/// Payloads that can be checked before any store access.
pub trait Validate {
    /// Checks the payload, returning the first violation found.
    fn validate(&self) -> ValidationResult;
}

/// Rejects `null` on a field that cannot hold it.
pub(crate) fn non_null<T>(field: &'static str, patch: &Patch<T>) -> ValidationResult {
    if patch.is_null() {
        return Err(ValidationError::NullField { field });
    }
    Ok(())
}

/// Rejects strings longer than `max` characters.
pub(crate) fn max_chars(field: &'static str, value: &str, max: usize) -> ValidationResult {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_chars_counts_characters_not_bytes() {
        let value = "é".repeat(MAX_SUMMARY_LENGTH);
        assert!(max_chars("summary", &value, MAX_SUMMARY_LENGTH).is_ok());

        let value = "a".repeat(MAX_SUMMARY_LENGTH + 1);
        assert_eq!(
            max_chars("summary", &value, MAX_SUMMARY_LENGTH),
            Err(ValidationError::TooLong {
                field: "summary",
                max: MAX_SUMMARY_LENGTH
            })
        );
    }

    #[test]
    fn test_non_null() {
        assert!(non_null::<String>("name", &Patch::Missing).is_ok());
        assert!(non_null("name", &Patch::Value("x")).is_ok());
        assert_eq!(
            non_null::<String>("name", &Patch::Null).unwrap_err().to_string(),
            "name may not be null"
        );
    }
}
