//! Input normalization shared by the record types.

use crate::error::{DomainError, DomainResult};

/// Trim a required text field, rejecting blank values.
pub fn required_text(field: &str, value: impl Into<String>) -> DomainResult<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank collapses to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("title", "  Vase "), Ok("Vase".to_string()));
        assert_eq!(
            required_text("title", " \t"),
            Err(DomainError::Validation("title is required".to_string()))
        );
    }

    #[test]
    fn optional_text_collapses_blank() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" clay ".to_string())), Some("clay".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
