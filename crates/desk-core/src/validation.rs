//! Length and presence checks for user-supplied text.

use crate::errors::ValidationError;

/// Validate a required text field: not blank, at most `max_chars` characters.
///
/// Length is counted in Unicode scalar values. The value itself is not
/// trimmed or altered.
///
/// # Errors
///
/// Returns `ValidationError` naming `field` when the value is empty,
/// whitespace-only, or too long.
pub fn validate_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    let len = value.chars().count();
    if len > max_chars {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max_chars} characters (got {len})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_text_at_the_limit() {
        assert!(validate_text("content", &"a".repeat(5000), 5000).is_ok());
    }

    #[test]
    fn rejects_text_over_the_limit() {
        let err = validate_text("content", &"a".repeat(6000), 5000).unwrap_err();
        assert_eq!(err.field, "content");
        assert!(err.message.contains("5000"));
        assert!(err.message.contains("6000"));
    }

    #[test]
    fn rejects_blank_text() {
        assert!(validate_text("content", "", 10).is_err());
        assert!(validate_text("content", " \n\t", 10).is_err());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(text.len(), 20);
        assert!(validate_text("content", &text, 10).is_ok());
    }
}
