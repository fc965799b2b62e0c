//! Common validation utilities shared by request DTOs.

use validator::ValidationError;

/// Validates that a database identifier is a concrete positive integer.
pub fn validate_positive_id(id: i64) -> Result<(), ValidationError> {
    if id > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive_id");
        err.message = Some("Identifier must be a positive integer".into());
        Err(err)
    }
}

/// Validates a staff username: 3-50 chars of ASCII letters, digits, `.`, `_` or `-`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.len();
    let charset_ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if (3..=50).contains(&len) && charset_ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_format");
        err.message = Some(
            "Username must be 3-50 characters of letters, digits, '.', '_' or '-'".into(),
        );
        Err(err)
    }
}

/// Validates a counter number: counters are numbered from 1.
pub fn validate_counter_number(number: i32) -> Result<(), ValidationError> {
    if (1..=999).contains(&number) {
        Ok(())
    } else {
        let mut err = ValidationError::new("counter_number_range");
        err.message = Some("Counter number must be between 1 and 999".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_id() {
        assert!(validate_positive_id(1).is_ok());
        assert!(validate_positive_id(i64::MAX).is_ok());
        assert!(validate_positive_id(0).is_err());
        assert!(validate_positive_id(-5).is_err());
    }

    #[test]
    fn test_username() {
        assert!(validate_username("clerk1").is_ok());
        assert!(validate_username("anna.k_2-b").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_counter_number() {
        assert!(validate_counter_number(1).is_ok());
        assert!(validate_counter_number(999).is_ok());
        assert!(validate_counter_number(0).is_err());
        assert!(validate_counter_number(1000).is_err());
    }

    #[test]
    fn test_error_message_present() {
        let err = validate_positive_id(0).unwrap_err();
        assert_eq!(err.code, "positive_id");
        assert!(err.message.is_some());
    }
}
