//! Payload validation helpers
//!
//! A `RequestValidation` trait plus `validate_*!` macros keep the rules for
//! out-of-band payloads in one place with consistent messages.

use crate::error::SearchResult;

/// Trait for validating inbound payloads
pub trait RequestValidation {
    /// Returns `Err(SearchError::Validation)` describing the first failed rule
    fn validate(&self) -> SearchResult<()>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.phone, is_phone(&self.phone), "Invalid phone number");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::SearchError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-blank strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating string length in characters, ignoring surrounding whitespace
///
/// # Usage
///
/// ```rust,ignore
/// validate_length!(self.name, 1, 200, "Name must be between 1 and 200 characters");
/// ```
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.trim().chars().count();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating phone numbers
#[macro_export]
macro_rules! validate_phone {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, $crate::validation::is_phone(&$field), $message);
    };
}

/// 5 to 20 digits, an optional leading `+`, and spaces, dashes or parentheses
/// as separators.
pub fn is_phone(value: &str) -> bool {
    let value = value.trim();
    let body = value.strip_prefix('+').unwrap_or(value);
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }
    (5..=20).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    struct TestPayload {
        name: String,
        phone: String,
    }

    impl RequestValidation for TestPayload {
        fn validate(&self) -> SearchResult<()> {
            validate_required!(self.name, "Name is required");
            validate_length!(self.name, 1, 10, "Name must be between 1 and 10 characters");
            validate_phone!(self.phone, "Invalid phone number");
            Ok(())
        }
    }

    #[test]
    fn test_validation_success() {
        let payload = TestPayload {
            name: "Ромашка".to_string(),
            phone: "+7 (900) 123-45-67".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let payload = TestPayload {
            name: "   ".to_string(),
            phone: "12345".to_string(),
        };
        match payload.validate() {
            Err(SearchError::Validation(message)) => assert_eq!(message, "Name is required"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Ten Cyrillic letters are twenty bytes.
        let payload = TestPayload {
            name: "абвгдежзик".to_string(),
            phone: "12345".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_phone_rules() {
        assert!(is_phone("12345"));
        assert!(is_phone("+7 900 123-45-67"));
        assert!(is_phone("8 (800) 555-35-35"));
        assert!(!is_phone("1234"));
        assert!(!is_phone("123456789012345678901"));
        assert!(!is_phone("+7 900 ABC"));
        assert!(!is_phone("7+900123"));
        assert!(!is_phone(""));
    }
}
