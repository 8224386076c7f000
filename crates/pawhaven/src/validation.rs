use std::fmt;

use serde::Serialize;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected field errors for one payload; surfaced to the caller as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Records an error for `field` when `condition` does not hold.
    pub fn check(&mut self, condition: bool, field: &str, message: &str) {
        if !condition {
            self.push(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "invalid input ({})", rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Accepts `+999999999` style numbers: optional `+`, optional leading `1`, then 9-15 digits.
pub fn is_valid_phone_number(raw: &str) -> bool {
    let rest = raw.strip_prefix('+').unwrap_or(raw);
    let candidates = [rest, rest.strip_prefix('1').unwrap_or(rest)];
    candidates.iter().any(|digits| {
        (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
    })
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers_follow_the_international_shape() {
        assert!(is_valid_phone_number("+15155550100"));
        assert!(is_valid_phone_number("515555010"));
        assert!(is_valid_phone_number("1515555010"));
        assert!(!is_valid_phone_number("555-0100"));
        assert!(!is_valid_phone_number("+12345"));
        assert!(!is_valid_phone_number("1234567890123456789"));
    }

    #[test]
    fn into_result_reports_every_field() {
        let mut errors = ValidationErrors::new();
        errors.check(false, "password", "too short");
        errors.check(true, "email", "unused");
        errors.push("username", "taken");

        let err = errors.into_result().expect_err("two errors recorded");
        assert_eq!(err.errors().len(), 2);
        assert!(err.has_field("password"));
        assert!(err.to_string().contains("username: taken"));
    }
}
