use crate::utils::error::CustomError;
use regex::Regex;
use std::sync::LazyLock;

pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 128;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

pub fn validate_password(password: &str) -> Result<(), CustomError> {
    let length = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
        return Err(CustomError::ValidationError(format!(
            "Password must be between {} and {} characters long.",
            PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CustomError> {
    if !EMAIL.is_match(email) {
        return Err(CustomError::ValidationError(
            "Please provide a valid email address.".into(),
        ));
    }
    Ok(())
}

/// Reject missing or whitespace-only values for a named field.
pub fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CustomError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CustomError::ValidationError(format!("{} is required", field))),
    }
}

/// Character-count bounds check, inclusive on both ends.
pub fn check_length(
    field: &str,
    value: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), CustomError> {
    let length = value.chars().count();
    if let Some(min) = min {
        if length < min {
            return Err(CustomError::ValidationError(format!(
                "{} must be at least {} characters",
                field, min
            )));
        }
    }
    if let Some(max) = max {
        if length > max {
            return Err(CustomError::ValidationError(format!(
                "{} cannot exceed {} characters",
                field, max
            )));
        }
    }
    Ok(())
}
