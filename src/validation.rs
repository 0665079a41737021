// ABOUTME: Declarative validation rules for request payloads
// ABOUTME: Field-level checks for emails, passwords, text lengths, and numeric ranges plus input scrubbing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Request payload validation rules.
//!
//! Services call these helpers before persisting anything. Each rule
//! returns `AppResult<()>` with an [`crate::errors::ErrorCode::InvalidInput`]
//! error naming the offending field, so handlers can surface the failure
//! directly as a 400 response.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{AppError, AppResult};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum accepted free-text length (titles, descriptions, notes)
pub const MAX_TEXT_LENGTH: usize = 2000;
/// Maximum accepted title length
pub const MAX_TITLE_LENGTH: usize = 200;
/// Longest plausible activity, in seconds (24 hours)
pub const MAX_ACTIVITY_DURATION_SECS: i64 = 24 * 60 * 60;
/// Longest plausible distance, in meters (1000 km)
pub const MAX_DISTANCE_METERS: f64 = 1_000_000.0;

// Pragmatic format check; deliverability is not our problem.
#[allow(clippy::unwrap_used)] // Safe: pattern is a compile-time constant
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Validate an email address format
///
/// # Errors
/// Returns an error if the email does not look like `local@domain.tld`.
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err(AppError::invalid_input("Invalid email format"));
    }
    Ok(())
}

/// Validate password strength: minimum length, at least one letter and one digit
///
/// # Errors
/// Returns an error describing the first failed requirement.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::invalid_input(
            "Password must contain at least one letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::invalid_input(
            "Password must contain at least one digit",
        ));
    }
    Ok(())
}

/// Validate a required, bounded text field
///
/// # Errors
/// Returns an error if the value is empty or longer than `max_len`.
pub fn validate_text(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::invalid_input(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

/// Validate an optional, bounded text field
///
/// # Errors
/// Returns an error if the value is present and longer than `max_len`.
pub fn validate_optional_text(field: &str, value: Option<&str>, max_len: usize) -> AppResult<()> {
    if let Some(v) = value {
        if v.len() > max_len {
            return Err(AppError::invalid_input(format!(
                "{field} must be at most {max_len} characters"
            )));
        }
    }
    Ok(())
}

/// Validate that an integer value falls within an inclusive range
///
/// # Errors
/// Returns an error naming the field and the allowed range.
pub fn validate_range_i64(field: &str, value: i64, min: i64, max: i64) -> AppResult<()> {
    if value < min || value > max {
        return Err(AppError::invalid_input(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

/// Validate that an optional float value is non-negative and below a ceiling
///
/// # Errors
/// Returns an error naming the field and the allowed range.
pub fn validate_optional_f64(field: &str, value: Option<f64>, max: f64) -> AppResult<()> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 || v > max {
            return Err(AppError::invalid_input(format!(
                "{field} must be between 0 and {max}"
            )));
        }
    }
    Ok(())
}

/// Validate an optional heart rate value (plausible human range)
///
/// # Errors
/// Returns an error if the value falls outside 20-250 bpm.
pub fn validate_optional_heart_rate(field: &str, value: Option<i32>) -> AppResult<()> {
    if let Some(v) = value {
        if !(20..=250).contains(&v) {
            return Err(AppError::invalid_input(format!(
                "{field} must be between 20 and 250 bpm"
            )));
        }
    }
    Ok(())
}

/// Scrub user-supplied free text before storage.
///
/// Trims surrounding whitespace, strips ASCII control characters, and
/// HTML-escapes the remainder so stored text is inert when echoed back
/// into web contexts.
#[must_use]
pub fn sanitize_text(input: &str) -> String {
    let stripped: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect();
    html_escape::encode_text(&stripped).into_owned()
}

/// Scrub an optional free-text field, mapping empty results to `None`
#[must_use]
pub fn sanitize_optional_text(input: Option<&str>) -> Option<String> {
    input.map(sanitize_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails_and_rejects_malformed_ones() {
        assert!(validate_email("runner@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
    }

    #[test]
    fn password_rules_require_length_letter_and_digit() {
        assert!(validate_password("abcd1234").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("abcdefgh").is_err());
    }

    #[test]
    fn text_rules_enforce_presence_and_bounds() {
        assert!(validate_text("title", "Morning run", MAX_TITLE_LENGTH).is_ok());
        assert!(validate_text("title", "   ", MAX_TITLE_LENGTH).is_err());
        assert!(validate_text("title", &"x".repeat(300), MAX_TITLE_LENGTH).is_err());
    }

    #[test]
    fn sanitize_strips_control_chars_and_escapes_html() {
        let dirty = "  <script>alert(1)</script>\u{7}  ";
        let clean = sanitize_text(dirty);
        assert!(!clean.contains('<'));
        assert!(!clean.contains('\u{7}'));
        assert!(clean.contains("&lt;script&gt;"));
    }

    #[test]
    fn sanitize_optional_maps_empty_to_none() {
        assert_eq!(sanitize_optional_text(Some("   ")), None);
        assert_eq!(sanitize_optional_text(None), None);
        assert_eq!(
            sanitize_optional_text(Some("easy spin")),
            Some("easy spin".to_owned())
        );
    }

    #[test]
    fn heart_rate_range_is_enforced() {
        assert!(validate_optional_heart_rate("average_heart_rate", Some(150)).is_ok());
        assert!(validate_optional_heart_rate("average_heart_rate", Some(10)).is_err());
        assert!(validate_optional_heart_rate("average_heart_rate", None).is_ok());
    }
}
