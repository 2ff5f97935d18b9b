//! Field-level input validation.
//!
//! Handlers accumulate problems into a [`FieldErrors`] map while walking the
//! submitted form, then fail the request with all messages at once. The map
//! serializes as `{ "field": ["message", ...] }`, which is the shape the
//! admin frontend expects for 422 responses.

use std::collections::BTreeMap;

use serde::Serialize;

/// Accumulated validation failures, keyed by form field name.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure message for `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flat "message, message, ..." join across all fields, in field order.
    pub fn summary(&self) -> String {
        self.0
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Require a non-empty (after trim) value, returning it on success.
pub fn required<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.push(field, format!("The {field} field is required."));
            None
        }
    }
}

/// Enforce a maximum character length.
pub fn max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(
            field,
            format!("The {field} may not be greater than {max} characters."),
        );
    }
}

/// `#RRGGBB` hex color.
pub fn hex_color(errors: &mut FieldErrors, field: &str, value: &str) {
    if !is_hex_color(value) {
        errors.push(field, format!("The {field} must be a hex color like #a3845b."));
    }
}

pub fn is_hex_color(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('#') else {
        return false;
    };
    rest.len() == 6 && rest.chars().all(|c| c.is_ascii_hexdigit())
}

/// Year fields are stored as text but capped at 4 characters.
pub fn year(errors: &mut FieldErrors, field: &str, value: &str) {
    max_len(errors, field, value, 4);
}

/// An absolute http(s) URL within a length cap.
pub fn http_url(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let trimmed = value.trim();
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        errors.push(field, format!("The {field} must start with http:// or https://."));
    }
    max_len(errors, field, value, max);
}

/// Minimal structural email check: `local@domain.tld`.
pub fn email(errors: &mut FieldErrors, field: &str, value: &str) {
    if !is_email(value) {
        errors.push(field, format!("The {field} must be a valid email address."));
    }
}

pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

/// Integer fields constrained to zero or above (sort orders, durations).
pub fn non_negative(errors: &mut FieldErrors, field: &str, value: i32) {
    if value < 0 {
        errors.push(field, format!("The {field} must be at least 0."));
    }
}

/// Project publication status.
pub fn status(errors: &mut FieldErrors, field: &str, value: &str) {
    if value != "active" && value != "inactive" {
        errors.push(field, format!("The {field} must be active or inactive."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_accepts_nonempty() {
        let mut errors = FieldErrors::new();
        assert_eq!(required(&mut errors, "name", Some("Villa")), Some("Villa"));
        assert!(errors.is_empty());
    }

    #[test]
    fn required_rejects_missing_and_blank() {
        let mut errors = FieldErrors::new();
        assert_eq!(required(&mut errors, "name", None), None);
        assert_eq!(required(&mut errors, "title", Some("   ")), None);
        assert!(!errors.is_empty());
        assert!(errors.summary().contains("name field is required"));
        assert!(errors.summary().contains("title field is required"));
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#a3845b"));
        assert!(is_hex_color("#FF00aa"));
        assert!(!is_hex_color("a3845b"));
        assert!(!is_hex_color("#a3845"));
        assert!(!is_hex_color("#a3845bb"));
        assert!(!is_hex_color("#a3845g"));
    }

    #[test]
    fn urls() {
        let mut errors = FieldErrors::new();
        http_url(&mut errors, "url", "https://example.com", 1000);
        http_url(&mut errors, "url", "http://example.com/a", 1000);
        assert!(errors.is_empty());

        http_url(&mut errors, "url", "ftp://example.com", 1000);
        assert!(!errors.is_empty());
    }

    #[test]
    fn emails() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.co"));
        assert!(!is_email("a@.co"));
    }

    #[test]
    fn max_len_counts_chars_not_bytes() {
        let mut errors = FieldErrors::new();
        max_len(&mut errors, "name", "Chambéry", 8);
        assert!(errors.is_empty());
    }

    #[test]
    fn status_values() {
        let mut errors = FieldErrors::new();
        status(&mut errors, "status", "active");
        status(&mut errors, "status", "inactive");
        assert!(errors.is_empty());
        status(&mut errors, "status", "archived");
        assert!(!errors.is_empty());
    }

    #[test]
    fn serializes_as_field_map() {
        let mut errors = FieldErrors::new();
        errors.push("name", "The name field is required.");
        errors.push("name", "The name may not be greater than 255 characters.");
        errors.push("color", "The color must be a hex color like #a3845b.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"].as_array().unwrap().len(), 2);
        assert!(json["color"][0].as_str().unwrap().contains("hex color"));
    }
}
