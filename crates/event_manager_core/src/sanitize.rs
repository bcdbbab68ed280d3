//! Text sanitizers applied to operator and visitor input before persistence.
//!
//! # Invariants
//! - Sanitized text never contains markup tags, line breaks or tabs.
//! - Sanitized text has no leading/trailing whitespace and no runs of spaces.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    )
    .expect("valid email regex")
});

const MAX_EMAIL_LEN: usize = 254;

/// Strips markup, flattens line breaks and collapses whitespace.
pub fn sanitize_text(value: &str) -> String {
    let without_tags = TAG_RE.replace_all(value, "");
    WHITESPACE_RE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

/// Sanitizes text and maps an empty result to `None`.
pub fn sanitize_optional_text(value: &str) -> Option<String> {
    let sanitized = sanitize_text(value);
    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Returns the trimmed address when it matches basic email syntax.
pub fn sanitize_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Returns whether the value is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    sanitize_email(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, sanitize_email, sanitize_optional_text, sanitize_text};

    #[test]
    fn sanitize_text_strips_tags_and_collapses_whitespace() {
        assert_eq!(
            sanitize_text("  <b>Town</b>\n\tHall  <script>x</script> "),
            "Town Hall x"
        );
    }

    #[test]
    fn sanitize_optional_text_maps_blank_to_none() {
        assert_eq!(sanitize_optional_text(" \n "), None);
        assert_eq!(sanitize_optional_text("<i></i>"), None);
        assert_eq!(sanitize_optional_text(" Hyderabad "), Some("Hyderabad".to_string()));
    }

    #[test]
    fn email_syntax_accepts_common_addresses() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("first.last+rsvp@sub.example.org"));
        assert_eq!(
            sanitize_email("  asha@example.com "),
            Some("asha@example.com".to_string())
        );
    }

    #[test]
    fn email_syntax_rejects_malformed_addresses() {
        for value in ["", "asha", "asha@", "@example.com", "asha@example", "a b@example.com", "asha@@example.com"] {
            assert!(!is_valid_email(value), "{value} should be rejected");
        }
    }
}
