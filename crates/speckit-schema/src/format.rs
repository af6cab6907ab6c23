//! # String Formats
//!
//! The `format` values a string schema may declare. Checks are
//! deliberately permissive shape checks, not full RFC grammars.

use std::fmt;

use chrono::{DateTime, NaiveDate};

/// A recognised value for the `format` keyword of a string schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    /// `local-part@domain`, both sides non-empty.
    Email,
    /// RFC 3339 timestamp, e.g. `2023-01-15T10:30:00Z`.
    DateTime,
    /// Calendar date `YYYY-MM-DD`.
    Date,
    /// Absolute URI with a scheme, e.g. `https://example.com`.
    Uri,
}

impl StringFormat {
    /// Parse a `format` token. Returns `None` for formats this crate
    /// does not know how to check.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "email" => Some(Self::Email),
            "date-time" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "uri" => Some(Self::Uri),
            _ => None,
        }
    }

    /// The schema token for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Uri => "uri",
        }
    }

    /// Returns true if `value` has the shape this format requires.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Email => is_email(value),
            Self::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
            Self::Date => value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Self::Uri => url::Url::parse(value).is_ok(),
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permissive email shape: exactly one `@` with non-empty text on both
/// sides, no whitespace, and no empty domain labels. Single-label domains
/// such as `localhost` are accepted.
fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    !(domain.starts_with('.') || domain.ends_with('.') || domain.contains(".."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_common_addresses() {
        for ok in [
            "user@example.com",
            "john.doe@example.com",
            "first+tag@sub.example.co.uk",
            "user@localhost",
        ] {
            assert!(StringFormat::Email.matches(ok), "{ok} should be accepted");
        }
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        for bad in [
            "invalid-email",
            "@example.com",
            "user@",
            "user@@example.com",
            "a@b@example.com",
            "user @example.com",
            "user@.example.com",
            "user@example..com",
            "",
        ] {
            assert!(!StringFormat::Email.matches(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn date_time_requires_rfc3339() {
        assert!(StringFormat::DateTime.matches("2023-01-15T10:30:00Z"));
        assert!(StringFormat::DateTime.matches("2023-12-01T14:22:30+02:00"));
        assert!(!StringFormat::DateTime.matches("2023-01-15"));
        assert!(!StringFormat::DateTime.matches("yesterday"));
    }

    #[test]
    fn date_requires_zero_padded_calendar_date() {
        assert!(StringFormat::Date.matches("2023-01-15"));
        assert!(!StringFormat::Date.matches("2023-1-5"));
        assert!(!StringFormat::Date.matches("2023-02-30"));
    }

    #[test]
    fn uri_requires_scheme() {
        assert!(StringFormat::Uri.matches("https://johndoe.dev"));
        assert!(!StringFormat::Uri.matches("johndoe.dev"));
    }

    #[test]
    fn parse_round_trips_known_tokens() {
        for token in ["email", "date-time", "date", "uri"] {
            let format = StringFormat::parse(token).unwrap();
            assert_eq!(format.as_str(), token);
        }
        assert_eq!(StringFormat::parse("hostname"), None);
    }
}
