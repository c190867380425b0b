use std::fmt;

use lazy_regex::regex_is_match;

use crate::error::DomainError;

/// A trimmed, lowercased email address that passed validation.
///
/// The only way to build one is [`SubscriberEmail::parse`], so any value of
/// this type is safe to use as a uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Normalize and validate a raw address.
    ///
    /// Accepts `<local>@<domain>.<tld>` where no part is empty or contains
    /// whitespace or another `@`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();

        if regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", &normalized) {
            Ok(Self(normalized))
        } else {
            Err(DomainError::Validation(format!(
                "{:?} is not a valid email address",
                raw
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form for logging, e.g. `j***@example.com`.
    pub fn masked(&self) -> String {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let first = local.chars().next().unwrap_or('*');
                if local.chars().count() > 1 {
                    format!("{}***@{}", first, domain)
                } else {
                    format!("***@{}", domain)
                }
            }
            None => "***".to_string(),
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let email = SubscriberEmail::parse("  Test@Example.COM \n").unwrap();
        assert_eq!(email.as_str(), "test@example.com");
    }

    #[test]
    fn test_accepts_plain_addresses() {
        for raw in [
            "a@b.co",
            "first.last+tag@sub.example.org",
            "x@y.z",
            "user@domain.with.many.parts",
        ] {
            assert!(SubscriberEmail::parse(raw).is_ok(), "{raw} should be valid");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for raw in [
            "",
            "   ",
            "not-an-email",
            "a@b",
            "@example.com",
            "user@",
            "user@.com",
            "user@example.",
            "us er@example.com",
            "user@@example.com",
            "a@b@c.com",
        ] {
            let result = SubscriberEmail::parse(raw);
            assert!(
                matches!(result, Err(DomainError::Validation(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_masked() {
        let email = SubscriberEmail::parse("john@example.com").unwrap();
        assert_eq!(email.masked(), "j***@example.com");

        let short = SubscriberEmail::parse("j@example.com").unwrap();
        assert_eq!(short.masked(), "***@example.com");
    }
}
