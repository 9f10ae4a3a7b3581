use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;

/// Maximum number of characters kept of any submitted field.
pub const MAX_INPUT_LENGTH: usize = 5000;

/// A contact form submission exactly as it was received from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    /// Hidden form field, only ever filled in by bots.
    pub honeypot: Option<String>,
}

impl ContactSubmission {
    /// Whether the honeypot field has been filled in.
    pub fn is_bot(&self) -> bool {
        self.honeypot
            .as_deref()
            .is_some_and(|honeypot| !honeypot.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub author: ContactMessageAuthor,
    pub content: ContactMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub name: ContactMessageAuthorName,
    pub email: ContactMessageAuthorEmail,
}

#[nutype(
    sanitize(with = sanitize_input),
    validate(len_char_min = 2, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Eq, Display, TryFrom, Deref)
)]
pub struct ContactMessageAuthorName(String);

#[nutype(
    sanitize(with = sanitize_email),
    validate(regex = CONTACT_EMAIL_REGEX),
    derive(Debug, Clone, PartialEq, Eq, Display, TryFrom, Deref)
)]
pub struct ContactMessageAuthorEmail(String);

#[nutype(
    sanitize(with = sanitize_input),
    validate(len_char_min = 10, len_char_max = 2000),
    derive(Debug, Clone, PartialEq, Eq, Display, TryFrom, Deref)
)]
pub struct ContactMessageContent(String);

/// Authoritative email format check applied by the server.
pub static CONTACT_EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Lenient email format check used for immediate feedback in the form.
pub static PLAUSIBLE_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// Applied to lower-cased addresses only.
static SUSPICIOUS_EMAIL_REGEXES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"\.(ru|tk|ml|ga|cf)$").unwrap(),
        Regex::new(r"^(test|spam|fake|noreply)").unwrap(),
    ]
});

impl ContactMessageAuthorEmail {
    /// Whether the address matches one of the known spam patterns.
    pub fn is_suspicious(&self) -> bool {
        SUSPICIOUS_EMAIL_REGEXES
            .iter()
            .any(|regex| regex.is_match(self))
    }
}

/// Returns whether `email` looks like an email address at all.
pub fn is_plausible_email(email: &str) -> bool {
    PLAUSIBLE_EMAIL_REGEX.is_match(email)
}

/// Trims whitespace, removes angle brackets and truncates to
/// [`MAX_INPUT_LENGTH`] characters.
pub fn sanitize_input(input: String) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .take(MAX_INPUT_LENGTH)
        .collect()
}

fn sanitize_email(input: String) -> String {
    sanitize_input(input).to_lowercase()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sanitize() {
        for (input, expected) in [
            ("  Max Mustermann \n", "Max Mustermann"),
            ("<b>bold</b>", "bbold/b"),
            ("<script>alert(1)</script>", "scriptalert(1)/script"),
            ("a > b < c", "a  b  c"),
            ("", ""),
        ] {
            assert_eq!(sanitize_input(input.into()), expected);
        }
    }

    #[test]
    fn sanitize_truncates() {
        let input = "x".repeat(MAX_INPUT_LENGTH + 100);
        assert_eq!(sanitize_input(input).chars().count(), MAX_INPUT_LENGTH);

        let input = "ä".repeat(MAX_INPUT_LENGTH + 1);
        assert_eq!(sanitize_input(input), "ä".repeat(MAX_INPUT_LENGTH));
    }

    #[test]
    fn sanitize_is_idempotent_on_sanitized_input() {
        let long = "y".repeat(MAX_INPUT_LENGTH);
        for input in [
            "Hello, this is a test message.",
            "multi\nline\n\nmessage",
            "al@example.com",
            "",
            long.as_str(),
        ] {
            let once = sanitize_input(input.into());
            assert_eq!(once, input);
            assert_eq!(sanitize_input(once.clone()), once);
        }
    }

    #[test]
    fn name_length() {
        assert!(ContactMessageAuthorName::try_new("A".to_owned()).is_err());
        assert!(ContactMessageAuthorName::try_new("  A  ".to_owned()).is_err());
        assert!(ContactMessageAuthorName::try_new("<A>".to_owned()).is_err());
        assert!(ContactMessageAuthorName::try_new("x".repeat(101)).is_err());

        assert_eq!(
            *ContactMessageAuthorName::try_new(" Al ".to_owned()).unwrap(),
            "Al"
        );
        assert!(ContactMessageAuthorName::try_new("x".repeat(100)).is_ok());
    }

    #[test]
    fn content_length() {
        assert!(ContactMessageContent::try_new("too short".to_owned()).is_err());
        assert!(ContactMessageContent::try_new("x".repeat(2001)).is_err());

        assert!(ContactMessageContent::try_new("x".repeat(10)).is_ok());
        assert!(ContactMessageContent::try_new("x".repeat(2000)).is_ok());
        assert_eq!(
            *ContactMessageContent::try_new("  Hello, this is a test message.  ".to_owned())
                .unwrap(),
            "Hello, this is a test message."
        );
    }

    #[test]
    fn email_valid() {
        for (input, expected) in [
            ("al@example.com", "al@example.com"),
            ("  Max.Mustermann@Example.DE ", "max.mustermann@example.de"),
            ("first+tag@sub.domain.org", "first+tag@sub.domain.org"),
            ("<al@example.com>", "al@example.com"),
        ] {
            assert_eq!(
                *ContactMessageAuthorEmail::try_new(input.to_owned()).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn email_invalid() {
        for input in [
            "",
            "al.example.com",
            "al@",
            "@example.com",
            "al@example",
            "al@example.",
            "al@example.c",
            "al@exa mple.com",
            "al@@example.com",
        ] {
            assert!(
                ContactMessageAuthorEmail::try_new(input.to_owned()).is_err(),
                "{input:?} should be rejected"
            );
            if input != "al@example.c" {
                assert!(!is_plausible_email(input), "{input:?} should be rejected");
            }
        }
    }

    #[test]
    fn plausible_email() {
        assert!(is_plausible_email("al@example.com"));
        assert!(is_plausible_email("a@b.c"));
        assert!(!is_plausible_email(" al@example.com"));
    }

    #[test]
    fn suspicious_email() {
        for (input, expected) in [
            ("al@example.com", false),
            ("al@example.ru", true),
            ("AL@EXAMPLE.TK", true),
            ("testing@example.com", true),
            ("noreply@example.com", true),
            ("contest@example.com", false),
        ] {
            let email = ContactMessageAuthorEmail::try_new(input.to_owned()).unwrap();
            assert_eq!(email.is_suspicious(), expected, "{input}");
        }
    }

    #[test]
    fn honeypot() {
        let mut submission = ContactSubmission::default();
        assert!(!submission.is_bot());

        submission.honeypot = Some("   ".into());
        assert!(!submission.is_bot());

        submission.honeypot = Some("http://spam.example".into());
        assert!(submission.is_bot());
    }
}
