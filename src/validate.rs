//! Field validation for the certificate-request form, independent of any
//! page state. Validators map raw input text to a [`FieldState`]; rendering
//! that state into markers and feedback nodes happens elsewhere.

use std::sync::OnceLock;

use fancy_regex::Regex;

pub(crate) const MSG_DOMAINS_REQUIRED: &str = "Domain name(s) are required.";
pub(crate) const MSG_DOMAINS_NONE_VALID: &str = "Please enter at least one valid domain.";
pub(crate) const MSG_EMAIL_REQUIRED: &str = "Email address is required.";
pub(crate) const MSG_EMAIL_INVALID: &str = "Please enter a valid email address.";
pub(crate) const MSG_EMAIL_VALID: &str = "Email address is valid.";
pub(crate) const MSG_AGREEMENT_REQUIRED: &str =
    "You must accept the Let's Encrypt Subscriber Agreement.";

/// Longest hostname accepted, in characters.
const MAX_DOMAIN_LEN: usize = 253;

/// Validation state of a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Untouched,
    Valid(String),
    Invalid(String),
}

impl FieldState {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Untouched => None,
            Self::Valid(message) | Self::Invalid(message) => Some(message),
        }
    }
}

fn domain_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .unwrap_or_else(|err| unreachable!("domain pattern is valid: {err}"))
    })
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|err| unreachable!("email pattern is valid: {err}"))
    })
}

/// Accepts dot-separated ASCII labels, 1-63 chars each, no edge hyphens,
/// 253 chars total. URL scheme prefixes are rejected outright.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        return false;
    }
    if domain.chars().count() > MAX_DOMAIN_LEN {
        return false;
    }
    domain_regex().is_match(domain).unwrap_or(false)
}

/// Splits a comma-separated domain list into trimmed, non-empty candidates.
pub fn split_domain_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .collect()
}

pub fn validate_domain_list(raw: &str) -> FieldState {
    let raw = raw.trim();
    if raw.is_empty() {
        return FieldState::Invalid(MSG_DOMAINS_REQUIRED.to_string());
    }

    let candidates = split_domain_list(raw);
    if candidates.is_empty() {
        return FieldState::Invalid(MSG_DOMAINS_NONE_VALID.to_string());
    }

    for candidate in &candidates {
        if !is_valid_domain(candidate) {
            return FieldState::Invalid(format!("Invalid domain format: {candidate}"));
        }
    }

    FieldState::Valid(format!(
        "{} domain(s) validated successfully.",
        candidates.len()
    ))
}

pub fn validate_email(raw: &str) -> FieldState {
    let raw = raw.trim();
    if raw.is_empty() {
        return FieldState::Invalid(MSG_EMAIL_REQUIRED.to_string());
    }

    if !email_regex().is_match(raw).unwrap_or(false) {
        return FieldState::Invalid(MSG_EMAIL_INVALID.to_string());
    }

    FieldState::Valid(MSG_EMAIL_VALID.to_string())
}

fn comma_spacing_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\s*,\s*")
            .unwrap_or_else(|err| unreachable!("comma spacing pattern is valid: {err}"))
    })
}

/// Normalizes comma spacing in the domains field (`"a ,b"` -> `"a, b"`).
pub fn format_domain_input(value: &str) -> String {
    comma_spacing_regex().replace_all(value, ", ").into_owned()
}
