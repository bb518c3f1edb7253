use crate::error::DeepSignalError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

static RE_EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").ok()
});

static RE_PHONE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").ok()
});

// Two to four purely alphabetic words in any case, e.g. "Jane Q. Doe" or "john doe".
static RE_FULL_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^\p{L}+(?:['\-]\p{L}+)*\.?(?:\s+\p{L}+(?:['\-]\p{L}+)*\.?){1,3}$").ok()
});

const MIN_PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiKind {
    Email,
    PhoneNumber,
    FullName,
}

impl fmt::Display for PiiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Email => "an email address",
            Self::PhoneNumber => "a phone number",
            Self::FullName => "a personal name",
        };
        f.write_str(label)
    }
}

fn is_match(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern
        .as_ref()
        .is_some_and(|regex| regex.is_match(value))
}

fn looks_like_phone(value: &str) -> bool {
    let Some(regex) = RE_PHONE.as_ref() else {
        return false;
    };
    regex.find_iter(value).any(|found| {
        found.as_str().chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
    })
}

/// Returns the kind of personal data `value` resembles, if any.
pub fn detect(value: &str) -> Option<PiiKind> {
    let value = value.trim();
    if value.contains('@') || is_match(&RE_EMAIL, value) {
        Some(PiiKind::Email)
    } else if looks_like_phone(value) {
        Some(PiiKind::PhoneNumber)
    } else if is_match(&RE_FULL_NAME, value) {
        Some(PiiKind::FullName)
    } else {
        None
    }
}

/// Rejects identifiers that look like personal data. The value itself is never logged.
pub fn validate_candidate_id(candidate_id: &str) -> Result<(), DeepSignalError> {
    match detect(candidate_id) {
        Some(kind) => {
            warn!(kind = %kind, "candidate id rejected by PII guard");
            Err(DeepSignalError::PiiDetected(kind))
        }
        None => Ok(()),
    }
}
