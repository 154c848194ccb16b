//! Contact extraction from free text.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

// Hong Kong numbers are eight digits, optionally grouped 4+4, optionally
// prefixed +852.
static HK_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+852\s?)?(?:\d{4}\s?\d{4}|\d{8})").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Pulls the first email address and the first Hong Kong phone number out
/// of free text. No deliverability or directory validation.
pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        email: EMAIL.find(text).map(|m| m.as_str().to_string()),
        phone: HK_PHONE.find(text).map(|m| m.as_str().to_string()),
    }
}
