use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw event record as handed over by a source collaborator.
///
/// Field names map to raw string or boolean values. Everything is optional
/// and possibly inconsistent; the normalizer is responsible for making
/// sense of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEventRecord {
    fields: Map<String, Value>,
}

impl RawEventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed text of a field, or None when the field is
    /// absent, not a string, or blank.
    pub fn text(&self, field: &str) -> Option<&str> {
        let raw = self.fields.get(field)?.as_str()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Returns a boolean field, accepting JSON booleans as well as the
    /// string forms "true"/"false" that some feeds emit.
    pub fn flag(&self, field: &str) -> Option<bool> {
        match self.fields.get(field)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }
}

impl From<Map<String, Value>> for RawEventRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Language(s) an event record is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ZH-HK")]
    ZhHk,
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "BOTH")]
    Both,
}

/// Lifecycle status of an event. Newly normalized events are always
/// `Upcoming`; the other variants exist for corpus round-tripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Completed,
    Cancelled,
}

/// Canonical event produced by the normalizer.
///
/// Datetimes are stored in their canonical rendering: `YYYY-MM-DD` for
/// date-only values, full ISO-8601 with the `+08:00` offset otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub event_name: String,
    pub event_name_zh: Option<String>,
    pub event_name_en: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub district: Option<String>,
    pub organizer_name: Option<String>,
    pub language: Option<Language>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub description: Option<String>,
    pub website_link: Option<String>,
    pub event_type: Option<String>,
    pub is_physical: bool,
    pub is_virtual: bool,
    pub source_id: Option<String>,
    pub source_event_id: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub fingerprint: String,
}

impl NormalizedEvent {
    /// Calendar day the event starts on, when a start datetime is known.
    /// Both canonical renderings open with `YYYY-MM-DD`, so the date is
    /// always the first ten characters.
    pub fn start_date(&self) -> Option<NaiveDate> {
        let raw = self.start_datetime.as_deref()?;
        let prefix = raw.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}
