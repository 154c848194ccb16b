//! Field-by-field normalization of raw event records.
//!
//! Stages run in a fixed sequence over each record: dates and times, venue
//! and district, language, contacts, then the identity fingerprint. Every
//! stage is total over its input; a field that matches no grammar comes out
//! as `None` and processing continues.

pub mod contact;
pub mod datetime;
pub mod language;
pub mod venue;

pub use contact::{extract_contact_info, ContactInfo};
pub use datetime::DateGrammar;
pub use language::ScriptConverter;
pub use venue::VenueCanonicalizer;

use crate::dedup::fingerprint::event_fingerprint;
use crate::domain::{EventStatus, Language, NormalizedEvent, RawEventRecord};
use crate::sources::SourceDescriptor;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Collapses whitespace runs to single spaces and trims.
pub(crate) fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

/// Strips residual HTML tags and collapses whitespace. Yields None when
/// nothing but markup remains.
pub fn clean_text(raw: &str) -> Option<String> {
    let stripped = HTML_TAG.replace_all(raw, " ");
    let cleaned = collapse_whitespace(&stripped);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Why a raw record was rejected instead of normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No event name in any slot. Placeholder naming is a per-source
    /// policy, so the record goes back to the caller undecided.
    MissingEventName,
}

/// Runs the normalization stages and assembles the canonical event.
pub struct Normalizer {
    venues: VenueCanonicalizer,
    script: ScriptConverter,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            venues: VenueCanonicalizer::new(),
            script: ScriptConverter::new(),
        }
    }

    pub fn normalize(
        &self,
        record: &RawEventRecord,
        descriptor: &SourceDescriptor,
    ) -> Result<NormalizedEvent, RejectReason> {
        let raw_name = record
            .text("event_name")
            .or_else(|| record.text("event_name_zh"))
            .or_else(|| record.text("event_name_en"))
            .ok_or(RejectReason::MissingEventName)?;
        let event_name = clean_text(raw_name).ok_or(RejectReason::MissingEventName)?;
        let event_name = self.script.convert(&event_name);

        let mut event_name_zh = record
            .text("event_name_zh")
            .and_then(clean_text)
            .map(|name| self.script.convert(&name));
        let mut event_name_en = record.text("event_name_en").and_then(clean_text);

        // Mirror the name into the slot its script indicates so at least
        // one language slot is always populated.
        if event_name_zh.is_none() && event_name_en.is_none() {
            match language::classify(&event_name) {
                Some(Language::ZhHk) => event_name_zh = Some(event_name.clone()),
                Some(Language::En) => event_name_en = Some(event_name.clone()),
                _ => {
                    event_name_zh = Some(event_name.clone());
                    event_name_en = Some(event_name.clone());
                }
            }
        }

        let grammar = descriptor.date_grammar;
        let raw_end = record.text("end_datetime");
        let mut start_datetime = None;
        let mut end_datetime = None;

        if let Some(raw_start) = record.text("start_datetime") {
            if let Some(dt) = datetime::normalize_datetime(raw_start, grammar) {
                start_datetime = Some(datetime::render_datetime(dt));
                // A time range on the start line supplies the end of day
                if raw_end.is_none() {
                    if let Some((_, end_time)) = datetime::normalize_time_range(raw_start) {
                        end_datetime =
                            datetime::hk_local(dt.date_naive(), end_time).map(datetime::render_datetime);
                    }
                }
            } else if let Some((start, end)) = datetime::normalize_date_range(raw_start, grammar) {
                start_datetime = Some(datetime::render_date(start));
                if raw_end.is_none() {
                    end_datetime = end.map(datetime::render_date);
                }
            }
        }

        if let Some(raw_end) = raw_end {
            if let Some(dt) = datetime::normalize_datetime(raw_end, grammar) {
                end_datetime = Some(datetime::render_datetime(dt));
            } else if let Some(date) = datetime::normalize_date(raw_end, grammar) {
                end_datetime = Some(datetime::render_date(date));
            }
        }

        // An end before the start is dropped rather than guessed at
        if let (Some(start), Some(end)) = (start_datetime.as_deref(), end_datetime.as_deref()) {
            if end_precedes_start(start, end) {
                debug!(start, end, "Dropping end datetime that precedes start");
                end_datetime = None;
            }
        }

        let venue_name = record
            .text("venue_name")
            .and_then(|venue| self.venues.canonical_venue(venue));
        let venue_address = record.text("venue_address").and_then(clean_text);
        let district = venue_address
            .as_deref()
            .and_then(|address| self.venues.district(address))
            .or_else(|| {
                record
                    .text("venue_name")
                    .and_then(|venue| self.venues.district(venue))
            });

        let organizer_name = record
            .text("organizer_name")
            .and_then(clean_text)
            .map(|name| self.script.convert(&name))
            .or_else(|| descriptor.default_organizer.clone());

        let language = match (&event_name_zh, &event_name_en) {
            (Some(_), Some(_)) => Some(Language::Both),
            (Some(_), None) => Some(Language::ZhHk),
            (None, Some(_)) => Some(Language::En),
            (None, None) => Some(descriptor.language),
        };

        let mut contact_email = record.text("contact_email").map(str::to_string);
        let mut contact_phone = record.text("contact_phone").map(str::to_string);
        if contact_email.is_none() || contact_phone.is_none() {
            if let Some(text) = record.text("contact") {
                let info = extract_contact_info(text);
                contact_email = contact_email.or(info.email);
                contact_phone = contact_phone.or(info.phone);
            }
        }

        let description = record
            .text("description")
            .or_else(|| record.text("description_zh"))
            .or_else(|| record.text("description_en"))
            .and_then(clean_text)
            .map(|text| self.script.convert(&text));

        let mut event = NormalizedEvent {
            event_name,
            event_name_zh,
            event_name_en,
            start_datetime,
            end_datetime,
            venue_name,
            venue_address,
            district,
            organizer_name,
            language,
            contact_email,
            contact_phone,
            description,
            website_link: record.text("website_link").map(str::to_string),
            event_type: record.text("event_type").map(str::to_string),
            is_physical: record.flag("is_physical").unwrap_or(true),
            is_virtual: record.flag("is_virtual").unwrap_or(false),
            source_id: Some(descriptor.source_id.clone()),
            source_event_id: record.text("source_event_id").map(str::to_string),
            status: EventStatus::Upcoming,
            fingerprint: String::new(),
        };
        event.fingerprint = event_fingerprint(&event);
        Ok(event)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn date_prefix(canonical: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(canonical.get(..10)?, "%Y-%m-%d").ok()
}

fn end_precedes_start(start: &str, end: &str) -> bool {
    let (Some(start_day), Some(end_day)) = (date_prefix(start), date_prefix(end)) else {
        return false;
    };
    if end_day != start_day {
        return end_day < start_day;
    }
    // Same day with two full timestamps: the canonical rendering compares
    // by clock
    start.len() > 10 && end.len() > 10 && end < start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawEventRecord;
    use crate::sources::SourceDescriptor;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawEventRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_labour_dept_record_end_to_end() {
        let normalizer = Normalizer::new();
        let descriptor = SourceDescriptor::labour_dept();
        let record = record(json!({
            "event_name": "青年招聘會",
            "start_datetime": "2023年12月25日 上午10:00 - 下午5:00",
            "venue_name": "HKCEC",
            "venue_address": "香港灣仔博覽道1號",
            "contact": "查詢：2852 3535",
            "description": "<p>即場面試，<b>歡迎參加</b></p>",
        }));

        let event = normalizer.normalize(&record, &descriptor).unwrap();
        assert_eq!(event.event_name, "青年招聘會");
        assert_eq!(event.event_name_zh.as_deref(), Some("青年招聘會"));
        assert_eq!(event.event_name_en, None);
        assert_eq!(
            event.start_datetime.as_deref(),
            Some("2023-12-25T10:00:00+08:00")
        );
        assert_eq!(
            event.end_datetime.as_deref(),
            Some("2023-12-25T17:00:00+08:00")
        );
        assert_eq!(event.venue_name.as_deref(), Some("香港會議展覽中心"));
        assert_eq!(event.district.as_deref(), Some("灣仔"));
        assert_eq!(event.organizer_name.as_deref(), Some("香港勞工處"));
        assert_eq!(event.language, Some(crate::domain::Language::ZhHk));
        assert_eq!(event.contact_phone.as_deref(), Some("2852 3535"));
        assert_eq!(event.description.as_deref(), Some("即場面試， 歡迎參加"));
        assert_eq!(event.status, EventStatus::Upcoming);
        assert_eq!(event.source_id.as_deref(), Some("labour_dept_hk"));
        assert!(!event.fingerprint.is_empty());
    }

    #[test]
    fn test_missing_name_is_rejected_not_fabricated() {
        let normalizer = Normalizer::new();
        let descriptor = SourceDescriptor::labour_dept();

        let empty = record(json!({ "venue_name": "HKCEC" }));
        assert_eq!(
            normalizer.normalize(&empty, &descriptor),
            Err(RejectReason::MissingEventName)
        );

        let markup_only = record(json!({ "event_name": "<b> </b>" }));
        assert_eq!(
            normalizer.normalize(&markup_only, &descriptor),
            Err(RejectReason::MissingEventName)
        );
    }

    #[test]
    fn test_end_before_start_is_dropped() {
        let normalizer = Normalizer::new();
        let descriptor = SourceDescriptor::hktdc();
        let record = record(json!({
            "event_name": "Career Expo",
            "start_datetime": "5/3/2024",
            "end_datetime": "1/3/2024",
        }));

        let event = normalizer.normalize(&record, &descriptor).unwrap();
        assert_eq!(event.start_datetime.as_deref(), Some("2024-03-05"));
        assert_eq!(event.end_datetime, None);
    }

    #[test]
    fn test_slash_range_fills_both_ends() {
        let normalizer = Normalizer::new();
        let descriptor = SourceDescriptor::hktdc();
        let record = record(json!({
            "event_name": "HKTDC Education & Careers Expo",
            "start_datetime": "1/3/2024 至 3/3/2024",
        }));

        let event = normalizer.normalize(&record, &descriptor).unwrap();
        assert_eq!(event.start_datetime.as_deref(), Some("2024-03-01"));
        assert_eq!(event.end_datetime.as_deref(), Some("2024-03-03"));
    }

    #[test]
    fn test_simplified_names_become_traditional() {
        let normalizer = Normalizer::new();
        let descriptor = SourceDescriptor::labour_dept();
        let record = record(json!({
            "event_name": "青年就业博览会",
        }));

        let event = normalizer.normalize(&record, &descriptor).unwrap();
        assert_eq!(event.event_name, "青年就業博覽會");
        assert_eq!(event.event_name_zh.as_deref(), Some("青年就業博覽會"));
    }

    #[test]
    fn test_renormalizing_canonical_output_is_stable() {
        let normalizer = Normalizer::new();
        let descriptor = SourceDescriptor::labour_dept();
        let first = normalizer
            .normalize(
                &record(json!({
                    "event_name": "青年招聘會",
                    "start_datetime": "2023年12月25日 下午3:30",
                    "venue_name": "九龍灣國際展貿中心",
                })),
                &descriptor,
            )
            .unwrap();

        let second = normalizer
            .normalize(
                &record(json!({
                    "event_name": first.event_name,
                    "start_datetime": first.start_datetime,
                    "venue_name": first.venue_name,
                })),
                &descriptor,
            )
            .unwrap();

        assert_eq!(second.start_datetime, first.start_datetime);
        assert_eq!(second.venue_name, first.venue_name);
        assert_eq!(second.fingerprint, first.fingerprint);
    }

    #[test]
    fn test_bilingual_record_is_both_languages() {
        let normalizer = Normalizer::new();
        let descriptor = SourceDescriptor::hktdc();
        let record = record(json!({
            "event_name": "教育及職業博覽 Education & Careers Expo",
            "event_name_zh": "教育及職業博覽",
            "event_name_en": "Education & Careers Expo",
        }));

        let event = normalizer.normalize(&record, &descriptor).unwrap();
        assert_eq!(event.language, Some(crate::domain::Language::Both));
        assert_eq!(event.event_name_zh.as_deref(), Some("教育及職業博覽"));
        assert_eq!(event.event_name_en.as_deref(), Some("Education & Careers Expo"));
    }
}
