//! Date and time normalization.
//!
//! Raw listings carry dates in whatever shape the upstream site uses:
//! Chinese calendar notation with 上午/下午 clock markers, slash dates,
//! explicit ISO timestamps, or dates buried in a sentence. Everything is
//! reduced to `chrono` values; unparseable input yields `None`, never an
//! error.

use super::collapse_whitespace;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Per-source date grammar hint. `LabourDept` enables the Chinese
/// `YYYY年M月D日` notation with 上午/下午 clock markers used by the
/// Labour Department listings; the generic grammar goes straight to the
/// shared pattern scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateGrammar {
    #[default]
    Generic,
    LabourDept,
}

/// Hong Kong local offset. Timestamps without an explicit zone are taken
/// as Hong Kong time and rendered with this offset.
pub fn hk_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

static CJK_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").unwrap());

static CJK_CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(上午|下午)(\d{1,2}):(\d{2})").unwrap());

// End date may omit the year, in which case it reuses the start year.
static CJK_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日\s*(?:至|到|-)\s*(?:(\d{4})年)?(\d{1,2})月(\d{1,2})日")
        .unwrap()
});

static SLASH_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\s*(?:至|到|-)\s*(\d{1,2})/(\d{1,2})/(\d{4})\b")
        .unwrap()
});

static ISO_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\s*(?:至|到|-)\s*(\d{4})-(\d{1,2})-(\d{1,2})\b")
        .unwrap()
});

static NAIVE_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})[T ](\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap()
});

static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(上午|下午)?(\d{1,2}):(\d{2})\s*(?:至|到|-)\s*(上午|下午)?(\d{1,2}):(\d{2})")
        .unwrap()
});

static PLAIN_CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap());

#[derive(Debug, Clone, Copy)]
enum DateShape {
    IsoYmd,
    SlashDmy,
    Chinese,
    MonthFirst,
    DayFirst,
}

/// Date patterns scanned over free text, most specific first. Hong Kong
/// slash dates are day-first.
static DATE_PATTERNS: Lazy<Vec<(Regex, DateShape)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap(),
            DateShape::IsoYmd,
        ),
        (
            Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap(),
            DateShape::SlashDmy,
        ),
        (
            Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").unwrap(),
            DateShape::Chinese,
        ),
        (
            Regex::new(
                r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
            )
            .unwrap(),
            DateShape::MonthFirst,
        ),
        (
            Regex::new(
                r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})\b",
            )
            .unwrap(),
            DateShape::DayFirst,
        ),
    ]
});

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn date_from_parts(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    // Sanity window keeps phone numbers and reference codes from reading
    // as dates.
    if !(1900..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn date_from_captures(caps: &regex::Captures, shape: DateShape) -> Option<NaiveDate> {
    match shape {
        DateShape::IsoYmd | DateShape::Chinese => date_from_parts(
            caps.get(1)?.as_str().parse().ok()?,
            caps.get(2)?.as_str().parse().ok()?,
            caps.get(3)?.as_str().parse().ok()?,
        ),
        DateShape::SlashDmy | DateShape::DayFirst => {
            let day: u32 = caps.get(1)?.as_str().parse().ok()?;
            let month = match shape {
                DateShape::DayFirst => month_number(caps.get(2)?.as_str())?,
                _ => caps.get(2)?.as_str().parse().ok()?,
            };
            let year: i32 = caps.get(3)?.as_str().parse().ok()?;
            date_from_parts(year, month, day)
        }
        DateShape::MonthFirst => {
            let month = month_number(caps.get(1)?.as_str())?;
            let day: u32 = caps.get(2)?.as_str().parse().ok()?;
            let year: i32 = caps.get(3)?.as_str().parse().ok()?;
            date_from_parts(year, month, day)
        }
    }
}

fn scan_date(text: &str) -> Option<NaiveDate> {
    for (pattern, shape) in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(date) = date_from_captures(&caps, *shape) {
                return Some(date);
            }
        }
    }
    None
}

fn match_cjk_date(text: &str) -> Option<NaiveDate> {
    let caps = CJK_DATE.captures(text)?;
    date_from_captures(&caps, DateShape::Chinese)
}

fn clock_from(marker: Option<&str>, hour: &str, minute: &str) -> Option<NaiveTime> {
    let mut hour: u32 = hour.parse().ok()?;
    // 下午 marks the 12-hour afternoon clock; hours already >= 12 pass
    // through untouched.
    if marker == Some("下午") && hour < 12 {
        hour += 12;
    }
    NaiveTime::from_hms_opt(hour, minute.parse().ok()?, 0)
}

fn scan_clock(text: &str) -> Option<NaiveTime> {
    if let Some(caps) = CJK_CLOCK.captures(text) {
        return clock_from(
            Some(caps.get(1)?.as_str()),
            caps.get(2)?.as_str(),
            caps.get(3)?.as_str(),
        );
    }
    let caps = PLAIN_CLOCK.captures(text)?;
    clock_from(None, caps.get(1)?.as_str(), caps.get(2)?.as_str())
}

/// Builds a Hong Kong local timestamp from a date and a clock time.
pub fn hk_local(date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
    date.and_time(time).and_local_timezone(hk_offset()).single()
}

/// Normalizes a date string to a calendar date. Grammar hits are tried
/// first, then the free-text pattern scan.
pub fn normalize_date(raw: &str, grammar: DateGrammar) -> Option<NaiveDate> {
    let text = collapse_whitespace(raw);
    if text.is_empty() {
        return None;
    }
    if grammar == DateGrammar::LabourDept {
        if let Some(date) = match_cjk_date(&text) {
            return Some(date);
        }
    }
    scan_date(&text)
}

/// Normalizes a date or date-range string. Range separators are `-`, 至
/// and 到; a lone date yields `(date, None)`.
pub fn normalize_date_range(
    raw: &str,
    grammar: DateGrammar,
) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let text = collapse_whitespace(raw);
    if text.is_empty() {
        return None;
    }

    if let Some(range) = match_cjk_range(&text) {
        return Some(range);
    }
    for (pattern, shape) in [
        (&*SLASH_DATE_RANGE, DateShape::SlashDmy),
        (&*ISO_DATE_RANGE, DateShape::IsoYmd),
    ] {
        if let Some(range) = match_paired_range(pattern, shape, &text) {
            return Some(range);
        }
    }

    normalize_date(&text, grammar).map(|date| (date, None))
}

fn match_cjk_range(text: &str) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let caps = CJK_DATE_RANGE.captures(text)?;
    let start_year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let start = date_from_parts(
        start_year,
        caps.get(2)?.as_str().parse().ok()?,
        caps.get(3)?.as_str().parse().ok()?,
    )?;
    let end_year = match caps.get(4) {
        Some(year) => year.as_str().parse().ok()?,
        None => start_year,
    };
    let end = date_from_parts(
        end_year,
        caps.get(5)?.as_str().parse().ok()?,
        caps.get(6)?.as_str().parse().ok()?,
    );
    Some((start, end))
}

fn match_paired_range(
    pattern: &Regex,
    shape: DateShape,
    text: &str,
) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let caps = pattern.captures(text)?;
    let start = date_from_groups(&caps, 1, shape)?;
    let end = date_from_groups(&caps, 4, shape);
    Some((start, end))
}

fn date_from_groups(caps: &regex::Captures, base: usize, shape: DateShape) -> Option<NaiveDate> {
    let first: u32 = caps.get(base)?.as_str().parse().ok()?;
    let month: u32 = caps.get(base + 1)?.as_str().parse().ok()?;
    let last: u32 = caps.get(base + 2)?.as_str().parse().ok()?;
    match shape {
        DateShape::IsoYmd => date_from_parts(first as i32, month, last),
        _ => date_from_parts(last as i32, month, first),
    }
}

/// Normalizes a datetime string to a Hong Kong local timestamp.
///
/// Priority: source grammar, explicit-offset ISO input (re-expressed with
/// `+08:00`), naive `YYYY-MM-DD HH:MM[:SS]`, then a free-text scan needing
/// both a recognizable date and a clock time. Date-only input yields
/// `None` so callers can fall back to the date-only rendering.
pub fn normalize_datetime(raw: &str, grammar: DateGrammar) -> Option<DateTime<FixedOffset>> {
    let text = collapse_whitespace(raw);
    if text.is_empty() {
        return None;
    }

    if grammar == DateGrammar::LabourDept {
        if let Some(dt) = match_labour_dept_datetime(&text) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.with_timezone(&hk_offset()));
    }

    if let Some(dt) = match_naive_datetime(&text) {
        return Some(dt);
    }

    let date = scan_date(&text)?;
    let time = scan_clock(&text)?;
    hk_local(date, time)
}

fn match_labour_dept_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let date = match_cjk_date(text)?;
    let caps = CJK_CLOCK.captures(text)?;
    let time = clock_from(Some(caps.get(1)?.as_str()), caps.get(2)?.as_str(), caps.get(3)?.as_str())?;
    hk_local(date, time)
}

fn match_naive_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let caps = NAIVE_DATETIME.captures(text)?;
    let date = date_from_parts(
        caps.get(1)?.as_str().parse().ok()?,
        caps.get(2)?.as_str().parse().ok()?,
        caps.get(3)?.as_str().parse().ok()?,
    )?;
    let second: u32 = match caps.get(6) {
        Some(s) => s.as_str().parse().ok()?,
        None => 0,
    };
    let time = NaiveTime::from_hms_opt(
        caps.get(4)?.as_str().parse().ok()?,
        caps.get(5)?.as_str().parse().ok()?,
        second,
    )?;
    hk_local(date, time)
}

/// Extracts a `H:MM 至/- H:MM` time range, honoring optional 上午/下午
/// markers on either side. Callers attach both ends to the same calendar
/// date.
pub fn normalize_time_range(raw: &str) -> Option<(NaiveTime, NaiveTime)> {
    let text = collapse_whitespace(raw);
    let caps = TIME_RANGE.captures(&text)?;
    let start = clock_from(
        caps.get(1).map(|m| m.as_str()),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str(),
    )?;
    let end = clock_from(
        caps.get(4).map(|m| m.as_str()),
        caps.get(5)?.as_str(),
        caps.get(6)?.as_str(),
    )?;
    Some((start, end))
}

/// Canonical date rendering.
pub fn render_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Canonical timestamp rendering. Feeding the output back through
/// `normalize_datetime` reproduces it exactly.
pub fn render_datetime(dt: DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
