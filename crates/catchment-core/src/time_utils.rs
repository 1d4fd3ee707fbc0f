use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

// ── Calendar date extraction ──────────────────────────────────────────────────

/// Calendar date of `timestamp`, with the time of day discarded.
///
/// This is the bucketing key for every daily reduction.
pub fn calendar_date(timestamp: &NaiveDateTime) -> NaiveDate {
    timestamp.date()
}

// ── TimestampParser ───────────────────────────────────────────────────────────

const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
];

const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DAY_FIRST_DATES: &[&str] = &["%d/%m/%Y", "%d-%m-%Y"];
const MONTH_FIRST_DATES: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];
const ISO_DATES: &[&str] = &["%Y-%m-%d"];

/// Parses the naive local timestamps found in site export files.
///
/// Exports are written with the day before the month (`25/12/2008 09:00`),
/// so `day_first` is the default. ISO 8601 forms are accepted either way.
/// Date-only values are placed at midnight.
#[derive(Debug, Clone, Copy)]
pub struct TimestampParser {
    day_first: bool,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self { day_first: true }
    }
}

impl TimestampParser {
    pub fn new(day_first: bool) -> Self {
        Self { day_first }
    }

    /// Parse `s`, returning `None` for empty or unrecognised input.
    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let (datetime_formats, date_formats) = if self.day_first {
            (DAY_FIRST_FORMATS, DAY_FIRST_DATES)
        } else {
            (MONTH_FIRST_FORMATS, MONTH_FIRST_DATES)
        };

        for fmt in datetime_formats.iter().chain(ISO_FORMATS) {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }

        for fmt in date_formats.iter().chain(ISO_DATES) {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        debug!(
            "TimestampParser: could not parse \"{}\" (day_first = {})",
            s, self.day_first
        );
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
