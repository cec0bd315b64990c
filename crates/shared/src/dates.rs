//! ISO-8601 parsing and human formatting for conference and deadline dates.
//!
//! Dates stay as strings on the model and are parsed here on every call, so
//! there is never a cached parsed form to go stale. Parsing never fails loudly:
//! anything unrecognised comes back as `None` and callers treat it as missing.

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use chrono_tz::Tz;

/// Anywhere on Earth, the UTC-12 convention used by most academic deadlines.
pub const AOE_OFFSET_SECONDS: i32 = -12 * 3600;

pub const TBA: &str = "TBA";

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const MAX_OFFSET_HOURS: i32 = 14;
const DATETIME_DISPLAY: &str = "%b %-d, %Y %-I:%M %p";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

pub fn aoe_offset() -> FixedOffset {
    FixedOffset::east_opt(AOE_OFFSET_SECONDS).unwrap_or_else(utc_offset)
}

/// A timezone dates can be read in and rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Fixed(FixedOffset),
    /// An IANA region such as `America/New_York`, with its DST rules.
    Region(Tz),
    /// The machine's own timezone.
    Local,
}

impl Zone {
    pub fn utc() -> Self {
        Self::Fixed(utc_offset())
    }

    pub fn aoe() -> Self {
        Self::Fixed(aoe_offset())
    }

    /// Reads a wall-clock time in this zone. Ambiguous times take the earlier
    /// instant; times skipped by a DST jump move forward an hour.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Fixed(offset) => localize_in(offset, naive),
            Self::Region(tz) => localize_in(tz, naive),
            Self::Local => localize_in(&Local, naive),
        }
    }

    /// `May 15, 2025 11:59 PM AoE` style rendering.
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Fixed(offset) => format!(
                "{} {}",
                instant.with_timezone(offset).format(DATETIME_DISPLAY),
                offset_label(*offset)
            ),
            Self::Region(tz) => instant
                .with_timezone(tz)
                .format(&format!("{DATETIME_DISPLAY} %Z"))
                .to_string(),
            Self::Local => {
                let local = instant.with_timezone(&Local);
                format!(
                    "{} {}",
                    local.format(DATETIME_DISPLAY),
                    offset_label(local.offset().fix())
                )
            }
        }
    }
}

fn localize_in<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(naive)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(*naive + Duration::hours(1)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
}

/// Resolves a timezone label.
///
/// Understands `AoE`, `UTC`/`GMT`/`Z`, `UTC±H[:MM]`, `GMT±H[:MM]`, the
/// POSIX-style `Etc/GMT±N` names (whose sign is inverted) and IANA region
/// names such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> Option<Zone> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if name.eq_ignore_ascii_case("aoe") || name.eq_ignore_ascii_case("anywhere on earth") {
        return Some(Zone::aoe());
    }
    if ["utc", "gmt", "z", "etc/utc", "etc/gmt"]
        .iter()
        .any(|alias| name.eq_ignore_ascii_case(alias))
    {
        return Some(Zone::utc());
    }

    let upper = name.to_ascii_uppercase();
    if let Some(rest) = upper.strip_prefix("ETC/GMT") {
        let seconds = parse_signed_offset(rest)?;
        if seconds % 3600 != 0 {
            return None;
        }
        return FixedOffset::east_opt(-seconds).map(Zone::Fixed);
    }

    if let Some(rest) = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
    {
        return FixedOffset::east_opt(parse_signed_offset(rest)?).map(Zone::Fixed);
    }

    name.parse::<Tz>().ok().map(Zone::Region)
}

fn parse_signed_offset(raw: &str) -> Option<i32> {
    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };

    let (hours, minutes) = if let Some((hours, minutes)) = rest.split_once(':') {
        (hours.parse::<i32>().ok()?, minutes.parse::<i32>().ok()?)
    } else if rest.len() == 4 && rest.bytes().all(|b| b.is_ascii_digit()) {
        (rest[..2].parse::<i32>().ok()?, rest[2..].parse::<i32>().ok()?)
    } else {
        (rest.parse::<i32>().ok()?, 0)
    };

    if !(0..=MAX_OFFSET_HOURS).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Parses an ISO-8601 date or date-time into an instant.
///
/// Strings carrying their own offset (RFC 3339) ignore `timezone`. Naive
/// strings are read in `timezone` when it resolves, otherwise in UTC; a bare
/// date means midnight in that zone.
pub fn parse_instant(raw: &str, timezone: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }

    let zone = timezone.and_then(parse_timezone).unwrap_or_else(Zone::utc);
    zone.localize(&parse_naive(raw)?)
}

/// The calendar date exactly as written, before any timezone conversion.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.date_naive());
    }
    parse_naive(raw).map(|naive| naive.date())
}

/// `May 15, 2025`, or `TBA` for a missing date.
pub fn format_date(instant: Option<DateTime<Utc>>) -> String {
    match instant {
        Some(instant) => instant.format("%B %-d, %Y").to_string(),
        None => TBA.to_string(),
    }
}

pub fn offset_label(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }
    if seconds == AOE_OFFSET_SECONDS {
        return "AoE".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.abs();
    format!("UTC{sign}{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60)
}

pub fn format_aoe(instant: DateTime<Utc>) -> String {
    Zone::aoe().format(instant)
}

/// Whole days until `instant`, rounded up; negative once the date has passed.
pub fn days_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff = instant.timestamp_millis() - now.timestamp_millis();
    let days = diff.div_euclid(MS_PER_DAY);
    if diff.rem_euclid(MS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

pub fn is_past(instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    instant < now
}

pub fn relative_label(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match days_until(instant, now) {
        0 if is_past(instant, now) => "earlier today".to_string(),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "1 day ago".to_string(),
        days if days > 1 => format!("in {days} days"),
        days => format!("{} days ago", -days),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        parse_instant(raw, None).expect("valid instant")
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let instant = at("2025-05-15");
        assert_eq!((instant.year(), instant.month(), instant.day()), (2025, 5, 15));
        assert_eq!(instant.hour(), 0);
    }

    #[test]
    fn naive_datetime_is_read_in_the_deadline_timezone() {
        let instant = parse_instant("2025-05-15T23:59:59", Some("AoE")).expect("instant");
        assert_eq!(instant, at("2025-05-16T11:59:59Z"));
    }

    #[test]
    fn explicit_offset_wins_over_timezone_label() {
        let instant = parse_instant("2025-05-15T12:00:00+02:00", Some("AoE")).expect("instant");
        assert_eq!(instant, at("2025-05-15T10:00:00Z"));
    }

    #[test]
    fn etc_gmt_sign_is_inverted() {
        assert_eq!(parse_timezone("Etc/GMT+12"), Some(Zone::aoe()));
        assert_eq!(
            parse_timezone("UTC+05:30"),
            FixedOffset::east_opt(5 * 3600 + 30 * 60).map(Zone::Fixed)
        );
        assert_eq!(
            parse_timezone("GMT-3"),
            FixedOffset::east_opt(-3 * 3600).map(Zone::Fixed)
        );
        assert_eq!(parse_timezone("UTC+99"), None);
        assert_eq!(parse_timezone("Mars/Olympus"), None);
        assert_eq!(parse_timezone("  "), None);
    }

    #[test]
    fn region_names_follow_daylight_saving() {
        assert_eq!(
            parse_timezone("America/New_York"),
            Some(Zone::Region(chrono_tz::America::New_York))
        );
        let summer = parse_instant("2026-05-15T23:59:59", Some("America/New_York"));
        assert_eq!(summer, Some(at("2026-05-16T03:59:59Z")));
        let winter = parse_instant("2026-01-15T12:00:00", Some("America/New_York"));
        assert_eq!(winter, Some(at("2026-01-15T17:00:00Z")));
        assert_ne!(summer, parse_instant("2026-05-15T23:59:59", None));
    }

    #[test]
    fn skipped_wall_clock_times_move_forward() {
        let instant = parse_instant("2026-03-08T02:30:00", Some("America/New_York"));
        assert_eq!(instant, Some(at("2026-03-08T07:30:00Z")));
    }

    #[test]
    fn region_formatting_uses_the_zone_abbreviation() {
        let zone = Zone::Region(chrono_tz::America::New_York);
        assert_eq!(
            zone.format(at("2026-05-16T03:59:00Z")),
            "May 15, 2026 11:59 PM EDT"
        );
    }

    #[test]
    fn malformed_strings_are_missing_not_errors() {
        assert_eq!(parse_instant("", None), None);
        assert_eq!(parse_instant("next tuesday", None), None);
        assert_eq!(parse_instant("2025-13-45", None), None);
        assert_eq!(parse_calendar_date("soon"), None);
    }

    #[test]
    fn calendar_date_keeps_the_written_day() {
        assert_eq!(
            parse_calendar_date("2025-01-01T00:30:00+02:00"),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
    }

    #[test]
    fn days_until_rounds_up() {
        let now = at("2025-05-01T12:00:00Z");
        assert_eq!(days_until(at("2025-05-02T12:00:00Z"), now), 1);
        assert_eq!(days_until(at("2025-05-02T13:00:00Z"), now), 2);
        assert_eq!(days_until(at("2025-04-30T00:00:00Z"), now), -1);
        assert!(is_past(at("2025-04-30"), now));
    }

    #[test]
    fn formats_dates_for_display() {
        assert_eq!(format_date(Some(at("2025-05-15"))), "May 15, 2025");
        assert_eq!(format_date(None), "TBA");
        assert_eq!(
            format_aoe(at("2025-05-16T11:59:00Z")),
            "May 15, 2025 11:59 PM AoE"
        );
    }

    #[test]
    fn relative_labels() {
        let now = at("2025-05-01T12:00:00Z");
        assert_eq!(relative_label(at("2025-05-01T18:00:00Z"), now), "tomorrow");
        assert_eq!(relative_label(at("2025-05-10T12:00:00Z"), now), "in 9 days");
        assert_eq!(relative_label(at("2025-04-28T12:00:00Z"), now), "3 days ago");
    }
}
