//! Calendar-day utilities for the engagement engine
//!
//! Day rollover (streaks, daily challenges) is evaluated lazily by comparing
//! calendar dates in the caller's time zone, never by timers.
//! - Day tags: "YYYY-MM-DD" strings persisted next to daily records
//! - Next midnight: expiry stamp for the current day's challenges

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone};

/// Format used for persisted day tags.
pub const DAY_TAG_FORMAT: &str = "%Y-%m-%d";

/// Calendar date of `now` in its own time zone.
pub fn calendar_date<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

/// Day tag string for a calendar date.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use khata_engage::engage::calendar::day_tag;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(day_tag(date), "2024-03-09");
/// ```
pub fn day_tag(date: NaiveDate) -> String {
    date.format(DAY_TAG_FORMAT).to_string()
}

/// Parse a day tag back into a date. Returns `None` for malformed tags.
pub fn parse_day_tag(tag: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(tag, DAY_TAG_FORMAT).ok()
}

/// The calendar day before `date`.
pub fn yesterday(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// The next local midnight after `now`, in `now`'s time zone.
///
/// If midnight does not exist locally (a DST gap), the first valid instant
/// after it is used; as a last resort `now + 24h`.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<FixedOffset> {
    let fallback = now.fixed_offset() + Duration::hours(24);
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return fallback;
    };
    let Some(midnight) = tomorrow.and_hms_opt(0, 0, 0) else {
        return fallback;
    };

    let tz = now.timezone();
    if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
        return dt.fixed_offset();
    }
    // DST gaps are at most a couple of hours
    (1..=3)
        .filter_map(|h| {
            tz.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .map(|dt| dt.fixed_offset())
        .next()
        .unwrap_or(fallback)
}

/// Parse a persisted RFC 3339 timestamp and return its calendar date in the
/// time zone of `reference`. Unparseable input yields `None`.
pub fn stored_calendar_date<Tz: TimeZone>(stored: &str, reference: &DateTime<Tz>) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(stored)
        .ok()
        .map(|dt| dt.with_timezone(&reference.timezone()).date_naive())
}
