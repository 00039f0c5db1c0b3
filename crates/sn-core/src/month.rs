//! Month windows: half-open epoch-millisecond ranges for calendar months.
//!
//! The same local-time convention is used here and by the interval
//! reconstruction, so the two never disagree about which calendar day an
//! event belongs to.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone};

/// Returns the first day of `date`'s month.
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}

/// Returns the first day of the month after `date`'s month.
#[must_use]
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Computes the half-open `[start, end)` epoch-millisecond range covering
/// `reference`'s calendar month in the given time zone.
///
/// The start is local midnight of the 1st of the month; the end is local
/// midnight of the 1st of the following month. An event exactly at the end
/// boundary belongs to the next month's window, never both.
pub fn month_range<Tz: TimeZone>(reference: NaiveDate, tz: &Tz) -> (i64, i64) {
    (
        local_midnight_millis(first_of_month(reference), tz),
        local_midnight_millis(first_of_next_month(reference), tz),
    )
}

fn local_midnight_millis<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            // Midnight skipped by a DST transition: take the first valid
            // instant of the day instead.
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map_or_else(
            || midnight.and_utc().timestamp_millis(),
            |dt| dt.timestamp_millis(),
        )
}
