//! Sleep interval reconstruction from SLEEP/WAKE_UP point events.
//!
//! Turns an unordered bag of point events into day-bounded, possibly
//! unclosed intervals for chart rendering. Intervals are derived, never
//! persisted: they are recomputed on every read from the underlying stamps.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike};

use crate::month::first_of_month;
use crate::stamp::{StampKind, StampRecord};

/// End minute used when a sleep was never closed by a WAKE_UP (23:59).
const END_OF_DAY_MINUTE: f32 = 1439.0;

/// A reconstructed sleep segment, as minutes of the local day.
///
/// A closed interval whose sleep started before midnight carries a
/// `start_minute` greater than its `end_minute`; the interval is attributed
/// to the wake day as a single segment rather than split across midnight.
/// An unclosed interval ends at minute 1439 of its own day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepInterval {
    pub start_minute: f32,
    pub end_minute: f32,
}

/// Reconstructs sleep intervals for one calendar month.
///
/// Scans SLEEP/WAKE_UP events in ascending timestamp order, tracking a
/// single pending open sleep:
///
/// - SLEEP while a sleep is already pending closes the pending one as an
///   unclosed interval on its own day, then becomes the new pending sleep.
/// - WAKE_UP closes the pending sleep as an interval attributed to the
///   wake day. With no pending sleep, the wake closes an implicit sleep
///   that began at midnight of the wake day.
/// - A pending sleep left at end of scan becomes an unclosed interval.
///
/// The result maps day-of-month to that day's intervals; days with no
/// SLEEP/WAKE_UP activity are absent from the map, so callers distinguish
/// "no data" by map membership, not list emptiness. Intervals attributed
/// to a day outside `month` are dropped.
///
/// Deterministic and idempotent for a fixed event set.
pub fn reconstruct_sleep_intervals<Tz: TimeZone>(
    events: &[StampRecord],
    month: NaiveDate,
    tz: &Tz,
) -> BTreeMap<u32, Vec<SleepInterval>> {
    let mut sleep_wake: Vec<&StampRecord> = events
        .iter()
        .filter(|stamp| matches!(stamp.kind, StampKind::Sleep | StampKind::WakeUp))
        .collect();
    sleep_wake.sort_by_key(|stamp| stamp.timestamp);

    let month = first_of_month(month);
    let mut intervals: BTreeMap<u32, Vec<SleepInterval>> = BTreeMap::new();
    let mut pending: Option<DateTime<Tz>> = None;

    for stamp in sleep_wake {
        let Some(local) = local_datetime(stamp.timestamp, tz) else {
            tracing::debug!(timestamp = stamp.timestamp, "timestamp outside calendar range, skipping");
            continue;
        };
        match stamp.kind {
            StampKind::Sleep => {
                if let Some(open) = pending.take() {
                    emit(&mut intervals, month, &open, unclosed(&open));
                }
                pending = Some(local);
            }
            StampKind::WakeUp => {
                let start_minute = pending
                    .take()
                    .map_or(0.0, |open| minute_of_day(&open));
                emit(
                    &mut intervals,
                    month,
                    &local,
                    SleepInterval {
                        start_minute,
                        end_minute: minute_of_day(&local),
                    },
                );
            }
            _ => {}
        }
    }

    if let Some(open) = pending {
        emit(&mut intervals, month, &open, unclosed(&open));
    }

    intervals
}

fn unclosed<Tz: TimeZone>(open: &DateTime<Tz>) -> SleepInterval {
    SleepInterval {
        start_minute: minute_of_day(open),
        end_minute: END_OF_DAY_MINUTE,
    }
}

fn emit<Tz: TimeZone>(
    intervals: &mut BTreeMap<u32, Vec<SleepInterval>>,
    month: NaiveDate,
    day: &DateTime<Tz>,
    interval: SleepInterval,
) {
    if day.year() == month.year() && day.month() == month.month() {
        intervals.entry(day.day()).or_default().push(interval);
    }
}

fn local_datetime<Tz: TimeZone>(timestamp_millis: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(timestamp_millis).single()
}

#[expect(
    clippy::cast_precision_loss,
    reason = "minute of day is at most 1439, exactly representable"
)]
fn minute_of_day<Tz: TimeZone>(dt: &DateTime<Tz>) -> f32 {
    (dt.hour() * 60 + dt.minute()) as f32
}
