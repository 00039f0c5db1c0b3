//! Implementation of the `sn graph` command.
//!
//! Prints the sleep intervals reconstructed from a month of sleep and
//! wake-up stamps, one line per day that has any.

use anyhow::Result;
use chrono::Local;

use sn_core::{OwnerId, reconstruct_sleep_intervals};
use sn_store::TimelineStore;

use super::util::{parse_month, resolve_note};

/// Print reconstructed sleep intervals for a month.
pub async fn run<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    month: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    let reference = parse_month(month)?;
    let note = resolve_note(store, owner, note).await?;
    let events = store
        .events_for_month(owner, &note.id, None, reference)
        .await?;
    let by_day = reconstruct_sleep_intervals(&events, reference, &Local);

    if by_day.is_empty() {
        println!("(no sleep recorded in {})", reference.format("%Y-%m"));
        return Ok(());
    }
    for (day, intervals) in by_day {
        let spans: Vec<String> = intervals
            .iter()
            .map(|interval| {
                format!(
                    "{}-{}",
                    format_minute(interval.start_minute),
                    format_minute(interval.end_minute)
                )
            })
            .collect();
        println!("{}-{day:02}  {}", reference.format("%Y-%m"), spans.join(", "));
    }
    Ok(())
}

fn format_minute(minute: f32) -> String {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "minutes of a day fit in u32 and are never negative"
    )]
    let total = minute.round() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_format_as_wall_clock() {
        assert_eq!(format_minute(0.0), "00:00");
        assert_eq!(format_minute(390.5), "06:31");
        assert_eq!(format_minute(1439.0), "23:59");
    }
}
