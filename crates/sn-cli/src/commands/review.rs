//! Implementation of the `sn review` command.
//!
//! The diary view of a month: stamps that carry free text, grouped by
//! day, optionally filtered to one kind. Stamps with blank text are
//! timeline noise here and are left out.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Datelike, Local, TimeZone};

use sn_core::OwnerId;
use sn_store::TimelineStore;

use super::util::{parse_kind, parse_month, resolve_note};

/// Print a month's diary entries, grouped by day.
pub async fn run<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    month: Option<&str>,
    kind: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    let reference = parse_month(month)?;
    let kind = kind.map(parse_kind).transpose()?;
    let note = resolve_note(store, owner, note).await?;
    let events = store
        .events_for_month(owner, &note.id, None, reference)
        .await?;

    let mut by_day: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    // Events arrive newest first; walk backwards for reading order.
    for stamp in events.iter().rev() {
        let text = stamp.note.trim();
        if text.is_empty() {
            continue;
        }
        if kind.is_some_and(|wanted| stamp.kind != wanted) {
            continue;
        }
        let Some(local) = Local.timestamp_millis_opt(stamp.timestamp).single() else {
            continue;
        };
        by_day.entry(local.day()).or_default().push(format!(
            "  {}  {}  {text}",
            local.format("%H:%M"),
            stamp.kind.label()
        ));
    }

    if by_day.is_empty() {
        println!("(no diary entries in {})", reference.format("%Y-%m"));
        return Ok(());
    }
    for (day, lines) in by_day {
        println!("{}-{day:02}", reference.format("%Y-%m"));
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}
