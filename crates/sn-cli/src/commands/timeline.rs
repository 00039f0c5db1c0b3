//! Implementation of the `sn timeline` command.

use anyhow::Result;

use sn_core::OwnerId;
use sn_store::TimelineStore;

use super::util::{format_millis, parse_month, resolve_note};

/// Print one month of stamps, newest first.
pub async fn run<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    month: Option<&str>,
    note: Option<&str>,
    json: bool,
) -> Result<()> {
    let reference = parse_month(month)?;
    let note = resolve_note(store, owner, note).await?;
    let events = store
        .events_for_month(owner, &note.id, None, reference)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }
    if events.is_empty() {
        println!("(no stamps in {})", reference.format("%Y-%m"));
        return Ok(());
    }
    for stamp in events {
        let mut line = format!(
            "{}  {}  {}",
            format_millis(stamp.timestamp),
            stamp.kind.label(),
            stamp.note
        );
        if let Some(operator) = &stamp.operator {
            line.push_str(&format!("  ({operator})"));
        }
        println!("{}", line.trim_end());
    }
    Ok(())
}
