//! Shared helpers for command implementations.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};

use sn_core::{Note, OwnerId, StampKind};
use sn_store::TimelineStore;

/// Name given to the note created on first use.
pub const DEFAULT_NOTE_NAME: &str = "ノート1";

/// Returns the owner's notes, creating the default note on first use so
/// every command has something to record into.
pub async fn ensure_default_note<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
) -> Result<Vec<Note>> {
    let notes = store.list_notes(owner).await?;
    if !notes.is_empty() {
        return Ok(notes);
    }
    let note = store.create_note(owner, DEFAULT_NOTE_NAME, None).await?;
    tracing::debug!(note_id = %note.id, "created default note");
    Ok(vec![note])
}

/// Resolves a note by name or ID; without a selector, picks the default
/// note if present, otherwise the first one.
pub async fn resolve_note<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    selector: Option<&str>,
) -> Result<Note> {
    let mut notes = ensure_default_note(store, owner).await?;
    match selector {
        Some(selector) => notes
            .into_iter()
            .find(|note| note.name == selector || note.id.as_str() == selector)
            .with_context(|| format!("no note matching '{selector}'")),
        None => {
            if let Some(index) = notes.iter().position(|note| note.name == DEFAULT_NOTE_NAME) {
                return Ok(notes.swap_remove(index));
            }
            notes.into_iter().next().context("no notes exist")
        }
    }
}

/// Parses a stamp kind from its stable identifier or display label.
pub fn parse_kind(input: &str) -> Result<StampKind> {
    input
        .parse()
        .ok()
        .or_else(|| StampKind::from_label(input))
        .with_context(|| format!("unknown stamp kind '{input}'"))
}

/// Parses a `YYYY-MM` month selector; defaults to the current month.
pub fn parse_month(input: Option<&str>) -> Result<NaiveDate> {
    let Some(input) = input else {
        return Ok(Local::now().date_naive());
    };
    let parsed = input.split_once('-').and_then(|(year, month)| {
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
    });
    parsed.with_context(|| format!("invalid month '{input}', expected YYYY-MM"))
}

/// Parses a local wall-clock time into epoch milliseconds; defaults to now.
pub fn parse_at(input: Option<&str>) -> Result<i64> {
    let Some(input) = input else {
        return Ok(Local::now().timestamp_millis());
    };
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
        .with_context(|| format!("unparseable time '{input}', expected YYYY-MM-DD HH:MM[:SS]"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.timestamp_millis())
        .with_context(|| format!("time '{input}' does not exist in the local time zone"))
}

/// Formats epoch milliseconds as local wall-clock time for display.
pub fn format_millis(timestamp: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp)
        .single()
        .map_or_else(
            || timestamp.to_string(),
            |local| local.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_by_id_and_label() {
        assert_eq!(parse_kind("SLEEP").unwrap(), StampKind::Sleep);
        assert_eq!(parse_kind("ねる").unwrap(), StampKind::Sleep);
        assert!(parse_kind("NAP").is_err());
    }

    #[test]
    fn month_selector_parses() {
        assert_eq!(
            parse_month(Some("2024-03")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_month(Some("2024")).is_err());
        assert!(parse_month(Some("2024-13")).is_err());
    }

    #[test]
    fn at_selector_accepts_both_precisions() {
        let with_seconds = parse_at(Some("2024-03-05 07:30:15")).unwrap();
        let without = parse_at(Some("2024-03-05 07:30")).unwrap();
        assert_eq!(with_seconds - without, 15_000);
        assert!(parse_at(Some("yesterday")).is_err());
    }
}
