//! Implementation of the `sn stamp` subcommands.

use anyhow::Result;

use sn_core::OwnerId;
use sn_store::TimelineStore;

use super::util::{format_millis, parse_at, parse_kind, resolve_note};

/// Record a stamp.
pub async fn add<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    kind: &str,
    text: &str,
    at: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let timestamp = parse_at(at)?;
    let note = resolve_note(store, owner, note).await?;
    store
        .save_event(owner, &note.id, kind, text, timestamp)
        .await?;
    println!(
        "{} recorded at {} ({timestamp})",
        kind.label(),
        format_millis(timestamp)
    );
    Ok(())
}

/// Show the stamp at an exact timestamp.
pub async fn show<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    timestamp: i64,
    note: Option<&str>,
) -> Result<()> {
    let note = resolve_note(store, owner, note).await?;
    match store.event(owner, &note.id, timestamp).await? {
        Some(stamp) => {
            println!("time:     {}", format_millis(stamp.timestamp));
            println!("kind:     {} ({})", stamp.kind.label(), stamp.kind);
            println!("text:     {}", stamp.note);
            if let Some(operator) = &stamp.operator {
                println!("operator: {operator}");
            }
        }
        None => println!("no stamp at {timestamp}"),
    }
    Ok(())
}

/// Delete the stamp at an exact timestamp.
pub async fn delete<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    timestamp: i64,
    note: Option<&str>,
) -> Result<()> {
    let note = resolve_note(store, owner, note).await?;
    store.delete_event(owner, &note.id, timestamp).await?;
    println!("deleted stamp at {}", format_millis(timestamp));
    Ok(())
}

/// Suggest recent free texts for a stamp kind.
pub async fn suggest<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    kind: &str,
    note: Option<&str>,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let note = resolve_note(store, owner, note).await?;
    let suggestions = store.note_suggestions(owner, &note.id, kind).await?;
    if suggestions.is_empty() {
        println!("(no suggestions)");
        return Ok(());
    }
    for text in suggestions {
        println!("{text}");
    }
    Ok(())
}
