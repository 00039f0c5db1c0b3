//! Implementation of the `sn notes` subcommands.

use anyhow::{Context, Result};

use sn_core::{OwnerId, SharedId};
use sn_store::TimelineStore;

use super::util::{ensure_default_note, resolve_note};

/// List all notes.
pub async fn list<S: TimelineStore>(store: &S, owner: &OwnerId, json: bool) -> Result<()> {
    let notes = ensure_default_note(store, owner).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }
    for note in notes {
        match &note.shared_id {
            Some(shared) => println!("{}  {}  (shared: {shared})", note.id, note.name),
            None => println!("{}  {}", note.id, note.name),
        }
    }
    Ok(())
}

/// Create a note, optionally publishing it under a shared ID.
pub async fn create<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    name: &str,
    shared_id: Option<&str>,
) -> Result<()> {
    let shared_id = shared_id
        .map(SharedId::new)
        .transpose()
        .context("invalid shared ID")?;
    let note = store.create_note(owner, name, shared_id.as_ref()).await?;
    println!("created note {} ({})", note.name, note.id);
    Ok(())
}

/// Rename a note.
pub async fn rename<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    selector: &str,
    name: &str,
) -> Result<()> {
    let mut note = resolve_note(store, owner, Some(selector)).await?;
    let old = std::mem::replace(&mut note.name, name.to_string());
    store.update_note(&note).await?;
    println!("renamed {old} to {name}");
    Ok(())
}

/// Delete a note and everything on its timeline.
pub async fn delete<S: TimelineStore>(store: &S, owner: &OwnerId, selector: &str) -> Result<()> {
    let note = resolve_note(store, owner, Some(selector)).await?;
    store.delete_note(owner, &note.id).await?;
    println!("deleted note {}", note.name);
    Ok(())
}

/// Publish a note under a shared ID.
pub async fn share<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    selector: &str,
    shared_id: &str,
) -> Result<()> {
    let mut note = resolve_note(store, owner, Some(selector)).await?;
    note.shared_id = Some(SharedId::new(shared_id).context("invalid shared ID")?);
    store.update_note(&note).await?;
    println!("note {} is shared as {shared_id}", note.name);
    Ok(())
}

/// Withdraw a note's shared ID.
pub async fn unshare<S: TimelineStore>(store: &S, owner: &OwnerId, selector: &str) -> Result<()> {
    let mut note = resolve_note(store, owner, Some(selector)).await?;
    if note.shared_id.take().is_none() {
        println!("note {} is not shared", note.name);
        return Ok(());
    }
    store.update_note(&note).await?;
    println!("note {} is no longer shared", note.name);
    Ok(())
}
