//! Implementation of the `sn subs` subcommands.

use anyhow::{Context, Result};

use sn_core::{OwnerId, SharedId};
use sn_store::TimelineStore;

/// Subscribe to a shared note.
pub async fn subscribe<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    shared_id: &str,
) -> Result<()> {
    let shared_id = SharedId::new(shared_id).context("invalid shared ID")?;
    store.subscribe(owner, &shared_id).await?;
    println!("subscribed to {shared_id}");
    Ok(())
}

/// Unsubscribe from a shared note.
pub async fn unsubscribe<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    shared_id: &str,
) -> Result<()> {
    let shared_id = SharedId::new(shared_id).context("invalid shared ID")?;
    store.unsubscribe(owner, &shared_id).await?;
    println!("unsubscribed from {shared_id}");
    Ok(())
}

/// List subscriptions, resolving each to its note where possible.
pub async fn list<S: TimelineStore>(store: &S, owner: &OwnerId) -> Result<()> {
    let subscriptions = store.subscriptions(owner).await?;
    if subscriptions.is_empty() {
        println!("(no subscriptions)");
        return Ok(());
    }
    for shared_id in subscriptions {
        match store.resolve_shared_note(&shared_id).await? {
            Some(info) => println!("{shared_id}  {} (owner {})", info.note_name, info.owner_id),
            None => println!("{shared_id}  (no longer shared)"),
        }
    }
    Ok(())
}
