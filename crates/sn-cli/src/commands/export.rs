//! Implementation of the `sn export` command.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use sn_core::{OwnerId, export_csv};
use sn_store::TimelineStore;

use super::util::resolve_note;

/// Export a note's full timeline as CSV, to a file or stdout.
pub async fn run<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    note: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let note = resolve_note(store, owner, note).await?;
    let events = store.all_events(owner, &note.id).await?;
    let csv = export_csv(&events, &Local);

    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("exported {} stamps to {}", events.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(csv.as_bytes())?;
        }
    }
    Ok(())
}
