//! Implementation of the `sn import` command.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use sn_core::{OwnerId, parse_csv};
use sn_store::TimelineStore;

use super::util::resolve_note;

/// Import stamps from a CSV file into a note's timeline.
pub async fn run<S: TimelineStore>(
    store: &S,
    owner: &OwnerId,
    file: &Path,
    note: Option<&str>,
) -> Result<()> {
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("failed to open {}", file.display()))?,
    );
    let stamps = parse_csv(reader, &Local)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    let note = resolve_note(store, owner, note).await?;
    let written = store
        .save_events(owner, &note.id, &stamps)
        .await
        .context("import failed")?;
    println!("imported {written} stamps into {}", note.name);
    Ok(())
}
