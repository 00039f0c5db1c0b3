//! In-memory [`DocumentStore`] implementation.
//!
//! Backs the remote store in tests and supports injecting transport
//! failures at a chosen commit, which is how the partial-success behavior
//! of chunked bulk saves gets exercised.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::document::{Document, DocumentStore, MAX_BATCH_WRITES, Query, TransportError, WriteOp};

/// An in-memory document database with atomic batch commits.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    docs: BTreeMap<String, Document>,
    committed: usize,
    fail_after: Option<usize>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every commit after the first `commits` successful ones fail
    /// with a transport error, leaving the store untouched.
    pub fn fail_commits_after(&self, commits: usize) {
        self.lock().fail_after = Some(commits);
    }

    /// Clears any injected failure.
    pub fn clear_failures(&self) {
        self.lock().fail_after = None;
    }

    /// Number of batches committed so far.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.lock().committed
    }

    /// Number of documents currently stored under `collection`.
    #[must_use]
    pub fn collection_len(&self, collection: &str) -> usize {
        let prefix = format!("{collection}/");
        self.lock()
            .docs
            .keys()
            .filter(|path| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/'))
            })
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, TransportError> {
        Ok(self.lock().docs.get(path).cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, TransportError> {
        let prefix = format!("{collection}/");
        Ok(self
            .lock()
            .docs
            .iter()
            .filter_map(|(path, fields)| {
                let id = path.strip_prefix(&prefix)?;
                if id.contains('/') {
                    return None;
                }
                Some((id.to_string(), fields.clone()))
            })
            .collect())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, TransportError> {
        let mut matches: Vec<(i64, Document)> = self
            .list(collection)
            .await?
            .into_iter()
            .filter_map(|(_, fields)| {
                let timestamp = fields.get("timestamp").and_then(Value::as_i64)?;
                Some((timestamp, fields))
            })
            .filter(|(timestamp, fields)| {
                if let Some((start, end)) = query.timestamp_range {
                    if *timestamp < start || *timestamp >= end {
                        return false;
                    }
                }
                query.equals.iter().all(|(field, value)| {
                    fields.get(field).and_then(Value::as_str) == Some(value)
                })
            })
            .collect();

        matches.sort_by_key(|(timestamp, _)| *timestamp);
        if query.descending {
            matches.reverse();
        }
        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }
        Ok(matches.into_iter().map(|(_, fields)| fields).collect())
    }

    async fn commit(&self, batch: Vec<WriteOp>) -> Result<(), TransportError> {
        if batch.len() > MAX_BATCH_WRITES {
            return Err(TransportError::new(format!(
                "batch of {} writes exceeds the {MAX_BATCH_WRITES}-write ceiling",
                batch.len()
            )));
        }

        let mut inner = self.lock();
        if inner.fail_after.is_some_and(|after| inner.committed >= after) {
            return Err(TransportError::new("injected transport failure"));
        }

        for op in batch {
            match op {
                WriteOp::Set { path, fields } => {
                    inner.docs.insert(path, fields);
                }
                WriteOp::Merge { path, fields } => {
                    let doc = inner.docs.entry(path).or_default();
                    for (key, value) in fields {
                        doc.insert(key, value);
                    }
                }
                WriteOp::Delete { path } => {
                    inner.docs.remove(&path);
                }
            }
        }
        inner.committed += 1;
        Ok(())
    }
}
