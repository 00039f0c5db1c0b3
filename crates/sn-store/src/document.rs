//! Transport abstraction over the remote document store.
//!
//! The remote backend talks to its document database exclusively through
//! [`DocumentStore`], which captures the handful of primitives the store
//! contract needs: point reads, collection listing, ordered range queries
//! over the `timestamp` field, and atomic multi-document write batches.
//! The sync transport itself (wire protocol, auth, retries) lives behind
//! this trait and is out of scope here.

use serde_json::Value;
use thiserror::Error;

/// A document's fields.
pub type Document = serde_json::Map<String, Value>;

/// Per-batch write ceiling of the backing document store. A single atomic
/// batch may carry at most this many writes; larger logical operations are
/// split into multiple batches with no cross-batch atomicity.
pub const MAX_BATCH_WRITES: usize = 500;

/// A transient transport failure (network, backend unavailability).
#[derive(Debug, Clone, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single write within an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Create or fully replace the document at `path`.
    Set { path: String, fields: Document },
    /// Merge `fields` into the document at `path`, creating it if absent.
    /// Fields not named are left untouched.
    Merge { path: String, fields: Document },
    /// Delete the document at `path`. Deleting a missing document is a
    /// no-op.
    Delete { path: String },
}

/// A filtered, ordered query over one collection.
///
/// Ordering is always by the numeric `timestamp` field; documents without
/// one are excluded from query results.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Field equality filters: every listed `(field, value)` must match.
    pub equals: Vec<(String, String)>,
    /// Half-open `[start, end)` range over the `timestamp` field.
    pub timestamp_range: Option<(i64, i64)>,
    /// Sort newest-first instead of oldest-first.
    pub descending: bool,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

/// Primitive document-database operations the remote backend builds on.
///
/// A commit is atomic: either every write in the batch becomes visible or
/// none does. The batch size is capped at [`MAX_BATCH_WRITES`].
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Reads the document at `path`.
    async fn get(&self, path: &str) -> Result<Option<Document>, TransportError>;

    /// Returns `(document id, fields)` for every document directly in
    /// `collection`, in unspecified order.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, TransportError>;

    /// Runs `query` against `collection`.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, TransportError>;

    /// Atomically applies `batch`. Fails without side effects if the batch
    /// exceeds [`MAX_BATCH_WRITES`] or the transport is unavailable.
    async fn commit(&self, batch: Vec<WriteOp>) -> Result<(), TransportError>;
}

impl<T: DocumentStore> DocumentStore for &T {
    async fn get(&self, path: &str) -> Result<Option<Document>, TransportError> {
        (*self).get(path).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, TransportError> {
        (*self).list(collection).await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, TransportError> {
        (*self).query(collection, query).await
    }

    async fn commit(&self, batch: Vec<WriteOp>) -> Result<(), TransportError> {
        (*self).commit(batch).await
    }
}
