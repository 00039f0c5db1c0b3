//! Timeline storage backends for the stamp notebook.
//!
//! The [`TimelineStore`] trait is the contract every backend satisfies:
//! note CRUD, month-scoped event queries, bulk writes, and shared-note
//! subscription management. Two backends are provided:
//!
//! - [`LocalStore`]: an on-device key-value store backed by `rusqlite`,
//!   single-process, no network. Subscription operations are no-ops that
//!   return empty results; callers treat "no subscriptions" as a valid
//!   state, not a failure.
//! - [`RemoteStore`]: a concurrent document store reached through the
//!   [`DocumentStore`] transport trait. Atomic multi-document batches are
//!   its only consistency primitive; bulk saves are chunked to the batch
//!   ceiling with no cross-chunk atomicity.
//!
//! Which backend a caller constructs is an external decision (signed-in vs.
//! local-only); nothing downstream branches on the choice.
//!
//! # Failure semantics
//!
//! Any operation may fail with a transient I/O error. No operation retries
//! internally, and no operation mutates caller-visible state on failure,
//! with one documented exception: a multi-chunk bulk save that fails midway
//! leaves earlier chunks committed and reports how far it got via
//! [`StoreError::BatchInterrupted`].

use chrono::NaiveDate;
use thiserror::Error;

use sn_core::{Note, NoteId, OwnerId, SharedId, SharedNoteInfo, StampKind, StampRecord};

pub mod document;
pub mod local;
pub mod memory;
pub mod remote;

pub use document::{Document, DocumentStore, MAX_BATCH_WRITES, Query, TransportError, WriteOp};
pub use local::LocalStore;
pub use memory::MemoryDocumentStore;
pub use remote::RemoteStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the local database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A transport failure talking to the remote document store.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The referenced note does not exist.
    #[error("note {note_id} not found")]
    NoteNotFound { note_id: String },
    /// An identifier failed validation.
    #[error(transparent)]
    Validation(#[from] sn_core::ValidationError),
    /// A stored record could not be encoded or decoded.
    #[error("failed to encode record")]
    Encoding(#[from] serde_json::Error),
    /// A chunked bulk save failed partway through. Chunks committed before
    /// the failure stay committed; `written` counts their records.
    #[error("bulk save interrupted after {written} records were committed")]
    BatchInterrupted {
        written: usize,
        #[source]
        source: Box<StoreError>,
    },
}

/// CRUD and range-query contract over stamps scoped to a note.
///
/// Within one note's timeline, `timestamp` is the primary key: stores
/// support exact-key lookup, deletion by key, and half-open range queries
/// over it. All operations are async; none retries internally.
#[allow(async_fn_in_trait)]
pub trait TimelineStore {
    /// Returns all notes owned by `owner`. Order is unspecified and not
    /// stable across calls.
    async fn list_notes(&self, owner: &OwnerId) -> Result<Vec<Note>, StoreError>;

    /// Allocates a fresh note. When `shared_id` is given, the shared-note
    /// registration is created together with the note: afterwards either
    /// both exist or neither does.
    async fn create_note(
        &self,
        owner: &OwnerId,
        name: &str,
        shared_id: Option<&SharedId>,
    ) -> Result<Note, StoreError>;

    /// Renames a note and/or changes its shared ID. A removed or replaced
    /// shared ID has its old registration deleted (tolerating prior
    /// deletion); a new shared ID gets a fresh registration. Never leaves a
    /// registration pointing at a note whose shared ID no longer matches.
    async fn update_note(&self, note: &Note) -> Result<(), StoreError>;

    /// Deletes the note, all its stamps, and its shared-note registration
    /// (if any) as one logical unit.
    async fn delete_note(&self, owner: &OwnerId, note_id: &NoteId) -> Result<(), StoreError>;

    /// Returns the note's stamps within `reference`'s calendar month,
    /// sorted by timestamp descending.
    async fn events_for_month(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        shared_id: Option<&SharedId>,
        reference: NaiveDate,
    ) -> Result<Vec<StampRecord>, StoreError>;

    /// Returns every stamp of the note, ascending by timestamp. Unbounded;
    /// used only by export.
    async fn all_events(&self, owner: &OwnerId, note_id: &NoteId)
    -> Result<Vec<StampRecord>, StoreError>;

    /// Exact-key lookup by timestamp.
    async fn event(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        timestamp: i64,
    ) -> Result<Option<StampRecord>, StoreError>;

    /// The most recent distinct non-empty note texts for stamps of `kind`,
    /// most recent first, capped at 10, looking back over at most the last
    /// 100 stamps of that kind.
    async fn note_suggestions(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        kind: StampKind,
    ) -> Result<Vec<String>, StoreError>;

    /// Upsert by timestamp: overwrites kind and note text if a stamp
    /// already exists at that exact millisecond.
    async fn save_event(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        kind: StampKind,
        note: &str,
        timestamp: i64,
    ) -> Result<(), StoreError>;

    /// Bulk upsert, chunked to the backend's per-batch ceiling. Returns the
    /// number of records written; see [`StoreError::BatchInterrupted`] for
    /// the partial-success outcome.
    async fn save_events(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        batch: &[StampRecord],
    ) -> Result<usize, StoreError>;

    /// Deletes the stamp at `timestamp`. Deleting a missing stamp is a
    /// no-op.
    async fn delete_event(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        timestamp: i64,
    ) -> Result<(), StoreError>;

    /// Adds `shared_id` to the caller's subscription set. Idempotent.
    async fn subscribe(&self, owner: &OwnerId, shared_id: &SharedId) -> Result<(), StoreError>;

    /// Removes `shared_id` from the caller's subscription set. Idempotent.
    async fn unsubscribe(&self, owner: &OwnerId, shared_id: &SharedId) -> Result<(), StoreError>;

    /// The caller's subscription set. A subscription may be dangling (its
    /// shared ID no longer resolves); that is represented by
    /// [`TimelineStore::resolve_shared_note`] returning `None`, not by an
    /// error here.
    async fn subscriptions(&self, owner: &OwnerId) -> Result<Vec<SharedId>, StoreError>;

    /// Resolves a shared ID into the note it points at, if it still exists.
    async fn resolve_shared_note(
        &self,
        shared_id: &SharedId,
    ) -> Result<Option<SharedNoteInfo>, StoreError>;
}
