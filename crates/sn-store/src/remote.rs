//! Remote backend over a concurrent document store.
//!
//! Documents are laid out hierarchically: `users/{owner}` holds the
//! subscription set, `users/{owner}/notes/{note}` the note metadata,
//! `users/{owner}/notes/{note}/timeline/{timestamp}` one document per
//! stamp (the timestamp doubles as the document ID, which is what makes
//! saves upserts), and `sharedNotes/{shared}` the registration that lets
//! other users resolve a shared ID back to its note.
//!
//! Atomic multi-document batches are the only consistency primitive the
//! transport offers, so anything that must hold together (note creation
//! with its shared registration, a shared-ID swap) goes into a single
//! batch. Bulk saves are chunked at [`MAX_BATCH_WRITES`] with no
//! cross-chunk atomicity; a mid-save failure is reported as
//! [`StoreError::BatchInterrupted`] with the committed count.

use chrono::{NaiveDate, TimeZone};
use serde_json::Value;
use uuid::Uuid;

use sn_core::{Note, NoteId, OwnerId, SharedId, SharedNoteInfo, StampKind, StampRecord, month_range};

use crate::document::{Document, DocumentStore, MAX_BATCH_WRITES, Query, WriteOp};
use crate::{StoreError, TimelineStore};

const FIELD_ITEM_TYPE: &str = "itemType";
const FIELD_TIMESTAMP: &str = "timestamp";
const FIELD_KIND: &str = "type";
const FIELD_NOTE_TEXT: &str = "note";
const FIELD_OPERATOR: &str = "operatorName";
const FIELD_NAME: &str = "name";
const FIELD_SHARED_ID: &str = "sharedId";
const FIELD_OWNER_ID: &str = "ownerId";
const FIELD_NOTE_ID: &str = "noteId";
const FIELD_NOTE_NAME: &str = "noteName";
const FIELD_SUBSCRIBED: &str = "subscribedNoteIds";

/// Discriminator for timeline documents; lets other item types share the
/// collection later without breaking stamp queries.
const STAMP_ITEM_TYPE: &str = "stamp";

/// [`TimelineStore`] backed by a remote document database.
///
/// `tz` fixes the local-time convention for month windows. An operator
/// display name, when set, is attached to every interactively saved stamp
/// so members of a shared note can see who recorded what.
pub struct RemoteStore<D, Tz> {
    docs: D,
    tz: Tz,
    operator: Option<String>,
}

impl<D: DocumentStore, Tz: TimeZone> RemoteStore<D, Tz> {
    pub const fn new(docs: D, tz: Tz) -> Self {
        Self {
            docs,
            tz,
            operator: None,
        }
    }

    /// Sets the operator name attached to stamps saved through
    /// [`TimelineStore::save_event`]. Bulk saves keep each record's own
    /// attribution instead.
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    async fn subscription_strings(&self, owner: &OwnerId) -> Result<Vec<String>, StoreError> {
        let doc = self.docs.get(&user_doc(owner)).await?;
        Ok(doc
            .as_ref()
            .and_then(|fields| fields.get(FIELD_SUBSCRIBED))
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn write_subscriptions(
        &self,
        owner: &OwnerId,
        ids: Vec<String>,
    ) -> Result<(), StoreError> {
        let mut fields = Document::new();
        fields.insert(FIELD_SUBSCRIBED.to_string(), Value::from(ids));
        self.docs
            .commit(vec![WriteOp::Merge {
                path: user_doc(owner),
                fields,
            }])
            .await?;
        Ok(())
    }
}

impl<D: DocumentStore, Tz: TimeZone> TimelineStore for RemoteStore<D, Tz> {
    async fn list_notes(&self, owner: &OwnerId) -> Result<Vec<Note>, StoreError> {
        let docs = self.docs.list(&notes_collection(owner)).await?;
        Ok(docs
            .into_iter()
            .filter_map(|(id, fields)| {
                let note = parse_note(owner, &id, &fields);
                if note.is_none() {
                    tracing::debug!(note_id = id, "skipping malformed note document");
                }
                note
            })
            .collect())
    }

    async fn create_note(
        &self,
        owner: &OwnerId,
        name: &str,
        shared_id: Option<&SharedId>,
    ) -> Result<Note, StoreError> {
        let note = Note {
            id: NoteId::new(Uuid::new_v4().to_string())?,
            name: name.to_string(),
            owner_id: owner.clone(),
            shared_id: shared_id.cloned(),
        };

        let mut batch = vec![WriteOp::Set {
            path: note_doc(owner, &note.id),
            fields: note_fields(&note),
        }];
        if let Some(shared) = shared_id {
            batch.push(WriteOp::Set {
                path: shared_doc(shared.as_str()),
                fields: shared_fields(&note),
            });
        }
        self.docs.commit(batch).await?;
        Ok(note)
    }

    async fn update_note(&self, note: &Note) -> Result<(), StoreError> {
        let path = note_doc(&note.owner_id, &note.id);
        let Some(previous) = self.docs.get(&path).await? else {
            return Err(StoreError::NoteNotFound {
                note_id: note.id.to_string(),
            });
        };
        let old_shared = previous
            .get(FIELD_SHARED_ID)
            .and_then(Value::as_str)
            .map(str::to_string);
        let new_shared = note.shared_id.as_ref().map(SharedId::as_str);

        let mut batch = Vec::new();
        if let Some(old) = old_shared.as_deref() {
            // Deleting a missing registration is a no-op, so a registration
            // someone already cleaned up does not fail the update.
            if Some(old) != new_shared {
                batch.push(WriteOp::Delete {
                    path: shared_doc(old),
                });
            }
        }
        if let Some(shared) = &note.shared_id {
            batch.push(WriteOp::Set {
                path: shared_doc(shared.as_str()),
                fields: shared_fields(note),
            });
        }
        batch.push(WriteOp::Set {
            path,
            fields: note_fields(note),
        });
        self.docs.commit(batch).await?;
        Ok(())
    }

    async fn delete_note(&self, owner: &OwnerId, note_id: &NoteId) -> Result<(), StoreError> {
        let note_path = note_doc(owner, note_id);
        let shared = self
            .docs
            .get(&note_path)
            .await?
            .as_ref()
            .and_then(|fields| fields.get(FIELD_SHARED_ID).and_then(Value::as_str))
            .map(str::to_string);

        let timeline = timeline_collection(owner, note_id);
        let mut ops: Vec<WriteOp> = self
            .docs
            .list(&timeline)
            .await?
            .into_iter()
            .map(|(id, _)| WriteOp::Delete {
                path: format!("{timeline}/{id}"),
            })
            .collect();
        if let Some(shared) = shared {
            ops.push(WriteOp::Delete {
                path: shared_doc(&shared),
            });
        }
        // The note document goes last so an interrupted cascade leaves the
        // note visible rather than orphaning its remaining stamps.
        ops.push(WriteOp::Delete { path: note_path });

        for chunk in chunked(ops) {
            self.docs.commit(chunk).await?;
        }
        Ok(())
    }

    async fn events_for_month(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        shared_id: Option<&SharedId>,
        reference: NaiveDate,
    ) -> Result<Vec<StampRecord>, StoreError> {
        let timeline = match shared_id {
            // A subscribed note is read through its registration; a dangling
            // subscription yields an empty month, not an error.
            Some(shared) => match self.resolve_shared_note(shared).await? {
                Some(info) => timeline_collection(&info.owner_id, &info.note_id),
                None => return Ok(Vec::new()),
            },
            None => timeline_collection(owner, note_id),
        };

        let (start, end) = month_range(reference, &self.tz);
        let docs = self
            .docs
            .query(
                &timeline,
                &Query {
                    equals: vec![(FIELD_ITEM_TYPE.to_string(), STAMP_ITEM_TYPE.to_string())],
                    timestamp_range: Some((start, end)),
                    descending: true,
                    limit: None,
                },
            )
            .await?;
        Ok(parse_stamps(docs))
    }

    async fn all_events(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
    ) -> Result<Vec<StampRecord>, StoreError> {
        let docs = self
            .docs
            .query(
                &timeline_collection(owner, note_id),
                &Query {
                    equals: vec![(FIELD_ITEM_TYPE.to_string(), STAMP_ITEM_TYPE.to_string())],
                    ..Query::default()
                },
            )
            .await?;
        Ok(parse_stamps(docs))
    }

    async fn event(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        timestamp: i64,
    ) -> Result<Option<StampRecord>, StoreError> {
        let doc = self.docs.get(&stamp_doc(owner, note_id, timestamp)).await?;
        Ok(doc.as_ref().and_then(parse_stamp))
    }

    async fn note_suggestions(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        kind: StampKind,
    ) -> Result<Vec<String>, StoreError> {
        let docs = self
            .docs
            .query(
                &timeline_collection(owner, note_id),
                &Query {
                    equals: vec![
                        (FIELD_ITEM_TYPE.to_string(), STAMP_ITEM_TYPE.to_string()),
                        (FIELD_KIND.to_string(), kind.as_str().to_string()),
                    ],
                    timestamp_range: None,
                    descending: true,
                    limit: Some(100),
                },
            )
            .await?;

        let mut suggestions: Vec<String> = Vec::new();
        for stamp in parse_stamps(docs) {
            let text = stamp.note.trim();
            if text.is_empty() || suggestions.iter().any(|seen| seen == text) {
                continue;
            }
            suggestions.push(text.to_string());
            if suggestions.len() == 10 {
                break;
            }
        }
        Ok(suggestions)
    }

    async fn save_event(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        kind: StampKind,
        note: &str,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.docs
            .commit(vec![WriteOp::Set {
                path: stamp_doc(owner, note_id, timestamp),
                fields: stamp_fields(timestamp, kind, note, self.operator.as_deref()),
            }])
            .await?;
        Ok(())
    }

    async fn save_events(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        batch: &[StampRecord],
    ) -> Result<usize, StoreError> {
        let timeline = timeline_collection(owner, note_id);
        let mut written = 0usize;
        for chunk in batch.chunks(MAX_BATCH_WRITES) {
            let ops = chunk
                .iter()
                .map(|stamp| WriteOp::Set {
                    path: format!("{timeline}/{}", stamp.timestamp),
                    fields: stamp_fields(
                        stamp.timestamp,
                        stamp.kind,
                        &stamp.note,
                        stamp.operator.as_deref(),
                    ),
                })
                .collect();
            if let Err(err) = self.docs.commit(ops).await {
                return Err(StoreError::BatchInterrupted {
                    written,
                    source: Box::new(StoreError::Transport(err)),
                });
            }
            written += chunk.len();
        }
        Ok(written)
    }

    async fn delete_event(
        &self,
        owner: &OwnerId,
        note_id: &NoteId,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.docs
            .commit(vec![WriteOp::Delete {
                path: stamp_doc(owner, note_id, timestamp),
            }])
            .await?;
        Ok(())
    }

    async fn subscribe(&self, owner: &OwnerId, shared_id: &SharedId) -> Result<(), StoreError> {
        let mut ids = self.subscription_strings(owner).await?;
        if ids.iter().any(|id| id == shared_id.as_str()) {
            return Ok(());
        }
        ids.push(shared_id.to_string());
        self.write_subscriptions(owner, ids).await
    }

    async fn unsubscribe(&self, owner: &OwnerId, shared_id: &SharedId) -> Result<(), StoreError> {
        let mut ids = self.subscription_strings(owner).await?;
        let before = ids.len();
        ids.retain(|id| id != shared_id.as_str());
        if ids.len() == before {
            return Ok(());
        }
        self.write_subscriptions(owner, ids).await
    }

    async fn subscriptions(&self, owner: &OwnerId) -> Result<Vec<SharedId>, StoreError> {
        Ok(self
            .subscription_strings(owner)
            .await?
            .into_iter()
            .filter_map(|id| SharedId::new(id).ok())
            .collect())
    }

    async fn resolve_shared_note(
        &self,
        shared_id: &SharedId,
    ) -> Result<Option<SharedNoteInfo>, StoreError> {
        let Some(fields) = self.docs.get(&shared_doc(shared_id.as_str())).await? else {
            return Ok(None);
        };
        let info = (|| {
            Some(SharedNoteInfo {
                note_id: NoteId::new(fields.get(FIELD_NOTE_ID)?.as_str()?).ok()?,
                owner_id: OwnerId::new(fields.get(FIELD_OWNER_ID)?.as_str()?).ok()?,
                note_name: fields.get(FIELD_NOTE_NAME)?.as_str()?.to_string(),
            })
        })();
        if info.is_none() {
            tracing::debug!(
                shared_id = shared_id.as_str(),
                "shared-note registration is incomplete, treating as unresolved"
            );
        }
        Ok(info)
    }
}

fn user_doc(owner: &OwnerId) -> String {
    format!("users/{owner}")
}

fn notes_collection(owner: &OwnerId) -> String {
    format!("users/{owner}/notes")
}

fn note_doc(owner: &OwnerId, note_id: &NoteId) -> String {
    format!("users/{owner}/notes/{note_id}")
}

fn timeline_collection(owner: &OwnerId, note_id: &NoteId) -> String {
    format!("users/{owner}/notes/{note_id}/timeline")
}

fn stamp_doc(owner: &OwnerId, note_id: &NoteId, timestamp: i64) -> String {
    format!("users/{owner}/notes/{note_id}/timeline/{timestamp}")
}

fn shared_doc(shared_id: &str) -> String {
    format!("sharedNotes/{shared_id}")
}

fn note_fields(note: &Note) -> Document {
    let mut fields = Document::new();
    fields.insert(FIELD_NAME.to_string(), Value::from(note.name.clone()));
    if let Some(shared) = &note.shared_id {
        fields.insert(FIELD_SHARED_ID.to_string(), Value::from(shared.as_str()));
    }
    fields
}

fn shared_fields(note: &Note) -> Document {
    let mut fields = Document::new();
    fields.insert(
        FIELD_OWNER_ID.to_string(),
        Value::from(note.owner_id.as_str()),
    );
    fields.insert(FIELD_NOTE_ID.to_string(), Value::from(note.id.as_str()));
    fields.insert(FIELD_NOTE_NAME.to_string(), Value::from(note.name.clone()));
    fields
}

fn stamp_fields(timestamp: i64, kind: StampKind, note: &str, operator: Option<&str>) -> Document {
    let mut fields = Document::new();
    fields.insert(FIELD_ITEM_TYPE.to_string(), Value::from(STAMP_ITEM_TYPE));
    fields.insert(FIELD_TIMESTAMP.to_string(), Value::from(timestamp));
    fields.insert(FIELD_KIND.to_string(), Value::from(kind.as_str()));
    fields.insert(FIELD_NOTE_TEXT.to_string(), Value::from(note));
    if let Some(operator) = operator {
        fields.insert(FIELD_OPERATOR.to_string(), Value::from(operator));
    }
    fields
}

fn parse_note(owner: &OwnerId, id: &str, fields: &Document) -> Option<Note> {
    Some(Note {
        id: NoteId::new(id).ok()?,
        name: fields.get(FIELD_NAME)?.as_str()?.to_string(),
        owner_id: owner.clone(),
        shared_id: fields
            .get(FIELD_SHARED_ID)
            .and_then(Value::as_str)
            .and_then(|shared| SharedId::new(shared).ok()),
    })
}

fn parse_stamp(fields: &Document) -> Option<StampRecord> {
    if fields.get(FIELD_ITEM_TYPE).and_then(Value::as_str) != Some(STAMP_ITEM_TYPE) {
        return None;
    }
    Some(StampRecord {
        timestamp: fields.get(FIELD_TIMESTAMP)?.as_i64()?,
        kind: fields.get(FIELD_KIND)?.as_str()?.parse().ok()?,
        note: fields
            .get(FIELD_NOTE_TEXT)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        operator: fields
            .get(FIELD_OPERATOR)
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn parse_stamps(docs: Vec<Document>) -> Vec<StampRecord> {
    docs.iter()
        .filter_map(|fields| {
            let stamp = parse_stamp(fields);
            if stamp.is_none() {
                tracing::debug!("skipping malformed timeline document");
            }
            stamp
        })
        .collect()
}

/// Splits `ops` into batches no larger than the per-commit ceiling.
fn chunked(ops: Vec<WriteOp>) -> impl Iterator<Item = Vec<WriteOp>> {
    let mut ops = ops.into_iter().peekable();
    std::iter::from_fn(move || {
        ops.peek()?;
        Some(ops.by_ref().take(MAX_BATCH_WRITES).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::memory::MemoryDocumentStore;

    fn owner() -> OwnerId {
        OwnerId::new("user-a").unwrap()
    }

    fn shared(id: &str) -> SharedId {
        SharedId::new(id).unwrap()
    }

    fn millis(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn create_note_registers_shared_id_atomically() {
        let docs = MemoryDocumentStore::new();
        let store = RemoteStore::new(&docs, Utc);
        let shared_id = shared("fam-1");

        let note = store
            .create_note(&owner(), "ノート1", Some(&shared_id))
            .await
            .unwrap();
        assert_eq!(note.shared_id, Some(shared_id.clone()));

        let notes = store.list_notes(&owner()).await.unwrap();
        assert_eq!(notes, vec![note.clone()]);

        let info = store
            .resolve_shared_note(&shared_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.note_id, note.id);
        assert_eq!(info.owner_id, owner());
        assert_eq!(info.note_name, "ノート1");
    }

    #[tokio::test]
    async fn update_note_replaces_and_clears_registrations() {
        let docs = MemoryDocumentStore::new();
        let store = RemoteStore::new(&docs, Utc);
        let old = shared("old");
        let new = shared("new");

        let mut note = store
            .create_note(&owner(), "sleep log", Some(&old))
            .await
            .unwrap();

        note.shared_id = Some(new.clone());
        store.update_note(&note).await.unwrap();
        assert!(store.resolve_shared_note(&old).await.unwrap().is_none());
        assert!(store.resolve_shared_note(&new).await.unwrap().is_some());

        note.shared_id = None;
        store.update_note(&note).await.unwrap();
        assert!(store.resolve_shared_note(&new).await.unwrap().is_none());
        assert_eq!(store.list_notes(&owner()).await.unwrap(), vec![note]);
    }

    #[tokio::test]
    async fn update_of_missing_note_fails() {
        let store = RemoteStore::new(MemoryDocumentStore::new(), Utc);
        let note = Note {
            id: NoteId::new("ghost").unwrap(),
            name: "x".into(),
            owner_id: owner(),
            shared_id: None,
        };
        let err = store.update_note(&note).await.unwrap_err();
        assert!(matches!(err, StoreError::NoteNotFound { .. }));
    }

    #[tokio::test]
    async fn delete_note_cascades_to_timeline_and_registration() {
        let docs = MemoryDocumentStore::new();
        let store = RemoteStore::new(&docs, Utc);
        let shared_id = shared("fam-1");

        let note = store
            .create_note(&owner(), "ノート1", Some(&shared_id))
            .await
            .unwrap();
        for minute in 0..3 {
            store
                .save_event(
                    &owner(),
                    &note.id,
                    StampKind::Memo,
                    "",
                    millis(2024, 3, 1, 9, minute),
                )
                .await
                .unwrap();
        }

        store.delete_note(&owner(), &note.id).await.unwrap();

        assert!(store.list_notes(&owner()).await.unwrap().is_empty());
        assert!(
            store
                .resolve_shared_note(&shared_id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(store.all_events(&owner(), &note.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_event_upserts_by_timestamp_and_attributes_operator() {
        let store = RemoteStore::new(MemoryDocumentStore::new(), Utc).with_operator("はは");
        let note_id = NoteId::new("n1").unwrap();
        let ts = millis(2024, 3, 5, 12, 0);

        store
            .save_event(&owner(), &note_id, StampKind::Pee, "", ts)
            .await
            .unwrap();
        store
            .save_event(&owner(), &note_id, StampKind::Poo, "ゆるい", ts)
            .await
            .unwrap();

        let stamp = store.event(&owner(), &note_id, ts).await.unwrap().unwrap();
        assert_eq!(stamp.kind, StampKind::Poo);
        assert_eq!(stamp.note, "ゆるい");
        assert_eq!(stamp.operator.as_deref(), Some("はは"));

        let all = store.all_events(&owner(), &note_id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn month_query_is_bounded_and_descending() {
        let store = RemoteStore::new(MemoryDocumentStore::new(), Utc);
        let note_id = NoteId::new("n1").unwrap();
        let in_window = [millis(2024, 3, 1, 0, 0), millis(2024, 3, 15, 8, 30)];
        let out_of_window = [
            millis(2024, 2, 29, 23, 59),
            // Exactly at the end boundary: belongs to April.
            millis(2024, 4, 1, 0, 0),
        ];
        for ts in in_window.iter().chain(&out_of_window) {
            store
                .save_event(&owner(), &note_id, StampKind::Memo, "", *ts)
                .await
                .unwrap();
        }

        let events = store
            .events_for_month(&owner(), &note_id, None, march())
            .await
            .unwrap();
        let timestamps: Vec<i64> = events.iter().map(|stamp| stamp.timestamp).collect();
        assert_eq!(timestamps, vec![in_window[1], in_window[0]]);
    }

    #[tokio::test]
    async fn shared_month_query_follows_registration() {
        let store = RemoteStore::new(MemoryDocumentStore::new(), Utc);
        let shared_id = shared("fam-1");
        let subscriber = OwnerId::new("user-b").unwrap();

        let note = store
            .create_note(&owner(), "ノート1", Some(&shared_id))
            .await
            .unwrap();
        store
            .save_event(
                &owner(),
                &note.id,
                StampKind::Fun,
                "",
                millis(2024, 3, 10, 15, 0),
            )
            .await
            .unwrap();

        // The subscriber's own IDs are ignored when a shared ID is given.
        let unrelated = NoteId::new("unrelated").unwrap();
        let events = store
            .events_for_month(&subscriber, &unrelated, Some(&shared_id), march())
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, StampKind::Fun);

        // A dangling shared ID reads as an empty month.
        let events = store
            .events_for_month(&subscriber, &unrelated, Some(&shared("ghost")), march())
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn bulk_save_chunks_at_batch_ceiling() {
        let docs = MemoryDocumentStore::new();
        let store = RemoteStore::new(&docs, Utc);
        let note_id = NoteId::new("n1").unwrap();
        let base = millis(2024, 3, 1, 0, 0);
        let batch: Vec<StampRecord> = (0..1200)
            .map(|i| StampRecord::new(base + i, StampKind::Memo, String::new()))
            .collect();

        let written = store.save_events(&owner(), &note_id, &batch).await.unwrap();
        assert_eq!(written, 1200);
        assert_eq!(docs.commit_count(), 3);
        assert_eq!(
            docs.collection_len("users/user-a/notes/n1/timeline"),
            1200
        );
    }

    #[tokio::test]
    async fn interrupted_bulk_save_reports_committed_count() {
        let docs = MemoryDocumentStore::new();
        let store = RemoteStore::new(&docs, Utc);
        let note_id = NoteId::new("n1").unwrap();
        let base = millis(2024, 3, 1, 0, 0);
        let batch: Vec<StampRecord> = (0..1200)
            .map(|i| StampRecord::new(base + i, StampKind::Memo, String::new()))
            .collect();

        docs.fail_commits_after(1);
        let err = store
            .save_events(&owner(), &note_id, &batch)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BatchInterrupted { written: 500, .. }));
        assert_eq!(docs.collection_len("users/user-a/notes/n1/timeline"), 500);

        // The remainder can be retried once the transport recovers; saves
        // are upserts, so resending everything is also safe.
        docs.clear_failures();
        let written = store
            .save_events(&owner(), &note_id, &batch[500..])
            .await
            .unwrap();
        assert_eq!(written, 700);
        assert_eq!(docs.collection_len("users/user-a/notes/n1/timeline"), 1200);
    }

    #[tokio::test]
    async fn suggestions_are_recent_distinct_and_capped() {
        let store = RemoteStore::new(MemoryDocumentStore::new(), Utc);
        let note_id = NoteId::new("n1").unwrap();
        let base = millis(2024, 3, 1, 0, 0);

        let mut stamps = Vec::new();
        for i in 0..12 {
            stamps.push(StampRecord::new(
                base + i,
                StampKind::Medication,
                format!("dose-{i}"),
            ));
        }
        // Duplicates, blanks, and other kinds must not take up slots.
        stamps.push(StampRecord::new(base + 12, StampKind::Medication, "dose-11".into()));
        stamps.push(StampRecord::new(base + 13, StampKind::Medication, "  ".into()));
        stamps.push(StampRecord::new(base + 14, StampKind::Memo, "not a dose".into()));
        store.save_events(&owner(), &note_id, &stamps).await.unwrap();

        let suggestions = store
            .note_suggestions(&owner(), &note_id, StampKind::Medication)
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 10);
        assert_eq!(suggestions[0], "dose-11");
        assert_eq!(suggestions[1], "dose-10");
        assert!(!suggestions.contains(&"dose-0".to_string()));
        assert!(!suggestions.contains(&"not a dose".to_string()));
    }

    #[tokio::test]
    async fn subscriptions_are_idempotent() {
        let store = RemoteStore::new(MemoryDocumentStore::new(), Utc);
        let shared_id = shared("fam-1");

        store.subscribe(&owner(), &shared_id).await.unwrap();
        store.subscribe(&owner(), &shared_id).await.unwrap();
        assert_eq!(
            store.subscriptions(&owner()).await.unwrap(),
            vec![shared_id.clone()]
        );

        store.unsubscribe(&owner(), &shared_id).await.unwrap();
        store.unsubscribe(&owner(), &shared_id).await.unwrap();
        assert!(store.subscriptions(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dangling_subscription_is_listed_but_unresolved() {
        let store = RemoteStore::new(MemoryDocumentStore::new(), Utc);
        let ghost = shared("ghost");

        store.subscribe(&owner(), &ghost).await.unwrap();
        assert_eq!(store.subscriptions(&owner()).await.unwrap(), vec![ghost.clone()]);
        assert!(store.resolve_shared_note(&ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_timeline_documents_are_skipped() {
        let docs = MemoryDocumentStore::new();
        let store = RemoteStore::new(&docs, Utc);
        let note_id = NoteId::new("n1").unwrap();
        let ts = millis(2024, 3, 5, 12, 0);

        store
            .save_event(&owner(), &note_id, StampKind::Memo, "ok", ts)
            .await
            .unwrap();
        let mut fields = Document::new();
        fields.insert(FIELD_ITEM_TYPE.to_string(), Value::from(STAMP_ITEM_TYPE));
        fields.insert(FIELD_TIMESTAMP.to_string(), Value::from(ts + 1));
        fields.insert(FIELD_KIND.to_string(), Value::from("NAP"));
        docs.commit(vec![WriteOp::Set {
            path: stamp_doc(&owner(), &note_id, ts + 1),
            fields,
        }])
        .await
        .unwrap();

        let all = store.all_events(&owner(), &note_id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].note, "ok");
    }
}
