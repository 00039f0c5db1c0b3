//! Local single-user backend backed by SQLite.
//!
//! Everything lives in one namespaced key-value table: note metadata under
//! the `notes` namespace (JSON values), and each note's timeline under its
//! own `events_{note_id}` namespace with the timestamp as the key and a
//! `KIND|free text` value. The flat encoding matches what the store needs:
//! exact-key upserts and deletes, plus full-namespace scans that get
//! filtered and sorted in memory (a month of stamps is small).
//!
//! There is no sharing locally: subscription operations succeed as no-ops,
//! the subscription set is always empty, and shared IDs never resolve.
//! Callers treat that as a valid single-user state, not a failure.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, TimeZone};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sn_core::{Note, NoteId, OwnerId, SharedId, SharedNoteInfo, StampKind, StampRecord, month_range};

use crate::{StoreError, TimelineStore};

const NOTES_NAMESPACE: &str = "notes";

/// [`TimelineStore`] backed by an on-device SQLite database.
///
/// `tz` fixes the local-time convention for month windows. Stamps saved
/// locally are never attributed to an operator.
pub struct LocalStore<Tz> {
    conn: Mutex<Connection>,
    tz: Tz,
}

/// Note metadata as persisted; the owner is implied by the device.
#[derive(Serialize, Deserialize)]
struct StoredNote {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shared_id: Option<SharedId>,
}

impl<Tz: TimeZone> LocalStore<Tz> {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>, tz: Tz) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?, tz)
    }

    /// Opens a private in-memory database, lost on drop.
    pub fn open_in_memory(tz: Tz) -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, tz)
    }

    fn init(conn: Connection, tz: Tz) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key       TEXT NOT NULL,
                value     TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            tz,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn namespace_rows(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT key, value FROM kv WHERE namespace = ?1")?;
        let rows = stmt
            .query_map(params![namespace], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn put(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().execute(
            "INSERT INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
            params![namespace, key, value],
        )?;
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE namespace = ?1 AND key = ?2")?;
        let mut rows = stmt.query_map(params![namespace, key], |row| row.get::<_, String>(0))?;
        rows.next().transpose().map_err(StoreError::from)
    }

    /// All of a note's stamps, sorted ascending, malformed rows skipped.
    fn load_events(&self, note_id: &NoteId) -> Result<Vec<StampRecord>, StoreError> {
        let mut stamps: Vec<StampRecord> = self
            .namespace_rows(&events_namespace(note_id))?
            .into_iter()
            .filter_map(|(key, value)| {
                let stamp = decode_stamp(&key, &value);
                if stamp.is_none() {
                    tracing::debug!(key, "skipping malformed timeline row");
                }
                stamp
            })
            .collect();
        stamps.sort_by_key(|stamp| stamp.timestamp);
        Ok(stamps)
    }
}

impl<Tz: TimeZone> TimelineStore for LocalStore<Tz> {
    async fn list_notes(&self, owner: &OwnerId) -> Result<Vec<Note>, StoreError> {
        let mut notes = Vec::new();
        for (key, value) in self.namespace_rows(NOTES_NAMESPACE)? {
            let Ok(stored) = serde_json::from_str::<StoredNote>(&value) else {
                tracing::debug!(note_id = key, "skipping malformed note row");
                continue;
            };
            let Ok(id) = NoteId::new(key) else { continue };
            notes.push(Note {
                id,
                name: stored.name,
                owner_id: owner.clone(),
                shared_id: stored.shared_id,
            });
        }
        Ok(notes)
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
        let stored = StoredNote {
            name: note.name.clone(),
            shared_id: note.shared_id.clone(),
        };
        self.put(
            NOTES_NAMESPACE,
            note.id.as_str(),
            &serde_json::to_string(&stored)?,
        )?;
        Ok(note)
    }

    async fn update_note(&self, note: &Note) -> Result<(), StoreError> {
        if self.get(NOTES_NAMESPACE, note.id.as_str())?.is_none() {
            return Err(StoreError::NoteNotFound {
                note_id: note.id.to_string(),
            });
        }
        let stored = StoredNote {
            name: note.name.clone(),
            shared_id: note.shared_id.clone(),
        };
        self.put(
            NOTES_NAMESPACE,
            note.id.as_str(),
            &serde_json::to_string(&stored)?,
        )
    }

    async fn delete_note(&self, _owner: &OwnerId, note_id: &NoteId) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM kv WHERE namespace = ?1",
            params![events_namespace(note_id)],
        )?;
        tx.execute(
            "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
            params![NOTES_NAMESPACE, note_id.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// The shared ID is ignored: this backend has no subscribed notes to
    /// read through, only the device's own timelines.
    async fn events_for_month(
        &self,
        _owner: &OwnerId,
        note_id: &NoteId,
        _shared_id: Option<&SharedId>,
        reference: NaiveDate,
    ) -> Result<Vec<StampRecord>, StoreError> {
        let (start, end) = month_range(reference, &self.tz);
        let mut stamps: Vec<StampRecord> = self
            .load_events(note_id)?
            .into_iter()
            .filter(|stamp| stamp.timestamp >= start && stamp.timestamp < end)
            .collect();
        stamps.reverse();
        Ok(stamps)
    }

    async fn all_events(
        &self,
        _owner: &OwnerId,
        note_id: &NoteId,
    ) -> Result<Vec<StampRecord>, StoreError> {
        self.load_events(note_id)
    }

    async fn event(
        &self,
        _owner: &OwnerId,
        note_id: &NoteId,
        timestamp: i64,
    ) -> Result<Option<StampRecord>, StoreError> {
        let key = timestamp.to_string();
        Ok(self
            .get(&events_namespace(note_id), &key)?
            .and_then(|value| decode_stamp(&key, &value)))
    }

    async fn note_suggestions(
        &self,
        _owner: &OwnerId,
        note_id: &NoteId,
        kind: StampKind,
    ) -> Result<Vec<String>, StoreError> {
        let mut suggestions: Vec<String> = Vec::new();
        let events = self.load_events(note_id)?;
        for stamp in events.iter().rev().filter(|s| s.kind == kind).take(100) {
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
        _owner: &OwnerId,
        note_id: &NoteId,
        kind: StampKind,
        note: &str,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.put(
            &events_namespace(note_id),
            &timestamp.to_string(),
            &encode_stamp(kind, note),
        )
    }

    async fn save_events(
        &self,
        _owner: &OwnerId,
        note_id: &NoteId,
        batch: &[StampRecord],
    ) -> Result<usize, StoreError> {
        let namespace = events_namespace(note_id);
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for stamp in batch {
            tx.execute(
                "INSERT INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
                params![
                    namespace,
                    stamp.timestamp.to_string(),
                    encode_stamp(stamp.kind, &stamp.note)
                ],
            )?;
        }
        tx.commit()?;
        Ok(batch.len())
    }

    async fn delete_event(
        &self,
        _owner: &OwnerId,
        note_id: &NoteId,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.lock().execute(
            "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
            params![events_namespace(note_id), timestamp.to_string()],
        )?;
        Ok(())
    }

    async fn subscribe(&self, _owner: &OwnerId, _shared_id: &SharedId) -> Result<(), StoreError> {
        Ok(())
    }

    async fn unsubscribe(&self, _owner: &OwnerId, _shared_id: &SharedId) -> Result<(), StoreError> {
        Ok(())
    }

    async fn subscriptions(&self, _owner: &OwnerId) -> Result<Vec<SharedId>, StoreError> {
        Ok(Vec::new())
    }

    async fn resolve_shared_note(
        &self,
        _shared_id: &SharedId,
    ) -> Result<Option<SharedNoteInfo>, StoreError> {
        Ok(None)
    }
}

fn events_namespace(note_id: &NoteId) -> String {
    format!("events_{note_id}")
}

/// Stamps are stored as `KIND|free text`. The kind identifier never
/// contains `|`, so the text may.
fn encode_stamp(kind: StampKind, note: &str) -> String {
    format!("{}|{note}", kind.as_str())
}

fn decode_stamp(key: &str, value: &str) -> Option<StampRecord> {
    let timestamp: i64 = key.parse().ok()?;
    let (kind, note) = value.split_once('|').unwrap_or((value, ""));
    Some(StampRecord::new(
        timestamp,
        kind.parse().ok()?,
        note.to_string(),
    ))
}
