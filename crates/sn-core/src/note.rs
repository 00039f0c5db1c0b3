//! Notes: named, owned containers of stamps.

use serde::{Deserialize, Serialize};

use crate::types::{NoteId, OwnerId, SharedId};

/// A named, owned collection of stamps (the subject's journal).
///
/// A note's identity (`id`) never changes; its `shared_id` may be added,
/// changed, or removed independently of its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub name: String,
    pub owner_id: OwnerId,
    /// Present iff the note is published for cross-user subscription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_id: Option<SharedId>,
}

/// Read-only projection of a shared note, keyed by its shared ID.
///
/// Lets a subscriber resolve a shared ID into a note they can read but
/// do not own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedNoteInfo {
    pub note_id: NoteId,
    pub owner_id: OwnerId,
    pub note_name: String,
}
