//! Per-user note storage.
//!
//! Notes are partitioned by the identity that owns them, so a lookup with
//! the wrong user id behaves exactly like a lookup of a missing note.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub user_id: String,
    pub note_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NoteInput {
    pub content: String,
    #[serde(default)]
    pub attachment: Option<String>,
}

impl NoteInput {
    pub fn validate(&self) -> Result<(), Error> {
        if self.content.is_empty() {
            return Err(Error::EmptyContent);
        }
        Ok(())
    }
}

impl Note {
    /// Creates a note with a fresh id, stamped with the current time.
    pub fn new(user_id: impl Into<String>, input: NoteInput) -> Self {
        Self {
            user_id: user_id.into(),
            note_id: Uuid::new_v4().to_string(),
            content: input.content,
            attachment: input.attachment,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Default)]
pub struct NotesStore {
    /// user id -> note id -> note
    notes: HashMap<String, HashMap<String, Note>>,
}

impl NotesStore {
    pub fn new() -> Self {
        Self {
            notes: HashMap::new(),
        }
    }

    /// Stores a note, replacing any note with the same owner and id.
    pub fn insert(&mut self, note: Note) {
        self.notes
            .entry(note.user_id.clone())
            .or_default()
            .insert(note.note_id.clone(), note);
    }

    pub fn get(&self, user_id: &str, note_id: &str) -> Result<&Note, Error> {
        self.notes
            .get(user_id)
            .and_then(|notes| notes.get(note_id))
            .ok_or(Error::NoteNotFound)
    }

    /// Replaces the content and attachment of an existing note.
    pub fn update(
        &mut self,
        user_id: &str,
        note_id: &str,
        input: NoteInput,
    ) -> Result<&Note, Error> {
        let note = self
            .notes
            .get_mut(user_id)
            .and_then(|notes| notes.get_mut(note_id))
            .ok_or(Error::NoteNotFound)?;
        note.content = input.content;
        note.attachment = input.attachment;
        Ok(note)
    }

    /// Removes a note, returning it if it existed.
    pub fn remove(&mut self, user_id: &str, note_id: &str) -> Option<Note> {
        let notes = self.notes.get_mut(user_id)?;
        let removed = notes.remove(note_id);
        if notes.is_empty() {
            self.notes.remove(user_id);
        }
        removed
    }

    /// Lists a user's notes, oldest first.
    pub fn list(&self, user_id: &str) -> Vec<&Note> {
        let mut notes: Vec<_> = self
            .notes
            .get(user_id)
            .map(|notes| notes.values().collect())
            .unwrap_or_default();
        notes.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.note_id.cmp(&b.note_id))
        });
        notes
    }
}
