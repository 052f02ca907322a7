use crate::{
    CoreResult, SessionError,
    notes::{NoteId, NoteRecord},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::debug;

/// Ordered note collection, most recent first.
///
/// At most one record has `is_playing` set; [`NoteStore::set_playing`] is the
/// only way to change the flag.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Vec<NoteRecord>,
}

impl NoteStore {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection seeded with existing records.
    ///
    /// Playing flags are cleared: a freshly built store has no active playback.
    pub fn with_notes(notes: Vec<NoteRecord>) -> Self {
        let mut store = Self { notes };
        store.set_playing(None);
        store
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the collection has no records.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &NoteRecord> {
        self.notes.iter()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &NoteId) -> Option<&NoteRecord> {
        self.notes.iter().find(|note| &note.id == id)
    }

    /// Whether a record with this id exists.
    pub fn contains(&self, id: &NoteId) -> bool {
        self.get(id).is_some()
    }

    /// Insert a record at the front of the list.
    pub fn prepend(&mut self, note: NoteRecord) {
        debug!(note_id = %note.id, title = %note.title, "Note added");
        self.notes.insert(0, note);
    }

    /// Replace a record's title with the trimmed `title`.
    ///
    /// # Errors
    ///
    /// `InvalidTitle` when the trimmed title is empty, `NoteNotFound` for an
    /// unknown id. The stored title is unchanged in both cases.
    #[track_caller]
    pub fn rename(&mut self, id: &NoteId, title: &str) -> CoreResult<()> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(SessionError::InvalidTitle {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let note = self
            .notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| SessionError::NoteNotFound {
                id: id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        note.title = trimmed.to_string();
        Ok(())
    }

    /// Remove a record by id and return it.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` for an unknown id.
    #[track_caller]
    pub fn remove(&mut self, id: &NoteId) -> CoreResult<NoteRecord> {
        let index = self
            .notes
            .iter()
            .position(|note| &note.id == id)
            .ok_or_else(|| SessionError::NoteNotFound {
                id: id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(self.notes.remove(index))
    }

    /// Mark `id` as the only playing note, or clear every flag with `None`.
    pub fn set_playing(&mut self, id: Option<&NoteId>) {
        for note in &mut self.notes {
            note.is_playing = Some(&note.id) == id;
        }
    }

    /// Id of the note whose flag is set, if any.
    pub fn playing(&self) -> Option<&NoteId> {
        self.notes
            .iter()
            .find(|note| note.is_playing)
            .map(|note| &note.id)
    }

    /// Records whose title contains `query`, ignoring case.
    ///
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<NoteRecord> {
        let needle = query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| note.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Snapshot of all records.
    pub fn to_vec(&self) -> Vec<NoteRecord> {
        self.notes.clone()
    }
}
