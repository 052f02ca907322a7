//! Rename and delete dialogs.
//!
//! Each dialog takes a value and yields either a confirmed value or a
//! cancellation; the app applies confirmed values through the session.

use voice_notes_core::NoteId;

/// What a dialog returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome<T> {
    /// The user confirmed with this value.
    Confirmed(T),
    /// The user dismissed the dialog.
    Cancelled,
}

/// Rename prompt seeded with the note's current title.
#[derive(Debug, Clone)]
pub struct RenameDialog {
    initial: String,
}

impl RenameDialog {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            initial: initial.into(),
        }
    }

    /// Title shown before the user edits it.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// Submit `input`. Blank input cannot be saved and counts as cancel.
    pub fn submit(self, input: &str) -> DialogOutcome<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            DialogOutcome::Cancelled
        } else {
            DialogOutcome::Confirmed(trimmed.to_string())
        }
    }
}

/// Confirmation before a note is removed.
#[derive(Debug, Clone)]
pub struct DeleteDialog {
    note_id: NoteId,
    title: String,
}

impl DeleteDialog {
    pub fn new(note_id: NoteId, title: impl Into<String>) -> Self {
        Self {
            note_id,
            title: title.into(),
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "Delete Recording\nAre you sure you want to delete \"{}\"? This action cannot be undone. [y/n]",
            self.title
        )
    }

    pub fn answer(self, confirmed: bool) -> DialogOutcome<NoteId> {
        if confirmed {
            DialogOutcome::Confirmed(self.note_id)
        } else {
            DialogOutcome::Cancelled
        }
    }
}
