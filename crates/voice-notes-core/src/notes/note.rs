use std::{
    fmt,
    path::{Path, PathBuf},
};

use uuid::Uuid;

/// Opaque, immutable note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh unique id for a new recording.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as entered by the user or shown in the list.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a recorded audio resource owned by the audio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef(PathBuf);

impl AudioRef {
    /// Wrap a path produced by the backend.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Location of the audio file.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A single voice note: display metadata plus an optional audio resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Unique id, assigned at creation.
    pub id: NoteId,
    /// User-editable display title.
    pub title: String,
    /// Elapsed recording time, `MM:SS`.
    pub duration_label: String,
    /// Creation date for display.
    pub date_label: String,
    /// Whether this note is the one currently playing.
    pub is_playing: bool,
    /// Backing audio. `None` for demo entries.
    pub audio: Option<AudioRef>,
}

impl NoteRecord {
    /// Build a record for a freshly finished recording.
    pub fn recorded(
        title: String,
        duration_label: String,
        date_label: String,
        audio: AudioRef,
    ) -> Self {
        Self {
            id: NoteId::generate(),
            title,
            duration_label,
            date_label,
            is_playing: false,
            audio: Some(audio),
        }
    }

    /// Build a record with no backing audio.
    pub fn placeholder(id: &str, title: &str, duration_label: &str, date_label: &str) -> Self {
        Self {
            id: NoteId::from(id),
            title: title.to_string(),
            duration_label: duration_label.to_string(),
            date_label: date_label.to_string(),
            is_playing: false,
            audio: None,
        }
    }
}
