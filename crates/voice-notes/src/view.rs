//! Terminal rendering of the note list and record indicator.

use voice_notes_core::{NoteId, NoteRecord, SessionMode};

use std::{fmt::Write, time::Duration};

/// Half-period of the record indicator pulse.
const PULSE_HALF_PERIOD_MS: u128 = 1000;
/// Peak scale of the record indicator pulse.
const PULSE_PEAK: f32 = 1.2;
/// Characters of a generated id shown in the list.
const SHORT_ID_LEN: usize = 8;

/// Everything one frame needs, read from the session in one go.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub mode: SessionMode,
    /// Notes after the search filter.
    pub visible: Vec<NoteRecord>,
    /// Size of the unfiltered collection.
    pub total: usize,
    pub recording_elapsed: Option<Duration>,
}

/// Presentation state that is not part of the session: the search text.
#[derive(Debug, Clone, Default)]
pub struct View {
    query: String,
}

impl View {
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Store the search text exactly as typed; filtering is a plain
    /// case-insensitive substring match.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Hello, Be patient with yourself");
        let _ = writeln!(out, "Voice Notes  |  {} RECORDINGS", snapshot.total);
        if !self.query.is_empty() {
            let _ = writeln!(out, "Search: \"{}\"  (clear to reset)", self.query);
        }
        let _ = writeln!(out, "Recent Recordings");

        if snapshot.visible.is_empty() {
            let _ = writeln!(out, "  (no recordings)");
        }
        for note in &snapshot.visible {
            let marker = if note.is_playing { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{} [{:<8}] {:<28} {}  {}",
                marker,
                short_id(&note.id),
                note.title,
                note.duration_label,
                note.date_label
            );
        }

        let _ = write!(out, "{}", record_indicator(&snapshot.mode, snapshot.recording_elapsed));
        out
    }
}

/// Record button line; pulses while recording.
pub fn record_indicator(mode: &SessionMode, elapsed: Option<Duration>) -> String {
    match (mode, elapsed) {
        (SessionMode::Recording, Some(elapsed)) => {
            let glyph = if pulse_scale(elapsed) >= 1.1 { "(@)" } else { " @ " };
            let secs = elapsed.as_secs();
            format!("{} REC {:02}:{:02}  [record] to stop", glyph, secs / 60, secs % 60)
        }
        (SessionMode::Recording, None) => " @  REC  [record] to stop".to_string(),
        _ => " o  [record] to start".to_string(),
    }
}

/// Record button scale: 1.0 up to 1.2 and back, one second each way.
pub fn pulse_scale(elapsed: Duration) -> f32 {
    let phase = elapsed.as_millis() % (2 * PULSE_HALF_PERIOD_MS);
    let rise = if phase < PULSE_HALF_PERIOD_MS {
        phase
    } else {
        2 * PULSE_HALF_PERIOD_MS - phase
    };
    1.0 + (PULSE_PEAK - 1.0) * rise as f32 / PULSE_HALF_PERIOD_MS as f32
}

/// Id as shown in the list: generated ids are cut to their first characters.
pub fn short_id(id: &NoteId) -> &str {
    let id = id.as_str();
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Resolve what the user typed to a note: exact id first, then a unique prefix.
pub fn resolve_note(token: &str, notes: &[NoteRecord]) -> Option<NoteId> {
    if let Some(note) = notes.iter().find(|n| n.id.as_str() == token) {
        return Some(note.id.clone());
    }

    let mut matches = notes.iter().filter(|n| n.id.as_str().starts_with(token));
    match (matches.next(), matches.next()) {
        (Some(note), None) if !token.is_empty() => Some(note.id.clone()),
        _ => None,
    }
}

pub const HELP: &str = "\
Commands:
  record | r              start or stop recording
  stop | s                stop recording or playback
  play | p <id>           play a note (again to stop)
  rename <id> <title>     rename a note
  delete | rm <id>        delete a note (asks to confirm)
  search | / <text>       filter by title
  clear                   remove the filter
  list | ls               show the list
  quit | q                exit";
