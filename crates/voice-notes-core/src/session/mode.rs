use crate::notes::NoteId;

/// Externally visible session state; drives the record button and list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// No hardware handle open.
    Idle,
    /// Microphone open.
    Recording,
    /// A note is playing, audibly or as a visual-only toggle.
    Playing(NoteId),
}

/// Why an intent was dropped without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Another hardware operation is still in flight.
    Busy,
    /// `stop_recording` outside of `Recording`.
    NotRecording,
    /// `start_recording` while already recording.
    AlreadyRecording,
    /// `stop_playing` outside of `Playing`.
    NotPlaying,
    /// `play_note` while the microphone is open.
    RecordingInProgress,
    /// The manager has been shut down.
    Closed,
}

/// Result of a completed intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Microphone acquired.
    RecordingStarted,
    /// Recording finalized and stored as a new note.
    NoteSaved(NoteId),
    /// Recording finalized but produced no audio; nothing stored.
    RecordingDiscarded,
    /// Note marked playing. `audible` is false for the visual-only fallback.
    PlaybackStarted {
        /// Note now playing.
        note_id: NoteId,
        /// Whether a real playback handle was opened.
        audible: bool,
    },
    /// Playback released and every playing flag cleared.
    PlaybackStopped(NoteId),
    /// Note removed from the collection.
    NoteDeleted(NoteId),
    /// Intent dropped; state unchanged.
    Ignored(IgnoreReason),
}
