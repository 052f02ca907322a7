/// Commands sent from the input handler to the main application.
///
/// Notes are referred to by what the user typed: a full id or a unique id
/// prefix. The app resolves it against the current list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start recording, or stop if already recording.
    ToggleRecording,
    /// Stop whatever is active: the recording or the playback.
    Stop,
    /// Play a note, or stop it if it is the one playing.
    Play {
        /// Id or id prefix.
        note: String,
    },
    /// Submit the rename dialog for a note.
    Rename {
        /// Id or id prefix.
        note: String,
        /// Raw dialog input, untrimmed.
        title: String,
    },
    /// Open the delete confirmation dialog for a note.
    Delete {
        /// Id or id prefix.
        note: String,
    },
    /// Answer the open confirmation dialog.
    Answer {
        /// `true` for yes.
        confirmed: bool,
    },
    /// Filter the list by title.
    Search {
        /// Raw search text.
        query: String,
    },
    /// Remove the search filter.
    ClearSearch,
    /// Redraw the list.
    List,
    /// Print usage.
    Help,
    /// Request application shutdown.
    Shutdown,
}
