use error_location::ErrorLocation;
use thiserror::Error;

/// Session and note errors with source location tracking.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The user declined microphone access.
    #[error("Microphone permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio output device found.
    #[error("No output device found {location}")]
    NoOutputDevice {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device acquisition or finalization failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback was requested against a resource that cannot be played.
    #[error("Invalid audio resource: {reason} {location}")]
    InvalidResource {
        /// Why the resource was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Decoded audio could not be converted to the output device's rate.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No note with the given id exists in the collection.
    #[error("Note not found: {id} {location}")]
    NoteNotFound {
        /// The id that was looked up.
        id: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A rename was rejected because the trimmed title is empty.
    #[error("Note title must not be empty {location}")]
    InvalidTitle {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
