use crate::{
    CoreResult,
    notes::{AudioRef, NoteId},
};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Outcome of a microphone permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Access granted; cached by the session manager.
    Granted,
    /// The user declined.
    Denied,
}

/// Platform audio-session category.
///
/// Mobile platforms route audio differently while the microphone is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSessionMode {
    /// Microphone open, output may be ducked.
    Recording,
    /// Normal output routing.
    Playback,
}

/// Sent when a playback handle reaches the natural end of its audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackFinished {
    /// Note that was playing.
    pub note_id: NoteId,
    /// Token of the playback that finished. Stale tokens are ignored.
    pub token: u64,
}

/// One-shot completion signal handed to [`AudioBackend::begin_playback`].
///
/// Safe to fire from an audio callback thread.
#[derive(Debug)]
pub struct PlaybackCompletion {
    tx: mpsc::UnboundedSender<PlaybackFinished>,
    event: PlaybackFinished,
}

impl PlaybackCompletion {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<PlaybackFinished>,
        note_id: NoteId,
        token: u64,
    ) -> Self {
        Self {
            tx,
            event: PlaybackFinished { note_id, token },
        }
    }

    /// Report that playback reached its end.
    pub fn notify(self) {
        // Receiver gone means the app is shutting down.
        let _ = self.tx.send(self.event);
    }
}

/// Platform audio API: permission, recording, playback.
///
/// Handles are opaque values owned by the session manager. Every handle
/// returned by `begin_*` is passed back to the matching `finish_recording` or
/// `end_playback` exactly once.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Open microphone session.
    type Recording: Send;
    /// Open playback session.
    type Playback: Send;

    /// Ask the user for microphone access.
    async fn request_permission(&self) -> CoreResult<Permission>;

    /// Switch the platform audio-session category.
    async fn configure_session(&self, mode: AudioSessionMode) -> CoreResult<()>;

    /// Acquire the microphone and start capturing.
    async fn begin_recording(&self) -> CoreResult<Self::Recording>;

    /// Stop capturing and release the microphone.
    ///
    /// Returns `None` when nothing usable was captured. The handle is released
    /// even when this returns an error.
    async fn finish_recording(&self, handle: Self::Recording) -> CoreResult<Option<AudioRef>>;

    /// Start playing `audio` immediately. `completion` fires at natural end.
    ///
    /// # Errors
    ///
    /// `InvalidResource` when `audio` cannot be opened, `DeviceError` when the
    /// output device fails.
    async fn begin_playback(
        &self,
        audio: &AudioRef,
        completion: PlaybackCompletion,
    ) -> CoreResult<Self::Playback>;

    /// Stop playback and release the output handle.
    async fn end_playback(&self, handle: Self::Playback) -> CoreResult<()>;

    /// Delete an audio resource whose note was removed.
    async fn discard(&self, audio: &AudioRef) -> CoreResult<()>;
}
