use crate::{
    CoreResult, SessionError,
    audio::{AudioBackend, AudioSessionMode, Permission, PlaybackCompletion, PlaybackFinished},
    notes::{NoteId, NoteRecord, NoteStore, labels},
    session::{BusyGuard, IgnoreReason, Outcome, SessionMode},
};

use std::{
    mem,
    panic::Location,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use chrono::Local;
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Hardware side of the session. Handles live only in the variant that needs
/// them.
enum ActiveSession<R, P> {
    Idle,
    Recording {
        handle: R,
        started_at: Instant,
        session_id: Uuid,
    },
    Playing {
        note_id: NoteId,
        /// `None` for the visual-only toggle.
        handle: Option<P>,
        token: u64,
    },
}

struct Inner<R, P> {
    session: ActiveSession<R, P>,
    notes: NoteStore,
    permission_granted: bool,
}

/// Serializes record and playback intents over one [`AudioBackend`].
///
/// # Handle Discipline
///
/// At most one handle is open at a time. Handles are moved out of the state
/// under the lock before they are released, so exactly one code path releases
/// each one, and the previous handle is always released before the next is
/// acquired.
///
/// # Re-entrancy
///
/// Hardware intents claim a `busy` flag for their whole duration. An intent
/// arriving while it is held returns [`Outcome::Ignored`] with
/// [`IgnoreReason::Busy`]; nothing is queued. The state lock is never held
/// across an `.await`.
///
/// # Teardown
///
/// [`SessionManager::shutdown`] closes the manager under the state lock. An
/// acquisition still pending at that point releases its fresh handle instead
/// of storing it, and later intents return [`IgnoreReason::Closed`].
pub struct SessionManager<B: AudioBackend> {
    backend: B,
    inner: Mutex<Inner<B::Recording, B::Playback>>,
    busy: AtomicBool,
    closed: AtomicBool,
    next_token: AtomicU64,
    finished_tx: mpsc::UnboundedSender<PlaybackFinished>,
}

impl<B: AudioBackend> SessionManager<B> {
    /// Create an idle manager over `notes`.
    ///
    /// The returned receiver yields [`PlaybackFinished`] events; feed each one
    /// back through [`SessionManager::playback_finished`].
    pub fn new(backend: B, notes: NoteStore) -> (Self, mpsc::UnboundedReceiver<PlaybackFinished>) {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        let mut notes = notes;
        notes.set_playing(None);

        let manager = Self {
            backend,
            inner: Mutex::new(Inner {
                session: ActiveSession::Idle,
                notes,
                permission_granted: false,
            }),
            busy: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            next_token: AtomicU64::new(1),
            finished_tx,
        };

        (manager, finished_rx)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<B::Recording, B::Playback>> {
        self.inner.lock().unwrap_or_else(|e| {
            warn!("Session state lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    /// Current mode.
    pub fn mode(&self) -> SessionMode {
        match &self.lock().session {
            ActiveSession::Idle => SessionMode::Idle,
            ActiveSession::Recording { .. } => SessionMode::Recording,
            ActiveSession::Playing { note_id, .. } => SessionMode::Playing(note_id.clone()),
        }
    }

    /// Whether a hardware intent is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Whether [`SessionManager::shutdown`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Time since the microphone was opened, while recording.
    pub fn recording_elapsed(&self) -> Option<Duration> {
        match &self.lock().session {
            ActiveSession::Recording { started_at, .. } => Some(started_at.elapsed()),
            _ => None,
        }
    }

    /// Snapshot of the note collection, most recent first.
    pub fn notes(&self) -> Vec<NoteRecord> {
        self.lock().notes.to_vec()
    }

    /// Number of notes.
    pub fn note_count(&self) -> usize {
        self.lock().notes.len()
    }

    /// Notes whose title contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<NoteRecord> {
        self.lock().notes.search(query)
    }

    /// `Idle` (or `Playing`) to `Recording`.
    ///
    /// Asks for microphone permission the first time. An active playback is
    /// released before the microphone is opened.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` if the user declines, or the backend's error if the
    /// microphone cannot be acquired. The manager is `Idle` afterwards.
    #[instrument(skip(self))]
    pub async fn start_recording(&self) -> CoreResult<Outcome> {
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("start_recording dropped, session busy");
            return Ok(Outcome::Ignored(IgnoreReason::Busy));
        };
        if self.is_closed() {
            return Ok(Outcome::Ignored(IgnoreReason::Closed));
        }

        let permission_granted = {
            let inner = self.lock();
            if matches!(inner.session, ActiveSession::Recording { .. }) {
                return Ok(Outcome::Ignored(IgnoreReason::AlreadyRecording));
            }
            inner.permission_granted
        };

        if !permission_granted {
            match self.backend.request_permission().await? {
                Permission::Granted => {
                    self.lock().permission_granted = true;
                    debug!("Microphone permission granted");
                }
                Permission::Denied => {
                    info!("Microphone permission denied");
                    return Err(SessionError::PermissionDenied {
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }

        if let Some(note_id) = self.release_playback().await {
            info!(note_id = %note_id, "Playback stopped for recording");
        }

        self.backend
            .configure_session(AudioSessionMode::Recording)
            .await?;

        let handle = match self.backend.begin_recording().await {
            Ok(handle) => handle,
            Err(e) => {
                self.restore_playback_session().await;
                return Err(e);
            }
        };

        let session_id = Uuid::new_v4();
        let orphan = {
            let mut inner = self.lock();
            if self.is_closed() {
                Some(handle)
            } else {
                inner.session = ActiveSession::Recording {
                    handle,
                    started_at: Instant::now(),
                    session_id,
                };
                None
            }
        };

        if let Some(handle) = orphan {
            self.release_orphan_recording(handle).await;
            return Ok(Outcome::Ignored(IgnoreReason::Closed));
        }

        info!(session_id = %session_id, "Recording started");

        Ok(Outcome::RecordingStarted)
    }

    /// `Recording` to `Idle`, storing the result as a new note at the front.
    ///
    /// The mode is `Idle` and the handle released on every path, including
    /// finalization failure.
    ///
    /// # Errors
    ///
    /// The backend's error if finalization fails. No note is added.
    #[instrument(skip(self))]
    pub async fn stop_recording(&self) -> CoreResult<Outcome> {
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("stop_recording dropped, session busy");
            return Ok(Outcome::Ignored(IgnoreReason::Busy));
        };
        if self.is_closed() {
            return Ok(Outcome::Ignored(IgnoreReason::Closed));
        }

        let (handle, started_at, session_id) = {
            let mut inner = self.lock();
            match mem::replace(&mut inner.session, ActiveSession::Idle) {
                ActiveSession::Recording {
                    handle,
                    started_at,
                    session_id,
                } => (handle, started_at, session_id),
                other => {
                    inner.session = other;
                    return Ok(Outcome::Ignored(IgnoreReason::NotRecording));
                }
            }
        };

        let elapsed = started_at.elapsed();
        let finished = self.backend.finish_recording(handle).await;
        self.restore_playback_session().await;

        let audio = match finished? {
            Some(audio) => audio,
            None => {
                warn!(session_id = %session_id, "Recording produced no audio, discarded");
                return Ok(Outcome::RecordingDiscarded);
            }
        };

        let note_id = {
            let mut inner = self.lock();
            let note = NoteRecord::recorded(
                labels::default_title(inner.notes.len() + 1),
                labels::duration_label(elapsed),
                labels::date_label(Local::now()),
                audio,
            );
            let note_id = note.id.clone();
            inner.notes.prepend(note);
            note_id
        };

        info!(
            session_id = %session_id,
            note_id = %note_id,
            duration_ms = elapsed.as_millis(),
            "Recording saved"
        );

        Ok(Outcome::NoteSaved(note_id))
    }

    /// Play `note_id`, or stop it if it is the note already playing.
    ///
    /// Any other playback is released first. Notes without audio, or whose
    /// audio the backend rejects as invalid, toggle visually with no handle.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` for an unknown id, or the backend's device error. The
    /// manager is `Idle` with no playing flag after a device error.
    #[instrument(skip(self))]
    pub async fn play_note(&self, note_id: &NoteId) -> CoreResult<Outcome> {
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("play_note dropped, session busy");
            return Ok(Outcome::Ignored(IgnoreReason::Busy));
        };
        if self.is_closed() {
            return Ok(Outcome::Ignored(IgnoreReason::Closed));
        }

        let audio = {
            let inner = self.lock();
            if matches!(inner.session, ActiveSession::Recording { .. }) {
                return Ok(Outcome::Ignored(IgnoreReason::RecordingInProgress));
            }
            let note = inner
                .notes
                .get(note_id)
                .ok_or_else(|| SessionError::NoteNotFound {
                    id: note_id.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            note.audio.clone()
        };

        if self.release_playback().await.as_ref() == Some(note_id) {
            info!(note_id = %note_id, "Playback toggled off");
            return Ok(Outcome::PlaybackStopped(note_id.clone()));
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);

        let handle = match audio {
            None => None,
            Some(audio) => {
                let completion =
                    PlaybackCompletion::new(self.finished_tx.clone(), note_id.clone(), token);
                match self.backend.begin_playback(&audio, completion).await {
                    Ok(handle) => Some(handle),
                    Err(SessionError::InvalidResource { reason, .. }) => {
                        warn!(note_id = %note_id, reason = %reason, "Audio unavailable, visual toggle only");
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        match self.mark_playing(note_id, handle, token) {
            Ok(outcome) => Ok(outcome),
            Err(orphan) => {
                if let Some(handle) = orphan {
                    if let Err(e) = self.backend.end_playback(handle).await {
                        warn!(note_id = %note_id, error = ?e, "Failed to release playback after shutdown");
                    }
                }
                info!(note_id = %note_id, "Playback abandoned, session closed");
                Ok(Outcome::Ignored(IgnoreReason::Closed))
            }
        }
    }

    /// `Playing` to `Idle`.
    #[instrument(skip(self))]
    pub async fn stop_playing(&self) -> CoreResult<Outcome> {
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("stop_playing dropped, session busy");
            return Ok(Outcome::Ignored(IgnoreReason::Busy));
        };
        if self.is_closed() {
            return Ok(Outcome::Ignored(IgnoreReason::Closed));
        }

        Ok(match self.release_playback().await {
            Some(note_id) => Outcome::PlaybackStopped(note_id),
            None => Outcome::Ignored(IgnoreReason::NotPlaying),
        })
    }

    /// Apply a natural end-of-playback event.
    ///
    /// Returns `false` for a stale event whose playback was already replaced
    /// or stopped.
    #[instrument(skip(self))]
    pub async fn playback_finished(&self, event: PlaybackFinished) -> bool {
        let handle = {
            let mut inner = self.lock();
            let active = matches!(
                &inner.session,
                ActiveSession::Playing { token, .. } if *token == event.token
            );
            if !active {
                debug!(note_id = %event.note_id, "Stale playback completion ignored");
                return false;
            }
            let ActiveSession::Playing { handle, .. } =
                mem::replace(&mut inner.session, ActiveSession::Idle)
            else {
                return false;
            };
            inner.notes.set_playing(None);
            handle
        };

        if let Some(handle) = handle {
            if let Err(e) = self.backend.end_playback(handle).await {
                warn!(error = ?e, "Failed to release finished playback");
            }
        }

        info!(note_id = %event.note_id, "Playback finished");

        true
    }

    /// Replace a note's title with the trimmed `title`.
    ///
    /// # Errors
    ///
    /// `InvalidTitle` for an empty or whitespace-only title, `NoteNotFound`
    /// for an unknown id.
    #[instrument(skip(self))]
    pub fn rename_note(&self, note_id: &NoteId, title: &str) -> CoreResult<()> {
        self.lock().notes.rename(note_id, title)?;
        info!(note_id = %note_id, "Note renamed");
        Ok(())
    }

    /// Remove a note, stopping it first if it is playing, and discard its
    /// audio.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_note(&self, note_id: &NoteId) -> CoreResult<Outcome> {
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("delete_note dropped, session busy");
            return Ok(Outcome::Ignored(IgnoreReason::Busy));
        };
        if self.is_closed() {
            return Ok(Outcome::Ignored(IgnoreReason::Closed));
        }

        if !self.lock().notes.contains(note_id) {
            return Err(SessionError::NoteNotFound {
                id: note_id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.mode() == SessionMode::Playing(note_id.clone()) {
            self.release_playback().await;
        }

        let removed = self.lock().notes.remove(note_id)?;

        if let Some(audio) = &removed.audio {
            if let Err(e) = self.backend.discard(audio).await {
                warn!(note_id = %note_id, error = ?e, "Failed to discard note audio");
            }
        }

        info!(note_id = %note_id, title = %removed.title, "Note deleted");

        Ok(Outcome::NoteDeleted(note_id.clone()))
    }

    /// Close the manager and release whatever handle is open.
    ///
    /// Safe to call while another intent is suspended in the backend; that
    /// intent releases its own handle once it resumes.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let session = {
            let mut inner = self.lock();
            self.closed.store(true, Ordering::Release);
            inner.notes.set_playing(None);
            mem::replace(&mut inner.session, ActiveSession::Idle)
        };

        match session {
            ActiveSession::Recording {
                handle, session_id, ..
            } => {
                match self.backend.finish_recording(handle).await {
                    Ok(audio) => info!(
                        session_id = %session_id,
                        saved = audio.is_some(),
                        "Recording closed on shutdown"
                    ),
                    Err(e) => warn!(session_id = %session_id, error = ?e, "Failed to close recording"),
                }
                self.restore_playback_session().await;
            }
            ActiveSession::Playing {
                handle: Some(handle),
                ..
            } => {
                if let Err(e) = self.backend.end_playback(handle).await {
                    warn!(error = ?e, "Failed to close playback");
                }
            }
            ActiveSession::Playing { handle: None, .. } | ActiveSession::Idle => {}
        }

        info!("Session shut down");
    }

    /// Store the playback as active. Hands `handle` back when the manager
    /// closed while it was being acquired.
    fn mark_playing(
        &self,
        note_id: &NoteId,
        handle: Option<B::Playback>,
        token: u64,
    ) -> Result<Outcome, Option<B::Playback>> {
        let audible = handle.is_some();
        {
            let mut inner = self.lock();
            if self.is_closed() {
                return Err(handle);
            }
            inner.notes.set_playing(Some(note_id));
            inner.session = ActiveSession::Playing {
                note_id: note_id.clone(),
                handle,
                token,
            };
        }

        info!(note_id = %note_id, audible, "Playback started");

        Ok(Outcome::PlaybackStarted {
            note_id: note_id.clone(),
            audible,
        })
    }

    /// Move the playback handle out of the state, clear every flag, then
    /// release it. Caller holds the busy guard.
    async fn release_playback(&self) -> Option<NoteId> {
        let (note_id, handle) = {
            let mut inner = self.lock();
            match mem::replace(&mut inner.session, ActiveSession::Idle) {
                ActiveSession::Playing {
                    note_id, handle, ..
                } => {
                    inner.notes.set_playing(None);
                    (note_id, handle)
                }
                other => {
                    inner.session = other;
                    return None;
                }
            }
        };

        if let Some(handle) = handle {
            if let Err(e) = self.backend.end_playback(handle).await {
                warn!(note_id = %note_id, error = ?e, "Failed to release playback");
            }
        }

        debug!(note_id = %note_id, "Playback released");

        Some(note_id)
    }

    /// Close a microphone opened after shutdown and drop what it captured.
    async fn release_orphan_recording(&self, handle: B::Recording) {
        match self.backend.finish_recording(handle).await {
            Ok(Some(audio)) => {
                if let Err(e) = self.backend.discard(&audio).await {
                    warn!(error = ?e, "Failed to discard recording after shutdown");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = ?e, "Failed to close recording after shutdown"),
        }
        self.restore_playback_session().await;
        info!("Recording abandoned, session closed");
    }

    async fn restore_playback_session(&self) {
        if let Err(e) = self
            .backend
            .configure_session(AudioSessionMode::Playback)
            .await
        {
            warn!(error = ?e, "Failed to restore audio session");
        }
    }
}
