use crate::{
    CoreResult, SessionError,
    audio::{
        AudioBackend, AudioSessionMode, Permission, PlaybackCompletion,
        capture::{ActiveCapture, AudioCapturer},
        playback::{ActivePlayback, load_wav},
    },
    notes::AudioRef,
};

use std::{
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Lets an in-flight input callback observe the shutdown flag before the WAV
/// writer is taken.
const CAPTURE_DRAIN_DELAY: Duration = Duration::from_millis(5);

/// Records WAV files with cpal + hound and plays them back on the default
/// output device.
///
/// Desktop hosts have no permission prompt or audio-session category, so
/// those calls always succeed.
pub struct CpalBackend {
    recordings_dir: PathBuf,
}

impl CpalBackend {
    /// Create a backend that stores recordings under `recordings_dir`.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the directory cannot be created.
    #[track_caller]
    #[instrument(skip(recordings_dir))]
    pub fn new<P: AsRef<Path>>(recordings_dir: P) -> CoreResult<Self> {
        let recordings_dir = recordings_dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&recordings_dir).map_err(|e| SessionError::DeviceError {
            reason: format!(
                "Failed to create recordings dir {}: {}",
                recordings_dir.display(),
                e
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(recordings_dir = ?recordings_dir, "CpalBackend initialized");

        Ok(Self { recordings_dir })
    }

    fn next_recording_path(&self) -> PathBuf {
        self.recordings_dir.join(format!("{}.wav", Uuid::new_v4()))
    }
}

#[async_trait]
impl AudioBackend for CpalBackend {
    type Recording = ActiveCapture;
    type Playback = ActivePlayback;

    async fn request_permission(&self) -> CoreResult<Permission> {
        Ok(Permission::Granted)
    }

    async fn configure_session(&self, mode: AudioSessionMode) -> CoreResult<()> {
        debug!(?mode, "Audio session mode");
        Ok(())
    }

    async fn begin_recording(&self) -> CoreResult<ActiveCapture> {
        let path = self.next_recording_path();
        AudioCapturer::new()?.start(&path)
    }

    async fn finish_recording(&self, mut handle: ActiveCapture) -> CoreResult<Option<AudioRef>> {
        handle.halt();
        tokio::time::sleep(CAPTURE_DRAIN_DELAY).await;
        Ok(handle.finalize()?.map(AudioRef::new))
    }

    async fn begin_playback(
        &self,
        audio: &AudioRef,
        completion: PlaybackCompletion,
    ) -> CoreResult<ActivePlayback> {
        let decoded = load_wav(audio.path())?;
        ActivePlayback::start(decoded, completion)
    }

    async fn end_playback(&self, handle: ActivePlayback) -> CoreResult<()> {
        handle.stop();
        Ok(())
    }

    async fn discard(&self, audio: &AudioRef) -> CoreResult<()> {
        match std::fs::remove_file(audio.path()) {
            Ok(()) => {
                debug!(path = ?audio.path(), "Recording file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = ?audio.path(), "Recording file already gone");
                Ok(())
            }
            Err(e) => Err(SessionError::DeviceError {
                reason: format!("Failed to remove {}: {}", audio.path().display(), e),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
