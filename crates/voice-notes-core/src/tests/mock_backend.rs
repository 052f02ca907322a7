use crate::{
    AudioBackend, AudioRef, AudioSessionMode, CoreResult, Permission, PlaybackCompletion,
    SessionError,
};

use std::{
    collections::HashMap,
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::sync::Notify;

/// Every backend call, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    RequestPermission,
    ConfigureSession(AudioSessionMode),
    BeginRecording(u32),
    FinishRecording(u32),
    BeginPlayback(u32, PathBuf),
    EndPlayback(u32),
    Discard(PathBuf),
}

#[derive(Debug)]
pub(crate) struct MockHandle(u32);

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    next_handle: u32,
    open_playbacks: u32,
    max_open_playbacks: u32,
    open_recordings: u32,
    completions: HashMap<u32, PlaybackCompletion>,
    deny_permission: bool,
    fail_begin_recording: bool,
    fail_finish_recording: bool,
    capture_nothing: bool,
    fail_begin_playback: bool,
    reject_resource: bool,
    recording_gate: Option<Arc<Notify>>,
    playback_gate: Option<Arc<Notify>>,
}

/// Scripted in-memory backend. Clones share state, so a test keeps one clone
/// to script and inspect the backend owned by the manager.
#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.with_state(|s| s.calls.clone())
    }

    pub(crate) fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.with_state(|s| s.calls.iter().filter(|c| matches(c)).count())
    }

    pub(crate) fn open_playbacks(&self) -> u32 {
        self.with_state(|s| s.open_playbacks)
    }

    pub(crate) fn max_open_playbacks(&self) -> u32 {
        self.with_state(|s| s.max_open_playbacks)
    }

    pub(crate) fn open_recordings(&self) -> u32 {
        self.with_state(|s| s.open_recordings)
    }

    pub(crate) fn deny_permission(&self) {
        self.with_state(|s| s.deny_permission = true);
    }

    pub(crate) fn fail_begin_recording(&self) {
        self.with_state(|s| s.fail_begin_recording = true);
    }

    pub(crate) fn fail_finish_recording(&self) {
        self.with_state(|s| s.fail_finish_recording = true);
    }

    pub(crate) fn capture_nothing(&self) {
        self.with_state(|s| s.capture_nothing = true);
    }

    pub(crate) fn fail_begin_playback(&self) {
        self.with_state(|s| s.fail_begin_playback = true);
    }

    pub(crate) fn reject_resource(&self) {
        self.with_state(|s| s.reject_resource = true);
    }

    /// Make `begin_recording` wait until the returned gate is notified.
    pub(crate) fn gate_begin_recording(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with_state(|s| s.recording_gate = Some(Arc::clone(&gate)));
        gate
    }

    /// Make `begin_playback` wait until the returned gate is notified.
    pub(crate) fn gate_begin_playback(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with_state(|s| s.playback_gate = Some(Arc::clone(&gate)));
        gate
    }

    /// Fire the completion of playback handle `id`, as the device would at
    /// end of data.
    pub(crate) fn finish_playback(&self, id: u32) {
        if let Some(completion) = self.with_state(|s| s.completions.remove(&id)) {
            completion.notify();
        }
    }

    fn device_error(reason: &str) -> SessionError {
        SessionError::DeviceError {
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[async_trait]
impl AudioBackend for MockBackend {
    type Recording = MockHandle;
    type Playback = MockHandle;

    async fn request_permission(&self) -> CoreResult<Permission> {
        Ok(self.with_state(|s| {
            s.calls.push(Call::RequestPermission);
            if s.deny_permission {
                Permission::Denied
            } else {
                Permission::Granted
            }
        }))
    }

    async fn configure_session(&self, mode: AudioSessionMode) -> CoreResult<()> {
        self.with_state(|s| s.calls.push(Call::ConfigureSession(mode)));
        Ok(())
    }

    async fn begin_recording(&self) -> CoreResult<MockHandle> {
        let gate = self.with_state(|s| s.recording_gate.take());
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.with_state(|s| {
            if s.fail_begin_recording {
                return Err(Self::device_error("microphone unavailable"));
            }
            s.next_handle += 1;
            s.open_recordings += 1;
            s.calls.push(Call::BeginRecording(s.next_handle));
            Ok(MockHandle(s.next_handle))
        })
    }

    async fn finish_recording(&self, handle: MockHandle) -> CoreResult<Option<AudioRef>> {
        self.with_state(|s| {
            s.open_recordings -= 1;
            s.calls.push(Call::FinishRecording(handle.0));
            if s.fail_finish_recording {
                Err(Self::device_error("finalize failed"))
            } else if s.capture_nothing {
                Ok(None)
            } else {
                Ok(Some(AudioRef::new(format!("/mock/{}.wav", handle.0))))
            }
        })
    }

    async fn begin_playback(
        &self,
        audio: &AudioRef,
        completion: PlaybackCompletion,
    ) -> CoreResult<MockHandle> {
        let gate = self.with_state(|s| s.playback_gate.take());
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.with_state(|s| {
            if s.reject_resource {
                return Err(SessionError::InvalidResource {
                    reason: "missing file".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            if s.fail_begin_playback {
                return Err(Self::device_error("output unavailable"));
            }
            s.next_handle += 1;
            s.open_playbacks += 1;
            s.max_open_playbacks = s.max_open_playbacks.max(s.open_playbacks);
            s.completions.insert(s.next_handle, completion);
            s.calls
                .push(Call::BeginPlayback(s.next_handle, audio.path().to_path_buf()));
            Ok(MockHandle(s.next_handle))
        })
    }

    async fn end_playback(&self, handle: MockHandle) -> CoreResult<()> {
        self.with_state(|s| {
            s.open_playbacks -= 1;
            s.completions.remove(&handle.0);
            s.calls.push(Call::EndPlayback(handle.0));
        });
        Ok(())
    }

    async fn discard(&self, audio: &AudioRef) -> CoreResult<()> {
        self.with_state(|s| s.calls.push(Call::Discard(audio.path().to_path_buf())));
        Ok(())
    }
}
