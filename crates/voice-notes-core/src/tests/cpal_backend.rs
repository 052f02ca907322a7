use crate::{AudioBackend, AudioRef, AudioSessionMode, CpalBackend, Permission};

use uuid::Uuid;

/// WHAT: Backend creates its recordings directory
/// WHY: First launch has no recordings directory yet
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_dir_when_creating_backend_then_dir_created() {
    // Given: A directory path that does not exist
    let dir = std::env::temp_dir().join(format!("voice-notes-rec-{}", Uuid::new_v4()));
    assert!(!dir.exists());

    // When: Creating the backend
    let backend = CpalBackend::new(&dir);

    // Then: Succeeds and the directory exists
    assert!(backend.is_ok());
    assert!(dir.is_dir());
    std::fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Desktop permission and session calls always succeed
/// WHY: Desktop hosts have no prompt or audio-session category
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_backend_when_requesting_permission_then_granted() {
    let dir = std::env::temp_dir().join(format!("voice-notes-rec-{}", Uuid::new_v4()));
    let backend = CpalBackend::new(&dir).unwrap();

    assert_eq!(backend.request_permission().await.unwrap(), Permission::Granted);
    assert!(backend.configure_session(AudioSessionMode::Recording).await.is_ok());
    std::fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Discard removes the file and tolerates a missing one
/// WHY: Deleting a note must not fail because its file is already gone
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_file_when_discarded_twice_then_removed_and_ok() {
    // Given: A backend and a file in its directory
    let dir = std::env::temp_dir().join(format!("voice-notes-rec-{}", Uuid::new_v4()));
    let backend = CpalBackend::new(&dir).unwrap();
    let path = dir.join("note.wav");
    std::fs::write(&path, b"data").unwrap();
    let audio = AudioRef::new(&path);

    // When: Discarding twice
    let first = backend.discard(&audio).await;
    let second = backend.discard(&audio).await;

    // Then: File removed, both calls succeed
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(!path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Playing a missing file is an invalid resource
/// WHY: Lets the session manager fall back to the visual toggle
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_file_when_beginning_playback_then_invalid_resource() {
    let dir = std::env::temp_dir().join(format!("voice-notes-rec-{}", Uuid::new_v4()));
    let backend = CpalBackend::new(&dir).unwrap();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let completion = crate::PlaybackCompletion::new(tx, "a".into(), 1);

    let result = backend
        .begin_playback(&AudioRef::new(dir.join("gone.wav")), completion)
        .await;

    assert!(matches!(result, Err(crate::SessionError::InvalidResource { .. })));
    std::fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Recording from the default microphone yields a WAV file
/// WHY: End-to-end check of the cpal + hound capture path
#[tokio::test]
#[allow(clippy::unwrap_used)]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn given_microphone_when_recording_briefly_then_wav_written() {
    let dir = std::env::temp_dir().join(format!("voice-notes-rec-{}", Uuid::new_v4()));
    let backend = CpalBackend::new(&dir).unwrap();

    let handle = backend.begin_recording().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    let audio = backend.finish_recording(handle).await.unwrap();

    let audio = audio.unwrap();
    assert!(audio.path().exists());
    std::fs::remove_dir_all(&dir).unwrap();
}
