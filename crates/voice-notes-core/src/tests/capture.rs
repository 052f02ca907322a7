use crate::audio::capture::PendingFile;

use std::path::PathBuf;

use uuid::Uuid;

#[allow(clippy::unwrap_used)]
fn scratch_file() -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("voice-notes-cap-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.wav", Uuid::new_v4()));
    std::fs::write(&path, b"RIFF").unwrap();
    (dir, path)
}

/// WHAT: A capture that never starts removes its file
/// WHY: Failed starts must not leave header-only WAV files in the recordings directory
#[test]
#[allow(clippy::unwrap_used)]
fn given_pending_file_when_start_fails_then_file_removed() {
    // Given: A freshly created recording file guarded as pending
    let (dir, path) = scratch_file();
    let pending = PendingFile::new(&path);

    // When: The start path bails out and the guard drops
    drop(pending);

    // Then: The file is gone and the directory is otherwise empty
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    std::fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: A started capture keeps its file
/// WHY: The running stream writes into it until finalize
#[test]
#[allow(clippy::unwrap_used)]
fn given_pending_file_when_kept_then_file_stays() {
    // Given: A guarded recording file
    let (dir, path) = scratch_file();

    // When: The capture starts and keeps it
    let kept = PendingFile::new(&path).keep();

    // Then: Same path, still on disk
    assert_eq!(kept, path);
    assert!(path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Guard tolerates a file that is already gone
/// WHY: Cleanup must not warn or fail when nothing was written
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_file_when_pending_guard_drops_then_no_error() {
    let (dir, path) = scratch_file();
    std::fs::remove_file(&path).unwrap();

    drop(PendingFile::new(&path));

    assert!(!path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}
