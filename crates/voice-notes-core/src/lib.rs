//! Voice Notes Core Library
//!
//! Recording/playback session lifecycle for a voice-note app: a note store, an
//! audio backend abstraction with a cpal + hound implementation, and the
//! session manager that keeps the two consistent.
//!
//! # Example
//!
//! ```no_run
//! use voice_notes_core::{CoreResult, CpalBackend, NoteStore, SessionManager, demo_notes};
//!
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let backend = CpalBackend::new("recordings")?;
//!     let (manager, _finished_rx) =
//!         SessionManager::new(backend, NoteStore::with_notes(demo_notes()));
//!
//!     manager.start_recording().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     let outcome = manager.stop_recording().await?;
//!
//!     println!("{:?}, {} notes", outcome, manager.note_count());
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod notes;
mod session;

pub use {
    audio::{
        ActiveCapture, ActivePlayback, AudioBackend, AudioSessionMode, CpalBackend, Permission,
        PlaybackCompletion, PlaybackFinished,
    },
    error::{Result as CoreResult, SessionError},
    notes::{AudioRef, NoteId, NoteRecord, NoteStore, demo_notes},
    session::{IgnoreReason, Outcome, SessionManager, SessionMode},
};

#[cfg(test)]
mod tests;
