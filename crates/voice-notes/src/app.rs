use crate::{
    AppCommand, AppError, AppResult, DeleteDialog, DialogOutcome, RenameDialog,
    view::{self, Snapshot, View},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument};
use voice_notes_core::{
    AudioBackend, CoreResult, NoteId, Outcome, PlaybackFinished, SessionManager, SessionMode,
};

/// Main application state.
///
/// Owns the session and applies commands and playback completions one at a
/// time, so intents never overlap.
pub struct App<B: AudioBackend> {
    pub(crate) session: SessionManager<B>,
    pub(crate) finished_rx: mpsc::UnboundedReceiver<PlaybackFinished>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) view: View,
    pub(crate) pending_delete: Option<DeleteDialog>,
}

impl<B: AudioBackend> App<B> {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voice Notes starting");
        self.render();

        loop {
            tokio::select! {
                Some(event) = self.finished_rx.recv() => {
                    if self.session.playback_finished(event).await {
                        self.render();
                    }
                }

                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("Command channel closed, shutting down");
                        break;
                    };
                    if cmd == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    if let Err(e) = self.handle_command(cmd).await {
                        error!(error = ?e, "Command failed");
                    }
                    self.render();
                }
            }
        }

        self.session.shutdown().await;

        let _ = self.shutdown_tx.send(true);
        info!("Voice Notes shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, cmd: AppCommand) -> AppResult<()> {
        // Any command other than an answer dismisses an open confirmation.
        if !matches!(cmd, AppCommand::Answer { .. }) {
            if let Some(dialog) = self.pending_delete.take() {
                debug!(?dialog, "Delete dialog dismissed");
            }
        }

        match cmd {
            AppCommand::ToggleRecording => {
                let result = if self.session.mode() == SessionMode::Recording {
                    self.session.stop_recording().await
                } else {
                    self.session.start_recording().await
                };
                report(result)?;
            }
            AppCommand::Stop => {
                let result = if self.session.mode() == SessionMode::Recording {
                    self.session.stop_recording().await
                } else {
                    self.session.stop_playing().await
                };
                report(result)?;
            }
            AppCommand::Play { note } => {
                let note_id = self.resolve(&note)?;
                report(self.session.play_note(&note_id).await)?;
            }
            AppCommand::Rename { note, title } => {
                let note_id = self.resolve(&note)?;
                let current = self.title_of(&note_id).unwrap_or_default();
                let dialog = RenameDialog::new(current);
                let initial = dialog.initial().to_string();
                match dialog.submit(&title) {
                    DialogOutcome::Confirmed(title) => self.session.rename_note(&note_id, &title)?,
                    DialogOutcome::Cancelled => {
                        println!("Rename cancelled, title stays \"{}\"", initial);
                    }
                }
            }
            AppCommand::Delete { note } => {
                let note_id = self.resolve(&note)?;
                let title = self.title_of(&note_id).unwrap_or_default();
                let dialog = DeleteDialog::new(note_id, title);
                println!("{}", dialog.prompt());
                self.pending_delete = Some(dialog);
            }
            AppCommand::Answer { confirmed } => match self.pending_delete.take() {
                Some(dialog) => match dialog.answer(confirmed) {
                    DialogOutcome::Confirmed(note_id) => {
                        report(self.session.delete_note(&note_id).await)?;
                    }
                    DialogOutcome::Cancelled => info!("Delete cancelled"),
                },
                None => debug!("Answer with no open dialog ignored"),
            },
            AppCommand::Search { query } => self.view.set_query(&query),
            AppCommand::ClearSearch => self.view.clear_query(),
            AppCommand::List => {}
            AppCommand::Help => println!("{}", view::HELP),
            AppCommand::Shutdown => {}
        }

        Ok(())
    }

    #[track_caller]
    fn resolve(&self, token: &str) -> AppResult<NoteId> {
        view::resolve_note(token, &self.session.notes()).ok_or_else(|| AppError::UnknownNote {
            token: token.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn title_of(&self, note_id: &NoteId) -> Option<String> {
        self.session
            .notes()
            .into_iter()
            .find(|note| &note.id == note_id)
            .map(|note| note.title)
    }

    fn render(&self) {
        if self.pending_delete.is_some() {
            return;
        }
        let snapshot = Snapshot {
            mode: self.session.mode(),
            visible: self.session.search(self.view.query()),
            total: self.session.note_count(),
            recording_elapsed: self.session.recording_elapsed(),
        };
        println!("\n{}", self.view.render(&snapshot));
    }
}

/// Log an intent's outcome. Dropped intents are not errors.
fn report(result: CoreResult<Outcome>) -> AppResult<()> {
    match result? {
        Outcome::Ignored(reason) => debug!(?reason, "Intent ignored"),
        outcome => info!(?outcome, "Intent applied"),
    }
    Ok(())
}
