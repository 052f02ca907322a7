//! Terminal input loop.
//!
//! Reads stdin line by line, parses each line into an [`AppCommand`] and
//! forwards it to the main application.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument};

/// Forwards parsed terminal lines to the app.
pub struct InputHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl InputHandler {
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run until `quit`, end of input, or a shutdown signal.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Input handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("End of input");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    };

                    let Some(command) = parse_line(&line) else {
                        continue;
                    };
                    debug!(?command, "Input parsed");

                    let quit = command == AppCommand::Shutdown;
                    self.send(command).await?;
                    if quit {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Parse one input line. `None` for blank lines; unknown input maps to `Help`.
pub fn parse_line(line: &str) -> Option<AppCommand> {
    // Text after the slash is the query as typed, spaces included.
    if let Some(query) = line.trim_start().strip_prefix('/') {
        return Some(AppCommand::Search {
            query: query.to_string(),
        });
    }

    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    let command = match (verb.to_lowercase().as_str(), rest) {
        ("record" | "r", _) => AppCommand::ToggleRecording,
        ("stop" | "s", _) => AppCommand::Stop,
        ("play" | "p", note) if !note.is_empty() => AppCommand::Play {
            note: note.to_string(),
        },
        ("rename", args) if !args.is_empty() => {
            let (note, title) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            AppCommand::Rename {
                note: note.to_string(),
                title: title.to_string(),
            }
        }
        ("delete" | "rm", note) if !note.is_empty() => AppCommand::Delete {
            note: note.to_string(),
        },
        ("y" | "yes", "") => AppCommand::Answer { confirmed: true },
        ("n" | "no", "") => AppCommand::Answer { confirmed: false },
        ("search", query) => AppCommand::Search {
            query: query.to_string(),
        },
        ("clear", _) => AppCommand::ClearSearch,
        ("list" | "ls", _) => AppCommand::List,
        ("quit" | "q" | "exit", _) => AppCommand::Shutdown,
        _ => AppCommand::Help,
    };

    Some(command)
}
