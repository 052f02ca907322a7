//! Voice Notes: record, list, play, rename and delete voice notes from the
//! terminal.

mod app;
mod app_command;
mod config;
mod dialog;
mod error;
mod input_handler;
#[cfg(test)]
mod tests;
mod view;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    dialog::{DeleteDialog, DialogOutcome, RenameDialog},
    error::{AppError, Result as AppResult},
    input_handler::InputHandler,
};

use crate::config::Config;

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use voice_notes_core::{CpalBackend, NoteStore, SessionManager, demo_notes};

/// How long to wait for the blocking stdin reader on exit.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(250);

/// Route logs to a daily rolling file so they stay out of the terminal UI.
///
/// The returned guard flushes buffered lines when dropped.
#[track_caller]
fn init_tracing(config: &Config) -> AppResult<WorkerGuard> {
    let log_dir = Config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "voice-notes.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .map_err(|e| AppError::LoggingError {
            reason: format!("Invalid log filter '{}': {}", config.logging.filter, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: format!("Failed to install subscriber: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = match init_tracing(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async move {
        let backend = match CpalBackend::new(&config.storage.recordings_dir) {
            Ok(backend) => backend,
            Err(e) => {
                error!("Failed to create audio backend: {:?}", e);
                std::process::exit(1);
            }
        };

        let notes = if config.behavior.seed_demo_notes {
            NoteStore::with_notes(demo_notes())
        } else {
            NoteStore::new()
        };

        let (session, finished_rx) = SessionManager::new(backend, notes);
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let input_handler = InputHandler::new(command_tx);

        let app = App {
            session,
            finished_rx,
            command_rx,
            shutdown_tx,
            view: Default::default(),
            pending_delete: None,
        };

        println!("{}", view::HELP);

        tokio::join!(
            async move {
                if let Err(e) = input_handler.run(shutdown_rx).await {
                    error!(error = ?e, "Input handler error");
                }
            },
            async move {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // The stdin reader may still be parked in a blocking read.
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    info!("Exited");
}
