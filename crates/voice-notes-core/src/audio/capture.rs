use crate::{CoreResult, SessionError};

use std::{
    fs::File,
    io::BufWriter,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        {Arc, Mutex},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, error, info, instrument, warn};

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

/// Default input device, resolved when a recording starts.
pub(crate) struct AudioCapturer {
    device: Device,
    config: StreamConfig,
}

impl AudioCapturer {
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(SessionError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Input device resolved"
        );

        Ok(Self {
            device,
            config: config.into(),
        })
    }

    /// Open the microphone and stream samples into a WAV file at `path`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(self, path: &Path) -> CoreResult<ActiveCapture> {
        let spec = WavSpec {
            channels: self.config.channels,
            sample_rate: self.config.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec).map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to create {}: {}", path.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let pending = PendingFile::new(path);

        let writer: SharedWriter = Arc::new(Mutex::new(Some(writer)));
        let shutdown = Arc::new(AtomicBool::new(false));
        let written = Arc::new(AtomicUsize::new(0));

        let cb_writer = Arc::clone(&writer);
        let cb_shutdown = Arc::clone(&shutdown);
        let cb_written = Arc::clone(&written);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Once halt() sets the flag no callback touches the writer.
                    if cb_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let mut guard = cb_writer.lock().unwrap_or_else(|e| {
                        error!("WAV writer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    let Some(writer) = guard.as_mut() else {
                        return;
                    };
                    for &sample in data {
                        if let Err(e) = writer.write_sample(sample) {
                            error!("Failed to write sample: {}", e);
                            cb_shutdown.store(true, Ordering::Release);
                            return;
                        }
                    }
                    cb_written.fetch_add(data.len(), Ordering::Relaxed);
                },
                |err| {
                    error!("Input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to build input stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to start input stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?path, "Audio capture started");

        Ok(ActiveCapture {
            stream: Some(stream),
            writer,
            shutdown,
            written,
            path: pending.keep(),
        })
    }
}

/// A file created for a capture that has not started yet.
///
/// Dropping the guard removes the file, so a failed start leaves no
/// header-only WAV behind. Must be declared before anything holding the file
/// open, so it drops last.
pub(crate) struct PendingFile {
    path: Option<PathBuf>,
}

impl PendingFile {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    /// Capture is running; keep the file.
    pub(crate) fn keep(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = ?path, "Removed file of failed capture"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = ?path, error = %e, "Failed to remove file of failed capture"),
        }
    }
}

/// Open microphone stream writing into a WAV file.
pub struct ActiveCapture {
    stream: Option<Stream>,
    writer: SharedWriter,
    shutdown: Arc<AtomicBool>,
    written: Arc<AtomicUsize>,
    path: PathBuf,
}

impl ActiveCapture {
    /// Stop the callback and drop the stream, releasing the microphone.
    pub(crate) fn halt(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Audio capture stopped");
        }
    }

    /// Flush the WAV file. Returns `None` and removes the file when nothing was
    /// captured.
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    pub(crate) fn finalize(mut self) -> CoreResult<Option<PathBuf>> {
        self.halt();

        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let Some(writer) = writer else {
            return Err(SessionError::DeviceError {
                reason: "Recording already finalized".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        writer.finalize().map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to finalize recording: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let sample_count = self.written.load(Ordering::Relaxed);
        debug!(sample_count, "Captured audio samples");

        if sample_count == 0 {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(error = %e, "Failed to remove empty recording");
            }
            return Ok(None);
        }

        Ok(Some(self.path.clone()))
    }
}
