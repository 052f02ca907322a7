mod backend;
pub(crate) mod capture;
mod cpal_backend;
pub(crate) mod playback;
pub(crate) mod resampler;

pub use {
    backend::{AudioBackend, AudioSessionMode, Permission, PlaybackCompletion, PlaybackFinished},
    capture::ActiveCapture,
    cpal_backend::CpalBackend,
    playback::ActivePlayback,
};
