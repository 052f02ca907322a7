use crate::{
    CoreResult, SessionError,
    audio::{PlaybackCompletion, resampler},
};

use std::{panic::Location, path::Path};

use cpal::{
    Device, FromSample, Sample, SampleFormat as DeviceSampleFormat, SizedSample, Stream,
    StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader};
use tracing::{debug, error, info, instrument};

/// Interleaved samples decoded from a WAV file.
#[derive(Debug, Clone)]
pub(crate) struct DecodedAudio {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Read a WAV file into memory as normalized `f32` samples.
///
/// # Errors
///
/// `InvalidResource` when the file is missing or not a readable WAV.
#[track_caller]
#[instrument]
pub(crate) fn load_wav(path: &Path) -> CoreResult<DecodedAudio> {
    let invalid = |reason: String| SessionError::InvalidResource {
        reason,
        location: ErrorLocation::from(Location::caller()),
    };

    let mut reader =
        WavReader::open(path).map_err(|e| invalid(format!("{}: {}", path.display(), e)))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invalid(format!("Corrupt samples: {}", e)))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| invalid(format!("Corrupt samples: {}", e)))?
        }
    };

    debug!(
        sample_count = samples.len(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        "WAV decoded"
    );

    Ok(DecodedAudio {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Open output stream playing one decoded file.
pub struct ActivePlayback {
    stream: Option<Stream>,
}

impl ActivePlayback {
    /// Start playing on the default output device.
    ///
    /// The audio is remixed and resampled to the device's default output
    /// config first. `completion` fires once, from the audio thread, after the
    /// last sample has been handed to the device.
    #[track_caller]
    #[instrument(skip(audio, completion), fields(sample_count = audio.samples.len()))]
    pub(crate) fn start(audio: DecodedAudio, completion: PlaybackCompletion) -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(SessionError::NoOutputDevice {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let supported = device
            .default_output_config()
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        let config: StreamConfig = supported.config();

        let audio = resampler::conform(audio, config.channels, config.sample_rate)?;

        let stream = match supported.sample_format() {
            DeviceSampleFormat::F32 => build_stream::<f32>(&device, &config, audio.samples, completion),
            DeviceSampleFormat::I16 => build_stream::<i16>(&device, &config, audio.samples, completion),
            DeviceSampleFormat::U16 => build_stream::<u16>(&device, &config, audio.samples, completion),
            DeviceSampleFormat::I32 => build_stream::<i32>(&device, &config, audio.samples, completion),
            other => {
                return Err(SessionError::DeviceError {
                    reason: format!("Unsupported output sample format: {}", other),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
        .map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to build output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        stream.play().map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to start output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(
            device_id = ?device.id(),
            channels = config.channels,
            sample_rate = config.sample_rate,
            sample_format = %supported.sample_format(),
            "Playback started"
        );

        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Drop the output stream.
    pub(crate) fn stop(mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Playback stopped");
        }
    }
}

/// Output stream feeding `samples` in the device's sample type.
fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Vec<f32>,
    completion: PlaybackCompletion,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut position = 0usize;
    let mut completion = Some(completion);

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for out in data.iter_mut() {
                let sample = samples.get(position).copied().unwrap_or(0.0);
                *out = T::from_sample(sample);
                position = position.saturating_add(1);
            }
            if position >= samples.len() {
                if let Some(done) = completion.take() {
                    done.notify();
                }
            }
        },
        |err| {
            error!("Output stream error: {}", err);
        },
        None,
    )
}
