use crate::{CoreResult, SessionError, audio::playback::DecodedAudio};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Frames per resampler input chunk.
const CHUNK_FRAMES: usize = 1024;

/// Sample-rate converter for interleaved audio.
pub(crate) struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
    channels: usize,
    chunk_size: usize,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32, channels: u16) -> CoreResult<Self> {
        let channels = usize::from(channels.max(1));
        let chunk_size = CHUNK_FRAMES;
        let sub_chunks = 2;

        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            chunk_size,
            sub_chunks,
            channels,
            FixedSync::Input,
        )
        .map_err(|e| SessionError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, channels, chunk_size, "Resampler initialized");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            channels,
            chunk_size,
        })
    }

    /// Resample interleaved `samples`. The tail chunk is zero padded and the
    /// output cut back to the expected length.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let input_frames = samples.len() / self.channels;
        let estimated_frames =
            (input_frames as f64 * self.output_rate as f64 / self.input_rate as f64) as usize;
        let mut output = Vec::with_capacity(estimated_frames * self.channels);

        let chunk_len = self.chunk_size * self.channels;

        for chunk in samples.chunks(chunk_len) {
            let input_chunk = if chunk.len() < chunk_len {
                let mut padded = chunk.to_vec();
                padded.resize(chunk_len, 0.0);
                padded
            } else {
                chunk.to_vec()
            };

            let input_adapter = InterleavedSlice::new(&input_chunk, self.channels, self.chunk_size)
                .map_err(|e| SessionError::ResamplingError {
                    reason: format!("Failed to create input adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let output_frames = self.resampler.output_frames_max();
            let mut output_chunk = vec![0.0f32; output_frames * self.channels];

            let mut output_adapter =
                InterleavedSlice::new_mut(&mut output_chunk, self.channels, output_frames)
                    .map_err(|e| SessionError::ResamplingError {
                        reason: format!("Failed to create output adapter: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

            let (_input_frames, frames_written) = self
                .resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| SessionError::ResamplingError {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            output.extend_from_slice(&output_chunk[..frames_written * self.channels]);
        }

        output.truncate(estimated_frames * self.channels);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampled audio"
        );

        Ok(output)
    }
}

/// Change the channel count of interleaved audio.
///
/// Down to mono averages each frame; up from mono duplicates it. Other
/// layouts map output channel `c` to input channel `c % from`.
pub(crate) fn remix(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let from = usize::from(from);
    let to = usize::from(to);
    let frames = samples.chunks_exact(from);
    let mut out = Vec::with_capacity(frames.len() * to);

    for frame in frames {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend((0..to).map(|c| frame[c % from]));
        }
    }

    out
}

/// Convert decoded audio to the layout an output device accepts.
#[track_caller]
#[instrument(skip(audio), fields(from_channels = audio.channels, from_rate = audio.sample_rate))]
pub(crate) fn conform(audio: DecodedAudio, channels: u16, sample_rate: u32) -> CoreResult<DecodedAudio> {
    let samples = if audio.channels == channels {
        audio.samples
    } else {
        remix(&audio.samples, audio.channels, channels)
    };

    let samples = if audio.sample_rate == sample_rate {
        samples
    } else {
        Resampler::new(audio.sample_rate, sample_rate, channels)?.resample(&samples)?
    };

    debug!(channels, sample_rate, sample_count = samples.len(), "Audio conformed to output");

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}
