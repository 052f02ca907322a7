use crate::{SessionError, audio::playback::load_wav};

use std::path::PathBuf;

use hound::{SampleFormat, WavSpec, WavWriter};
use uuid::Uuid;

fn temp_wav() -> PathBuf {
    std::env::temp_dir().join(format!("voice-notes-test-{}.wav", Uuid::new_v4()))
}

/// WHAT: 16-bit WAV files decode to normalized floats
/// WHY: Playback feeds f32 samples regardless of the file's format
#[test]
#[allow(clippy::unwrap_used)]
fn given_int16_wav_when_loading_then_samples_normalized() {
    // Given: A stereo 16-bit WAV with known samples
    let path = temp_wav();
    let spec = WavSpec {
        channels: 2,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for sample in [0i16, 16_384, -16_384, i16::MIN] {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();

    // When: Loading it
    let decoded = load_wav(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    // Then: Format preserved, samples scaled into [-1, 1]
    assert_eq!(decoded.channels, 2);
    assert_eq!(decoded.sample_rate, 22_050);
    assert_eq!(decoded.samples, vec![0.0, 0.5, -0.5, -1.0]);
}

/// WHAT: Float WAV files decode unchanged
/// WHY: Recordings are written as 32-bit float
#[test]
#[allow(clippy::unwrap_used)]
fn given_float_wav_when_loading_then_samples_unchanged() {
    let path = temp_wav();
    let spec = WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for sample in [0.25f32, -0.75, 1.0] {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();

    let decoded = load_wav(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(decoded.samples, vec![0.25, -0.75, 1.0]);
}

/// WHAT: Missing or corrupt files are invalid resources
/// WHY: The session manager falls back to a visual toggle on InvalidResource
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_or_garbage_file_when_loading_then_invalid_resource() {
    // Given: One path that does not exist and one that is not a WAV
    let missing = temp_wav();
    let garbage = temp_wav();
    std::fs::write(&garbage, b"not a wav file").unwrap();

    // When: Loading both
    let missing_result = load_wav(&missing);
    let garbage_result = load_wav(&garbage);
    std::fs::remove_file(&garbage).unwrap();

    // Then: Both rejected as InvalidResource
    assert!(matches!(missing_result, Err(SessionError::InvalidResource { .. })));
    assert!(matches!(garbage_result, Err(SessionError::InvalidResource { .. })));
}
