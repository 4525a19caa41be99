//! WAV loading for speech models

use crate::{Result, TranscriptionError};
use std::path::Path;
use tracing::debug;

/// Sample rate speech models are trained on
pub const EXPECTED_SAMPLE_RATE: u32 = 16000;

/// Read a 16 kHz mono WAV file as f32 samples in [-1.0, 1.0].
pub fn load_wav_samples(audio_path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(audio_path).map_err(|e| {
        TranscriptionError::AudioLoadError(format!("Failed to open WAV file: {e}"))
    })?;

    let spec = reader.spec();
    if spec.sample_rate != EXPECTED_SAMPLE_RATE {
        return Err(TranscriptionError::AudioLoadError(format!(
            "Expected 16kHz sample rate, got {}Hz",
            spec.sample_rate
        )));
    }
    if spec.channels != 1 {
        return Err(TranscriptionError::AudioLoadError(format!(
            "Expected mono audio, got {} channels",
            spec.channels
        )));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<f32>, _>>()
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>(),
    }
    .map_err(|e| TranscriptionError::AudioLoadError(format!("Failed to read sample: {e}")))?;

    debug!(
        "Loaded {} samples ({:.2}s) from {}",
        samples.len(),
        samples.len() as f64 / f64::from(EXPECTED_SAMPLE_RATE),
        audio_path.display()
    );

    Ok(samples)
}
