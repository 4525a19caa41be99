//! Whisper.cpp backend

use crate::audio::load_wav_samples;
use crate::{
    Result, Transcriber, Transcript, TranscriptSegment, TranscriptionConfig, TranscriptionError,
};
use std::path::Path;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Transcription engine using Whisper.cpp
pub struct WhisperTranscriber {
    context: WhisperContext,
    config: TranscriptionConfig,
}

impl WhisperTranscriber {
    /// Load the model named in `config`.
    pub fn new(config: TranscriptionConfig) -> Result<Self> {
        let model_path = &config.model_path;
        if !model_path.exists() {
            return Err(TranscriptionError::ModelLoadError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        info!("Loading Whisper model from {}", model_path.display());

        let path_str = model_path.to_str().ok_or_else(|| {
            TranscriptionError::ModelLoadError("Invalid path encoding".to_string())
        })?;
        let context = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| TranscriptionError::ModelLoadError(e.to_string()))?;

        Ok(Self { context, config })
    }

    fn params(&self) -> FullParams<'_, '_> {
        let strategy = if self.config.beam_size > 1 {
            SamplingStrategy::BeamSearch {
                beam_size: i32::from(self.config.beam_size),
                patience: 1.0,
            }
        } else {
            SamplingStrategy::Greedy { best_of: 1 }
        };

        let mut params = FullParams::new(strategy);
        params.set_n_threads(self.config.num_threads as i32);
        if let Some(ref lang) = self.config.language {
            params.set_language(Some(lang.as_str()));
        }
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let samples = load_wav_samples(audio_path)?;

        let mut state = self
            .context
            .create_state()
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

        info!("Starting transcription of {}", audio_path.display());
        state
            .full(self.params(), &samples)
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

        let language = match &self.config.language {
            Some(lang) => lang.clone(),
            None => whisper_rs::get_lang_str(state.full_lang_id_from_state())
                .unwrap_or("en")
                .to_string(),
        };

        // Whisper timestamps are in 10 ms units
        let segments: Vec<TranscriptSegment> = state
            .as_iter()
            .map(|segment| {
                TranscriptSegment::new(
                    segment.start_timestamp() as f64 / 100.0,
                    segment.end_timestamp() as f64 / 100.0,
                    &segment.to_string(),
                )
            })
            .collect();

        debug!("Detected language: {}", language);
        info!(
            "Transcription complete: {} segments, {:.2}s duration",
            segments.len(),
            segments.last().map_or(0.0, |s| s.end)
        );

        Ok(Transcript { language, segments })
    }
}
