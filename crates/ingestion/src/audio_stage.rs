//! Audio stage: validate → extract → transcribe → persist transcript

use crate::probe::{validate_video, MediaProbe};
use crate::{IngestionError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, warn};
use video_analysis_audio_extractor::{AudioConfig, AudioExtractor};
use video_analysis_common::MediaInfo;
use video_analysis_transcription::{Transcriber, Transcript, TranscriptDocument};

/// Everything the audio stage produced for one video.
///
/// Audio and transcript live in a scratch directory owned by this value;
/// callers must move them somewhere stable before dropping it.
#[derive(Debug)]
pub struct AudioStageOutput {
    pub media: MediaInfo,
    pub audio_path: PathBuf,
    pub transcript_path: PathBuf,
    pub transcript: Transcript,
    work_dir: TempDir,
}

impl AudioStageOutput {
    /// Scratch directory holding the stage's files
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }
}

/// Audio extraction + transcription over borrowed capabilities
pub struct AudioStage<'a> {
    probe: &'a dyn MediaProbe,
    extractor: &'a dyn AudioExtractor,
    transcriber: &'a dyn Transcriber,
    audio_config: AudioConfig,
}

impl<'a> AudioStage<'a> {
    pub fn new(
        probe: &'a dyn MediaProbe,
        extractor: &'a dyn AudioExtractor,
        transcriber: &'a dyn Transcriber,
    ) -> Self {
        Self {
            probe,
            extractor,
            transcriber,
            audio_config: AudioConfig::for_transcription(),
        }
    }

    pub fn run(&self, video_path: &Path) -> Result<AudioStageOutput> {
        let media = validate_video(self.probe, video_path)?;

        let work_dir = tempfile::Builder::new().prefix("vaa1_audio_").tempdir()?;
        let audio_path = self
            .extractor
            .extract(video_path, work_dir.path(), &self.audio_config)
            .map_err(|e| IngestionError::ExtractionFailed(e.to_string()))?;
        info!("Audio extracted to {}", audio_path.display());

        if !audio_path.exists() {
            warn!("Extracted audio {} is gone", audio_path.display());
            return Err(IngestionError::AudioMissing(audio_path));
        }

        let transcript = self.transcriber.transcribe(&audio_path)?;
        info!(
            "Transcribed {} segments (language={})",
            transcript.segments.len(),
            transcript.language
        );

        let transcript_path = TranscriptDocument::default_path(&audio_path);
        TranscriptDocument::new(&audio_path, transcript.clone()).write(&transcript_path)?;

        Ok(AudioStageOutput {
            media,
            audio_path,
            transcript_path,
            transcript,
            work_dir,
        })
    }
}
