//! Transcript document persisted next to the extracted audio

use crate::{Result, Transcript, TranscriptSegment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON document describing one transcription run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptDocument {
    pub audio_file: PathBuf,
    pub language: String,
    pub segments: Vec<TranscriptSegment>,
    pub created_at: DateTime<Utc>,
}

impl TranscriptDocument {
    #[must_use]
    pub fn new(audio_file: &Path, transcript: Transcript) -> Self {
        Self {
            audio_file: audio_file.to_path_buf(),
            language: transcript.language,
            segments: transcript.segments,
            created_at: Utc::now(),
        }
    }

    /// Default location: alongside the audio, `<stem>_transcript.json`.
    #[must_use]
    pub fn default_path(audio_file: &Path) -> PathBuf {
        let stem = audio_file
            .file_stem()
            .map_or_else(|| "audio".into(), |s| s.to_string_lossy().into_owned());
        audio_file.with_file_name(format!("{stem}_transcript.json"))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(
            "Transcript with {} segments saved to {}",
            self.segments.len(),
            path.display()
        );
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// View the document as a transcript
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        Transcript {
            language: self.language.clone(),
            segments: self.segments.clone(),
        }
    }
}
