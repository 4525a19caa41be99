//! Speech transcription
//!
//! Defines the [`Transcriber`] capability, the transcript data model and the
//! on-disk transcript document. The Whisper.cpp backend is compiled in with
//! the `whisper` feature.

pub mod audio;
pub mod document;
#[cfg(feature = "whisper")]
pub mod whisper;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use video_analysis_common::{round_to, ProcessingError};

pub use document::TranscriptDocument;
#[cfg(feature = "whisper")]
pub use whisper::WhisperTranscriber;

/// Transcription errors
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Failed to load model: {0}")]
    ModelLoadError(String),

    #[error("Failed to load audio: {0}")]
    AudioLoadError(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Invalid transcript document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<TranscriptionError> for ProcessingError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::IoError(e) => ProcessingError::IoError(e),
            other => ProcessingError::ModelError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TranscriptionError>;

/// A time-coded piece of transcribed speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment start time in seconds
    pub start: f64,
    /// Segment end time in seconds
    pub end: f64,
    /// Segment text
    pub text: String,
}

impl TranscriptSegment {
    /// Build a segment with times rounded to centiseconds and text trimmed.
    #[must_use]
    pub fn new(start: f64, end: f64, text: &str) -> Self {
        Self {
            start: round_to(start, 2),
            end: round_to(end, 2),
            text: text.trim().to_string(),
        }
    }
}

/// Complete transcript of one audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Detected or configured language code
    pub language: String,
    /// Segments in playback order
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Segment texts joined by single spaces
    #[must_use]
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Get total duration
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end)
    }
}

/// Transcription configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Path to the model weights
    pub model_path: PathBuf,

    /// Language code (e.g., "en", "es") or None for auto-detection
    pub language: Option<String>,

    /// Beam search size, 1 selects greedy decoding
    pub beam_size: u8,

    /// Number of threads for CPU inference
    pub num_threads: usize,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.bin"),
            language: None,
            beam_size: 5,
            num_threads: num_cpus::get(),
        }
    }
}

/// Capability: turn a 16 kHz mono WAV file into a transcript.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}
