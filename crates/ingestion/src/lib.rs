//! Media ingestion: container validation, probing, and the audio stage
//!
//! The audio stage takes an uploaded video, checks that it can be handled,
//! pulls out a mono 16 kHz waveform and turns it into a persisted transcript.

pub mod audio_stage;
pub mod probe;

use std::path::{Path, PathBuf};
use thiserror::Error;
use video_analysis_common::ProcessingError;
use video_analysis_transcription::TranscriptionError;

pub use audio_stage::{AudioStage, AudioStageOutput};
pub use probe::{validate_video, FfprobeProbe, MediaProbe};

/// Container extensions accepted for analysis (lowercase, with dot)
pub const SUPPORTED_VIDEO_FORMATS: &[&str] = &[".mp4", ".mkv", ".avi", ".mov"];

/// Check the path's extension against [`SUPPORTED_VIDEO_FORMATS`], ignoring case.
#[must_use]
pub fn is_supported_container(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .is_some_and(|ext| SUPPORTED_VIDEO_FORMATS.contains(&ext.as_str()))
}

/// Audio stage failures, one variant per diagnosable cause
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Input file not found: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("Unsupported container: {0} (expected .mp4, .mkv, .avi or .mov)")]
    UnsupportedContainer(String),

    #[error("No audio track in {}", .0.display())]
    NoAudioTrack(PathBuf),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Extracted audio disappeared before transcription: {}", .0.display())]
    AudioMissing(PathBuf),

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestionError> for ProcessingError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::UnsupportedContainer(ext) => ProcessingError::UnsupportedFormat(ext),
            IngestionError::NoAudioTrack(_) => ProcessingError::NoAudioStream,
            IngestionError::ExtractionFailed(msg) | IngestionError::Probe(msg) => {
                ProcessingError::FFmpegError(msg)
            }
            IngestionError::Transcription(e) => e.into(),
            IngestionError::Io(e) => ProcessingError::IoError(e),
            other => ProcessingError::Other(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_containers() {
        assert!(is_supported_container(Path::new("clip.mp4")));
        assert!(is_supported_container(Path::new("/a/b/CLIP.MOV")));
        assert!(is_supported_container(Path::new("x.mkv")));
        assert!(is_supported_container(Path::new("x.avi")));
        assert!(!is_supported_container(Path::new("x.webm")));
        assert!(!is_supported_container(Path::new("noext")));
    }

    #[test]
    fn test_error_kinds_map_to_processing_errors() {
        let err: ProcessingError = IngestionError::NoAudioTrack(PathBuf::from("a.mp4")).into();
        assert!(matches!(err, ProcessingError::NoAudioStream));

        let err: ProcessingError = IngestionError::UnsupportedContainer(".flv".into()).into();
        assert!(matches!(err, ProcessingError::UnsupportedFormat(ext) if ext == ".flv"));

        let err: ProcessingError = IngestionError::AudioMissing(PathBuf::from("a.wav")).into();
        assert!(matches!(err, ProcessingError::Other(_)));
    }
}
