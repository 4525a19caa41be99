//! Visual stage: frame-by-frame analysis of a video
//!
//! Frames are pulled from a [`FrameSource`], every frame goes through object
//! detection, text recognition runs at most once per elapsed second of video
//! time, and both result sets are drawn onto the frame. Annotated frames can
//! be written to a [`FrameSink`] and/or handed to a [`FrameDisplay`]. At the
//! end the detections are exported as CSV tables plus a JSON summary.

pub mod annotate;
pub mod export;
pub mod io;
pub mod stage;

use thiserror::Error;
use video_analysis_common::ProcessingError;
use video_analysis_object_detection::ObjectDetectionError;
use video_analysis_ocr::OCRError;

pub use export::{DetectionRecord, TextRecord, VisualSummary};
pub use io::{
    DisplayControl, FfmpegFrameReader, FfmpegVideoBackend, FfmpegVideoWriter, FrameDisplay,
    FrameSink, FrameSource, VideoBackend, VideoProperties,
};
pub use stage::{VisualStage, VisualStageOptions, VisualStageOutput};

/// Errors raised by the visual stage
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Cannot open video {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Frame decoding failed: {0}")]
    Decode(String),

    #[error("Video encoding failed: {0}")]
    Encode(String),

    #[error("Object detection failed: {0}")]
    Detection(#[from] ObjectDetectionError),

    #[error("Text recognition failed: {0}")]
    Ocr(#[from] OCRError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FrameError> for ProcessingError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => ProcessingError::IoError(e),
            FrameError::Open { path, reason } => {
                ProcessingError::CorruptedFile(format!("{path}: {reason}"))
            }
            FrameError::Decode(msg) | FrameError::Encode(msg) => ProcessingError::FFmpegError(msg),
            FrameError::Detection(e) => e.into(),
            FrameError::Ocr(e) => e.into(),
            other => ProcessingError::Other(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
