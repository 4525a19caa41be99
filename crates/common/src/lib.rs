//! Common types and utilities for the video analysis pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod tools;

/// Processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No audio stream found")]
    NoAudioStream,

    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    #[error("FFmpeg error: {0}")]
    FFmpegError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Stream type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
}

/// Information about a media stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    pub stream_type: StreamType,
    pub codec: String,

    // Video-specific fields
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,

    // Audio-specific fields
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
}

/// Complete media file information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub format: String,
    pub duration: f64,
    pub size_bytes: u64,
    pub streams: Vec<StreamInfo>,
    pub metadata: HashMap<String, String>,
}

impl MediaInfo {
    /// Find the first video stream
    #[must_use]
    pub fn video_stream(&self) -> Option<&StreamInfo> {
        self.streams
            .iter()
            .find(|s| s.stream_type == StreamType::Video)
    }

    /// Find the first audio stream
    #[must_use]
    pub fn audio_stream(&self) -> Option<&StreamInfo> {
        self.streams
            .iter()
            .find(|s| s.stream_type == StreamType::Audio)
    }

    /// Check if the file has audio
    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.audio_stream().is_some()
    }
}

/// Round to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(stream_type: StreamType, codec: &str) -> StreamInfo {
        StreamInfo {
            stream_type,
            codec: codec.to_string(),
            width: None,
            height: None,
            fps: None,
            sample_rate: None,
            channels: None,
        }
    }

    #[test]
    fn test_media_info_stream_lookup() {
        let info = MediaInfo {
            format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: 12.5,
            size_bytes: 1024,
            streams: vec![stream(StreamType::Video, "h264"), stream(StreamType::Audio, "aac")],
            metadata: HashMap::new(),
        };
        assert_eq!(info.video_stream().map(|s| s.codec.as_str()), Some("h264"));
        assert!(info.has_audio());
        assert_eq!(info.audio_stream().map(|s| s.codec.as_str()), Some("aac"));
    }

    #[test]
    fn test_media_info_without_audio() {
        let info = MediaInfo {
            format: "matroska,webm".to_string(),
            duration: 3.0,
            size_bytes: 10,
            streams: vec![stream(StreamType::Video, "vp9")],
            metadata: HashMap::new(),
        };
        assert!(!info.has_audio());
        assert!(info.audio_stream().is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(2.005_1, 2), 2.01);
        assert_eq!(round_to(-0.004, 2), -0.0);
    }

    #[test]
    fn test_stream_type_serialization() {
        let json = serde_json::to_string(&StreamType::Audio).unwrap();
        assert_eq!(json, "\"audio\"");
    }
}
