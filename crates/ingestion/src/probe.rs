//! Container probing with `ffprobe`

use crate::{is_supported_container, IngestionError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info};
use video_analysis_common::{tools::run_tool, MediaInfo, StreamInfo, StreamType};

/// Capability: read container metadata for a media file.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

/// Probe backed by the `ffprobe` command line tool
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: String,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }
}

impl FfprobeProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        debug!("Probing media file: {}", path.display());
        let args = [
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_format"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];
        let output =
            run_tool(&self.program, args).map_err(|e| IngestionError::Probe(e.to_string()))?;

        parse_ffprobe_json(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Validate an input video before audio work starts.
///
/// Checks, in order: the file exists, its extension is a supported
/// container, and the probed container has an audio track.
pub fn validate_video(probe: &dyn MediaProbe, path: &Path) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(IngestionError::InputMissing(path.to_path_buf()));
    }
    if !is_supported_container(path) {
        let ext = path
            .extension()
            .map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()));
        return Err(IngestionError::UnsupportedContainer(ext));
    }

    let info = probe.probe(path)?;
    if !info.has_audio() {
        return Err(IngestionError::NoAudioTrack(path.to_path_buf()));
    }

    info!(
        "Validated {}: {:.2}s, {} bytes, video={:?}, audio={:?}",
        path.display(),
        info.duration,
        info.size_bytes,
        info.video_stream().map(|s| s.codec.as_str()),
        info.audio_stream().map(|s| s.codec.as_str()),
    );
    Ok(info)
}

// ────────── ffprobe JSON parsing ──────────

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u8>,
}

/// Parse "30000/1001" or "25" style rates.
fn parse_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => rate.parse::<f64>().ok(),
    }
}

impl FfprobeStream {
    /// Average frame rate, falling back to the base rate when ffprobe
    /// reports none ("0/0").
    fn fps(&self) -> Option<f64> {
        self.avg_frame_rate
            .as_deref()
            .and_then(parse_rate)
            .filter(|fps| *fps > 0.0)
            .or_else(|| self.r_frame_rate.as_deref().and_then(parse_rate))
    }
}

/// Convert `ffprobe -print_format json` output into [`MediaInfo`].
pub fn parse_ffprobe_json(json: &str) -> Result<MediaInfo> {
    let parsed: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| IngestionError::Probe(format!("Failed to parse ffprobe output: {e}")))?;

    let streams = parsed
        .streams
        .iter()
        .filter_map(|s| {
            let stream_type = match s.codec_type.as_deref() {
                Some("video") => StreamType::Video,
                Some("audio") => StreamType::Audio,
                Some("subtitle") => StreamType::Subtitle,
                _ => return None,
            };
            Some(StreamInfo {
                stream_type,
                codec: s.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
                width: s.width,
                height: s.height,
                fps: s.fps(),
                sample_rate: s.sample_rate.as_deref().and_then(|r| r.parse().ok()),
                channels: s.channels,
            })
        })
        .collect();

    let format = parsed.format;
    Ok(MediaInfo {
        format: format.format_name.unwrap_or_else(|| "unknown".to_string()),
        duration: format
            .duration
            .as_deref()
            .and_then(|d| d.parse().ok())
            .unwrap_or(0.0),
        size_bytes: format
            .size
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        streams,
        metadata: format.tags.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720,
             "r_frame_rate": "60/1", "avg_frame_rate": "30000/1001"},
            {"codec_type": "audio", "codec_name": "aac", "sample_rate": "48000", "channels": 2},
            {"codec_type": "data", "codec_name": "bin_data"}
        ],
        "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "12.480000",
                   "size": "1048576", "tags": {"encoder": "Lavf60.3.100"}}
    }"#;

    struct FixedProbe(MediaInfo);

    impl MediaProbe for FixedProbe {
        fn probe(&self, _path: &Path) -> Result<MediaInfo> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_parse_ffprobe_json() {
        let info = parse_ffprobe_json(SAMPLE).unwrap();
        assert_eq!(info.streams.len(), 2);
        assert!((info.duration - 12.48).abs() < 1e-9);
        assert_eq!(info.size_bytes, 1_048_576);
        let video = info.video_stream().unwrap();
        assert_eq!(video.codec, "h264");
        assert!((video.fps.unwrap() - 29.97).abs() < 0.01);
        let audio = info.audio_stream().unwrap();
        assert_eq!(audio.sample_rate, Some(48000));
        assert_eq!(audio.channels, Some(2));
        assert_eq!(info.metadata.get("encoder").map(String::as_str), Some("Lavf60.3.100"));
    }

    #[test]
    fn test_fps_falls_back_to_base_rate() {
        let json = r#"{
            "streams": [
                {"codec_type": "video", "codec_name": "mjpeg", "width": 64, "height": 48,
                 "r_frame_rate": "25/1", "avg_frame_rate": "0/0"},
                {"codec_type": "video", "codec_name": "vp9", "width": 64, "height": 48,
                 "r_frame_rate": "24/1"}
            ],
            "format": {"format_name": "matroska,webm"}
        }"#;
        let info = parse_ffprobe_json(json).unwrap();
        let rates: Vec<Option<f64>> = info.streams.iter().map(|s| s.fps).collect();
        assert_eq!(rates, vec![Some(25.0), Some(24.0)]);
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("25"), Some(25.0));
        assert_eq!(parse_rate("25/0"), None);
        assert_eq!(parse_rate("garbage"), None);
    }

    #[test]
    fn test_parse_garbage_is_probe_error() {
        assert!(matches!(
            parse_ffprobe_json("not json"),
            Err(IngestionError::Probe(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        let probe = FixedProbe(parse_ffprobe_json(SAMPLE).unwrap());
        let err = validate_video(&probe, Path::new("/nonexistent/video.mp4")).unwrap_err();
        assert!(matches!(err, IngestionError::InputMissing(_)));
    }

    #[test]
    fn test_validate_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm");
        std::fs::write(&path, b"data").unwrap();

        let probe = FixedProbe(parse_ffprobe_json(SAMPLE).unwrap());
        let err = validate_video(&probe, &path).unwrap_err();
        assert!(matches!(err, IngestionError::UnsupportedContainer(ext) if ext == ".webm"));
    }

    #[test]
    fn test_validate_rejects_silent_video() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("silent.mp4");
        std::fs::write(&path, b"data").unwrap();

        let mut info = parse_ffprobe_json(SAMPLE).unwrap();
        info.streams.retain(|s| s.stream_type != StreamType::Audio);
        let err = validate_video(&FixedProbe(info), &path).unwrap_err();
        assert!(matches!(err, IngestionError::NoAudioTrack(_)));
    }
}
