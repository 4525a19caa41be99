//! Audio stage behaviour against stand-in probe/extractor/transcriber

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use video_analysis_audio_extractor::{AudioConfig, AudioExtractor};
use video_analysis_common::{MediaInfo, ProcessingError, StreamInfo, StreamType};
use video_analysis_ingestion::{AudioStage, IngestionError, MediaProbe};
use video_analysis_transcription::{
    Transcriber, Transcript, TranscriptDocument, TranscriptSegment, TranscriptionError,
};

struct StaticProbe {
    has_audio: bool,
}

impl MediaProbe for StaticProbe {
    fn probe(&self, _path: &Path) -> video_analysis_ingestion::Result<MediaInfo> {
        let mut streams = vec![StreamInfo {
            stream_type: StreamType::Video,
            codec: "h264".to_string(),
            width: Some(64),
            height: Some(48),
            fps: Some(25.0),
            sample_rate: None,
            channels: None,
        }];
        if self.has_audio {
            streams.push(StreamInfo {
                stream_type: StreamType::Audio,
                codec: "aac".to_string(),
                width: None,
                height: None,
                fps: None,
                sample_rate: Some(44100),
                channels: Some(2),
            });
        }
        Ok(MediaInfo {
            format: "mp4".to_string(),
            duration: 4.0,
            size_bytes: 5,
            streams,
            metadata: HashMap::new(),
        })
    }
}

/// Writes a placeholder WAV into the output directory.
struct TouchExtractor;

impl AudioExtractor for TouchExtractor {
    fn extract(
        &self,
        _input: &Path,
        output_dir: &Path,
        _config: &AudioConfig,
    ) -> video_analysis_common::Result<PathBuf> {
        let path = output_dir.join("clip.wav");
        std::fs::write(&path, b"RIFF")?;
        Ok(path)
    }
}

/// Reports success but never writes the file.
struct VanishingExtractor;

impl AudioExtractor for VanishingExtractor {
    fn extract(
        &self,
        _input: &Path,
        output_dir: &Path,
        _config: &AudioConfig,
    ) -> video_analysis_common::Result<PathBuf> {
        Ok(output_dir.join("ghost.wav"))
    }
}

struct BrokenExtractor;

impl AudioExtractor for BrokenExtractor {
    fn extract(
        &self,
        _input: &Path,
        _output_dir: &Path,
        _config: &AudioConfig,
    ) -> video_analysis_common::Result<PathBuf> {
        Err(ProcessingError::FFmpegError("exit status 1".to_string()))
    }
}

struct ScriptedTranscriber;

impl Transcriber for ScriptedTranscriber {
    fn transcribe(&self, _audio: &Path) -> Result<Transcript, TranscriptionError> {
        Ok(Transcript {
            language: "en".to_string(),
            segments: vec![
                TranscriptSegment::new(0.0, 1.234, " The council met today. "),
                TranscriptSegment::new(1.234, 2.5, "They voted because of the budget."),
            ],
        })
    }
}

fn video_in(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"video").unwrap();
    path
}

#[test]
fn test_audio_stage_writes_transcript_document() {
    let dir = tempfile::tempdir().unwrap();
    let video = video_in(dir.path(), "clip.mp4");
    let (probe, extractor, transcriber) = (
        StaticProbe { has_audio: true },
        TouchExtractor,
        ScriptedTranscriber,
    );

    let output = AudioStage::new(&probe, &extractor, &transcriber)
        .run(&video)
        .unwrap();

    assert!(output.audio_path.exists());
    assert!(output.transcript_path.exists());
    assert!(output.audio_path.starts_with(output.work_dir()));
    assert!(output
        .work_dir()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("vaa1_audio_"));

    let doc = TranscriptDocument::read(&output.transcript_path).unwrap();
    assert_eq!(doc.segments, output.transcript.segments);
    assert_eq!(doc.segments[0].text, "The council met today.");
    assert_eq!(doc.segments[0].end, 1.23);
    assert_eq!(doc.language, "en");
}

#[test]
fn test_scratch_directory_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let video = video_in(dir.path(), "clip.mp4");
    let (probe, extractor, transcriber) = (
        StaticProbe { has_audio: true },
        TouchExtractor,
        ScriptedTranscriber,
    );

    let output = AudioStage::new(&probe, &extractor, &transcriber)
        .run(&video)
        .unwrap();
    let work_dir = output.work_dir().to_path_buf();
    drop(output);
    assert!(!work_dir.exists());
}

#[test]
fn test_unsupported_container() {
    let dir = tempfile::tempdir().unwrap();
    let video = video_in(dir.path(), "clip.flv");
    let (probe, extractor, transcriber) = (
        StaticProbe { has_audio: true },
        TouchExtractor,
        ScriptedTranscriber,
    );

    let err = AudioStage::new(&probe, &extractor, &transcriber)
        .run(&video)
        .unwrap_err();
    assert!(matches!(err, IngestionError::UnsupportedContainer(_)));
}

#[test]
fn test_no_audio_track() {
    let dir = tempfile::tempdir().unwrap();
    let video = video_in(dir.path(), "silent.mov");
    let (probe, extractor, transcriber) = (
        StaticProbe { has_audio: false },
        TouchExtractor,
        ScriptedTranscriber,
    );

    let err = AudioStage::new(&probe, &extractor, &transcriber)
        .run(&video)
        .unwrap_err();
    assert!(matches!(err, IngestionError::NoAudioTrack(_)));
}

#[test]
fn test_extraction_failure() {
    let dir = tempfile::tempdir().unwrap();
    let video = video_in(dir.path(), "clip.mkv");
    let (probe, extractor, transcriber) = (
        StaticProbe { has_audio: true },
        BrokenExtractor,
        ScriptedTranscriber,
    );

    let err = AudioStage::new(&probe, &extractor, &transcriber)
        .run(&video)
        .unwrap_err();
    assert!(matches!(err, IngestionError::ExtractionFailed(msg) if msg.contains("exit status")));
}

#[test]
fn test_audio_disappeared() {
    let dir = tempfile::tempdir().unwrap();
    let video = video_in(dir.path(), "clip.avi");
    let (probe, extractor, transcriber) = (
        StaticProbe { has_audio: true },
        VanishingExtractor,
        ScriptedTranscriber,
    );

    let err = AudioStage::new(&probe, &extractor, &transcriber)
        .run(&video)
        .unwrap_err();
    assert!(matches!(err, IngestionError::AudioMissing(_)));
}
