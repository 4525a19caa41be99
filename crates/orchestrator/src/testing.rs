//! Stand-in capabilities for exercising the pipeline without models or ffmpeg

use crate::backend::{MediaToolkit, ModelFactory, ModelResult};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use video_analysis_audio_extractor::{output_path_for, AudioConfig, AudioExtractor};
use video_analysis_common::{MediaInfo, StreamInfo, StreamType};
use video_analysis_frames::{
    FrameError, FrameSink, FrameSource, VideoBackend, VideoProperties,
};
use video_analysis_ingestion::{IngestionError, MediaProbe};
use video_analysis_linguistic::{LexiconTagger, LinguisticError, LinguisticTagger, ParsedDoc};
use video_analysis_object_detection::{BoundingBox, Detection, Detector, ObjectDetectionError};
use video_analysis_ocr::{OCRError, TextRecognizer, TextRegion};
use video_analysis_transcription::{
    Transcriber, Transcript, TranscriptSegment, TranscriptionError,
};

/// Reports the same detections for every frame
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    pub detections: Vec<Detection>,
}

impl Detector for StaticDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>, ObjectDetectionError> {
        Ok(self.detections.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>, ObjectDetectionError> {
        Err(ObjectDetectionError::Inference("detector offline".to_string()))
    }
}

/// Reports the same text regions whenever asked
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    pub regions: Vec<TextRegion>,
}

impl TextRecognizer for StaticRecognizer {
    fn recognize(&mut self, _frame: &RgbImage) -> Result<Vec<TextRegion>, OCRError> {
        Ok(self.regions.clone())
    }
}

/// Returns a fixed transcript, optionally after blocking for a while
#[derive(Debug, Clone)]
pub struct ScriptedTranscriber {
    pub transcript: Transcript,
    pub delay: Option<Duration>,
}

impl ScriptedTranscriber {
    #[must_use]
    pub fn new(language: &str, lines: &[(f64, f64, &str)]) -> Self {
        Self {
            transcript: Transcript {
                language: language.to_string(),
                segments: lines
                    .iter()
                    .map(|(start, end, text)| TranscriptSegment::new(*start, *end, text))
                    .collect(),
            },
            delay: None,
        }
    }
}

impl Transcriber for ScriptedTranscriber {
    fn transcribe(&self, audio_path: &Path) -> video_analysis_transcription::Result<Transcript> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if !audio_path.exists() {
            return Err(TranscriptionError::AudioLoadError(format!(
                "{} does not exist",
                audio_path.display()
            )));
        }
        Ok(self.transcript.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTranscriber;

impl Transcriber for FailingTranscriber {
    fn transcribe(&self, _audio_path: &Path) -> video_analysis_transcription::Result<Transcript> {
        Err(TranscriptionError::TranscriptionFailed(
            "decoder crashed".to_string(),
        ))
    }
}

/// Panics instead of transcribing
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingTranscriber;

impl Transcriber for PanickingTranscriber {
    fn transcribe(&self, _audio_path: &Path) -> video_analysis_transcription::Result<Transcript> {
        panic!("transcriber poisoned");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTagger;

impl LinguisticTagger for FailingTagger {
    fn name(&self) -> &str {
        "failing"
    }

    fn parse(&self, _text: &str) -> video_analysis_linguistic::Result<ParsedDoc> {
        Err(LinguisticError::Tagger("tagger offline".to_string()))
    }
}

/// Model factory handing out the fakes above
#[derive(Debug, Clone)]
pub struct FakeModels {
    pub detector: StaticDetector,
    pub recognizer: StaticRecognizer,
    pub transcriber: ScriptedTranscriber,
    pub fail_visual: bool,
    pub fail_audio: bool,
    pub panic_audio: bool,
    pub fail_linguistic: bool,
}

impl FakeModels {
    /// One person per frame, an "EXIT" sign, and a two-line transcript.
    #[must_use]
    pub fn new() -> Self {
        Self {
            detector: StaticDetector {
                detections: vec![Detection {
                    class_id: 0,
                    class_name: "person".to_string(),
                    confidence: 0.9,
                    bbox: BoundingBox::new(4.0, 4.0, 20.0, 28.0),
                }],
            },
            recognizer: StaticRecognizer {
                regions: vec![TextRegion::from_rect("EXIT", 0.95, 18.0, 2.0, 10.0, 6.0)],
            },
            transcriber: ScriptedTranscriber::new(
                "en",
                &[
                    (0.0, 2.4, "Maria fixed the bike in Paris yesterday."),
                    (2.4, 5.0, "She used a wrench because the chain broke."),
                ],
            ),
            fail_visual: false,
            fail_audio: false,
            panic_audio: false,
            fail_linguistic: false,
        }
    }

    #[must_use]
    pub fn failing_visual(mut self) -> Self {
        self.fail_visual = true;
        self
    }

    #[must_use]
    pub fn failing_audio(mut self) -> Self {
        self.fail_audio = true;
        self
    }

    #[must_use]
    pub fn panicking_audio(mut self) -> Self {
        self.panic_audio = true;
        self
    }

    #[must_use]
    pub fn failing_linguistic(mut self) -> Self {
        self.fail_linguistic = true;
        self
    }

    #[must_use]
    pub fn with_transcribe_delay(mut self, delay: Duration) -> Self {
        self.transcriber.delay = Some(delay);
        self
    }
}

impl Default for FakeModels {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelFactory for FakeModels {
    fn detector(&self) -> ModelResult<Box<dyn Detector>> {
        if self.fail_visual {
            Ok(Box::new(FailingDetector))
        } else {
            Ok(Box::new(self.detector.clone()))
        }
    }

    fn recognizer(&self) -> ModelResult<Box<dyn TextRecognizer>> {
        Ok(Box::new(self.recognizer.clone()))
    }

    fn transcriber(&self) -> ModelResult<Box<dyn Transcriber>> {
        if self.panic_audio {
            Ok(Box::new(PanickingTranscriber))
        } else if self.fail_audio {
            Ok(Box::new(FailingTranscriber))
        } else {
            Ok(Box::new(self.transcriber.clone()))
        }
    }

    fn tagger(&self) -> ModelResult<Box<dyn LinguisticTagger>> {
        if self.fail_linguistic {
            Ok(Box::new(FailingTagger))
        } else {
            Ok(Box::new(LexiconTagger::new()))
        }
    }
}

/// Probe describing every existing file as a short clip
#[derive(Debug, Clone, Copy)]
pub struct FakeProbe {
    pub has_audio: bool,
}

impl MediaProbe for FakeProbe {
    fn probe(&self, path: &Path) -> video_analysis_ingestion::Result<MediaInfo> {
        let size_bytes = std::fs::metadata(path)
            .map_err(|_| IngestionError::InputMissing(path.to_path_buf()))?
            .len();
        let mut streams = vec![StreamInfo {
            stream_type: StreamType::Video,
            codec: "h264".to_string(),
            width: Some(32),
            height: Some(32),
            fps: Some(5.0),
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
            format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: 2.0,
            size_bytes,
            streams,
            metadata: Default::default(),
        })
    }
}

/// Writes a placeholder WAV where ffmpeg would
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeExtractor;

impl AudioExtractor for FakeExtractor {
    fn extract(
        &self,
        input_path: &Path,
        output_dir: &Path,
        config: &AudioConfig,
    ) -> video_analysis_common::Result<PathBuf> {
        let output = output_path_for(input_path, output_dir, config);
        std::fs::write(&output, b"RIFF\0\0\0\0WAVE")?;
        Ok(output)
    }
}

/// Frame source of uniform gray frames
struct GrayFrames {
    remaining: u64,
    properties: VideoProperties,
}

impl FrameSource for GrayFrames {
    fn properties(&self) -> VideoProperties {
        self.properties
    }

    fn next_frame(&mut self) -> video_analysis_frames::Result<Option<RgbImage>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(RgbImage::from_pixel(
            self.properties.width,
            self.properties.height,
            image::Rgb([180, 180, 180]),
        )))
    }
}

struct CountingSink {
    path: PathBuf,
    frames: u64,
}

impl FrameSink for CountingSink {
    fn write_frame(&mut self, _frame: &RgbImage) -> video_analysis_frames::Result<()> {
        self.frames += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> video_analysis_frames::Result<()> {
        std::fs::write(&self.path, format!("synthetic video, {} frames", self.frames))?;
        Ok(())
    }
}

/// Video backend that yields `frames` synthetic frames for any existing file
#[derive(Debug, Clone, Copy)]
pub struct SyntheticFrames {
    pub frames: u64,
    pub fps: f64,
}

impl Default for SyntheticFrames {
    fn default() -> Self {
        Self { frames: 10, fps: 5.0 }
    }
}

impl VideoBackend for SyntheticFrames {
    fn open(&self, path: &Path) -> video_analysis_frames::Result<Box<dyn FrameSource>> {
        if !path.exists() {
            return Err(FrameError::Open {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }
        Ok(Box::new(GrayFrames {
            remaining: self.frames,
            properties: VideoProperties {
                width: 32,
                height: 32,
                fps: self.fps,
            },
        }))
    }

    fn create_writer(
        &self,
        path: &Path,
        _properties: VideoProperties,
    ) -> video_analysis_frames::Result<Box<dyn FrameSink>> {
        std::fs::write(path, b"")?;
        Ok(Box::new(CountingSink {
            path: path.to_path_buf(),
            frames: 0,
        }))
    }
}

/// Media toolkit made of [`FakeProbe`], [`FakeExtractor`] and [`SyntheticFrames`]
#[derive(Debug, Clone, Copy)]
pub struct FakeMedia {
    pub probe: FakeProbe,
    pub extractor: FakeExtractor,
    pub video: SyntheticFrames,
}

impl FakeMedia {
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: FakeProbe { has_audio: true },
            extractor: FakeExtractor,
            video: SyntheticFrames::default(),
        }
    }

    /// Files probe as video-only
    #[must_use]
    pub fn without_audio() -> Self {
        Self {
            probe: FakeProbe { has_audio: false },
            ..Self::new()
        }
    }
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaToolkit for FakeMedia {
    fn probe(&self) -> &dyn MediaProbe {
        &self.probe
    }

    fn audio_extractor(&self) -> &dyn AudioExtractor {
        &self.extractor
    }

    fn video_backend(&self) -> &dyn VideoBackend {
        &self.video
    }
}
