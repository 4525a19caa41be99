//! Model and media capabilities used by the pipeline manager
//!
//! Models are built fresh for every pipeline run through a [`ModelFactory`].
//! External tools (probing, audio extraction, frame decoding and encoding)
//! come from a [`MediaToolkit`] shared across runs.

use crate::config::ModelSettings;
use video_analysis_audio_extractor::{AudioExtractor, FfmpegAudioExtractor};
use video_analysis_common::ProcessingError;
use video_analysis_frames::{FfmpegVideoBackend, VideoBackend};
use video_analysis_ingestion::{FfprobeProbe, MediaProbe};
use video_analysis_linguistic::{LexiconTagger, LinguisticTagger};
use video_analysis_object_detection::Detector;
use video_analysis_ocr::TextRecognizer;
use video_analysis_transcription::Transcriber;

pub type ModelResult<T> = std::result::Result<T, ProcessingError>;

/// Builds model adapters for one pipeline run
pub trait ModelFactory: Send + Sync {
    fn detector(&self) -> ModelResult<Box<dyn Detector>>;

    fn recognizer(&self) -> ModelResult<Box<dyn TextRecognizer>>;

    fn transcriber(&self) -> ModelResult<Box<dyn Transcriber>>;

    fn tagger(&self) -> ModelResult<Box<dyn LinguisticTagger>>;
}

/// External media tooling
pub trait MediaToolkit: Send + Sync {
    fn probe(&self) -> &dyn MediaProbe;

    fn audio_extractor(&self) -> &dyn AudioExtractor;

    fn video_backend(&self) -> &dyn VideoBackend;
}

/// Real model adapters, each available when its cargo feature is enabled
#[derive(Debug, Clone, Default)]
pub struct DefaultModelFactory {
    settings: ModelSettings,
}

impl DefaultModelFactory {
    #[must_use]
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

#[cfg(not(all(feature = "onnx", feature = "tesseract", feature = "whisper")))]
fn missing_feature(model: &str, feature: &str) -> ProcessingError {
    ProcessingError::BackendUnavailable(format!(
        "{model} requires the `{feature}` feature"
    ))
}

impl ModelFactory for DefaultModelFactory {
    #[cfg(feature = "onnx")]
    fn detector(&self) -> ModelResult<Box<dyn Detector>> {
        use video_analysis_object_detection::{ObjectDetectionConfig, YoloDetector};
        let config = ObjectDetectionConfig {
            model_path: self.settings.yolo_model.clone(),
            ..ObjectDetectionConfig::default()
        };
        Ok(Box::new(YoloDetector::new(config)?))
    }

    #[cfg(not(feature = "onnx"))]
    fn detector(&self) -> ModelResult<Box<dyn Detector>> {
        Err(missing_feature("object detection", "onnx"))
    }

    #[cfg(feature = "tesseract")]
    fn recognizer(&self) -> ModelResult<Box<dyn TextRecognizer>> {
        use video_analysis_ocr::{OCRConfig, TesseractRecognizer};
        let config = OCRConfig {
            language: self.settings.ocr_language.clone(),
            ..OCRConfig::default()
        };
        Ok(Box::new(TesseractRecognizer::new(config)?))
    }

    #[cfg(not(feature = "tesseract"))]
    fn recognizer(&self) -> ModelResult<Box<dyn TextRecognizer>> {
        Err(missing_feature("text recognition", "tesseract"))
    }

    #[cfg(feature = "whisper")]
    fn transcriber(&self) -> ModelResult<Box<dyn Transcriber>> {
        use video_analysis_transcription::{TranscriptionConfig, WhisperTranscriber};
        let config = TranscriptionConfig {
            model_path: self.settings.whisper_model.clone(),
            language: self.settings.transcription_language.clone(),
            ..TranscriptionConfig::default()
        };
        Ok(Box::new(WhisperTranscriber::new(config)?))
    }

    #[cfg(not(feature = "whisper"))]
    fn transcriber(&self) -> ModelResult<Box<dyn Transcriber>> {
        Err(missing_feature("transcription", "whisper"))
    }

    fn tagger(&self) -> ModelResult<Box<dyn LinguisticTagger>> {
        Ok(Box::new(LexiconTagger::new()))
    }
}

/// `ffprobe` and `ffmpeg` from `PATH`
pub struct FfmpegToolkit {
    probe: FfprobeProbe,
    extractor: FfmpegAudioExtractor,
    video: FfmpegVideoBackend,
}

impl FfmpegToolkit {
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: FfprobeProbe::new(),
            extractor: FfmpegAudioExtractor::new(),
            video: FfmpegVideoBackend::new(Box::new(FfprobeProbe::new())),
        }
    }
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaToolkit for FfmpegToolkit {
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
