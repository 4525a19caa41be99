//! Job record and its vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use video_analysis_common::round_to;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Completed and errored jobs accept no further updates
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stages a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    #[default]
    Full,
    VisualOnly,
    AudioOnly,
}

impl PipelineMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::VisualOnly => "visual_only",
            Self::AudioOnly => "audio_only",
        }
    }

    #[must_use]
    pub fn includes_visual(self) -> bool {
        matches!(self, Self::Full | Self::VisualOnly)
    }

    #[must_use]
    pub fn includes_audio(self) -> bool {
        matches!(self, Self::Full | Self::AudioOnly)
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "visual_only" => Ok(Self::VisualOnly),
            "audio_only" => Ok(Self::AudioOnly),
            other => Err(format!(
                "Invalid pipeline type '{other}' (expected full, visual_only or audio_only)"
            )),
        }
    }
}

/// Downloadable output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Video,
    YoloCsv,
    OcrCsv,
    SummaryJson,
    Audio,
    Transcript,
    LinguisticJson,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        Self::Video,
        Self::YoloCsv,
        Self::OcrCsv,
        Self::SummaryJson,
        Self::Audio,
        Self::Transcript,
        Self::LinguisticJson,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::YoloCsv => "yolo_csv",
            Self::OcrCsv => "ocr_csv",
            Self::SummaryJson => "summary_json",
            Self::Audio => "audio",
            Self::Transcript => "transcript",
            Self::LinguisticJson => "linguistic_json",
        }
    }

    /// Suffix of the file name offered to downloaders
    #[must_use]
    pub fn download_name(self) -> &'static str {
        match self {
            Self::Video => "annotated_video.mp4",
            Self::YoloCsv => "yolo_detections.csv",
            Self::OcrCsv => "ocr_text.csv",
            Self::SummaryJson => "analysis_summary.json",
            Self::Audio => "audio.wav",
            Self::Transcript => "transcript.json",
            Self::LinguisticJson => "linguistic_analysis.json",
        }
    }

    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Video => "video/mp4",
            Self::YoloCsv | Self::OcrCsv => "text/csv",
            Self::SummaryJson | Self::Transcript | Self::LinguisticJson => "application/json",
            Self::Audio => "audio/wav",
        }
    }

    /// Produced by the visual stage (the rest come from the audio branch)
    #[must_use]
    pub fn is_visual(self) -> bool {
        matches!(
            self,
            Self::Video | Self::YoloCsv | Self::OcrCsv | Self::SummaryJson
        )
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Invalid file type '{s}'"))
    }
}

/// Fresh unique job identifier
#[must_use]
pub fn new_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fields supplied when a job is registered
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: String,
    pub original_filename: String,
    pub stored_path: PathBuf,
    pub pipeline_mode: PipelineMode,
}

/// One tracked analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub pipeline_mode: PipelineMode,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_path: PathBuf,
    /// Per-stage results keyed by stage name, plus `<stage>_error` entries
    pub results: Option<Map<String, Value>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub artifacts: BTreeMap<ArtifactKind, PathBuf>,
}

impl Job {
    #[must_use]
    pub fn new(new: NewJob) -> Self {
        let stored_filename = new
            .stored_path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        Self {
            id: new.id,
            status: JobStatus::Uploaded,
            progress: 0,
            pipeline_mode: new.pipeline_mode,
            original_filename: new.original_filename,
            stored_filename,
            file_path: new.stored_path,
            results: None,
            error: None,
            created_at: Utc::now(),
            start_time: None,
            end_time: None,
            artifacts: BTreeMap::new(),
        }
    }

    /// Seconds between start and end, rounded to centiseconds
    #[must_use]
    pub fn processing_time(&self) -> Option<f64> {
        let (start, end) = (self.start_time?, self.end_time?);
        let millis = (end - start).num_milliseconds().max(0);
        Some(round_to(millis as f64 / 1000.0, 2))
    }

    /// Original file name without its extension
    #[must_use]
    pub fn original_stem(&self) -> String {
        std::path::Path::new(&self.original_filename)
            .file_stem()
            .map_or_else(|| "analysis".to_string(), |s| s.to_string_lossy().into_owned())
    }

    fn result(&self, key: &str) -> Option<&Value> {
        self.results.as_ref()?.get(key)
    }

    /// Headline counts drawn from the results map
    #[must_use]
    pub fn summary(&self) -> JobSummary {
        let count = |stage: &str, field: &str| {
            self.result(stage)
                .and_then(|v| v.get(field))
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };
        JobSummary {
            yolo_detections: count("visual", "detections"),
            ocr_detections: count("visual", "text"),
            audio_segments: count("audio", "segments"),
            audio_language: self
                .result("audio")
                .and_then(|v| v.get("language"))
                .and_then(Value::as_str)
                .map(str::to_string),
            linguistic_tokens: self
                .result("linguistic")
                .and_then(|v| v.get("token_count"))
                .and_then(Value::as_u64)
                .map(|n| n as usize),
            stage_errors: self
                .result("stage_errors")
                .and_then(Value::as_array)
                .map(|errors| {
                    errors
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Counts shown in the status of a completed job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub yolo_detections: usize,
    pub ocr_detections: usize,
    pub audio_segments: usize,
    pub audio_language: Option<String>,
    pub linguistic_tokens: Option<usize>,
    pub stage_errors: Vec<String>,
}

/// Partial update merged into a job by the registry
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    /// Merged key by key into the results map
    pub results: Map<String, Value>,
    pub error: Option<String>,
    /// Merged kind by kind into the artifact map
    pub artifacts: BTreeMap<ArtifactKind, PathBuf>,
}

impl JobUpdate {
    #[must_use]
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed() -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            ..Self::default()
        }
    }

    /// Terminal failure; progress drops back to 0
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Error),
            progress: Some(0),
            error: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_result(mut self, key: &str, value: Value) -> Self {
        self.results.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_artifact(mut self, kind: ArtifactKind, path: PathBuf) -> Self {
        self.artifacts.insert(kind, path);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> Job {
        Job::new(NewJob {
            id: "abc".to_string(),
            original_filename: "Lecture 3.final.mp4".to_string(),
            stored_path: PathBuf::from("uploads/abc.mp4"),
            pipeline_mode: PipelineMode::Full,
        })
    }

    #[test]
    fn test_new_job_starts_uploaded() {
        let job = job();
        assert_eq!(job.status, JobStatus::Uploaded);
        assert_eq!(job.progress, 0);
        assert_eq!(job.stored_filename, "abc.mp4");
        assert!(job.start_time.is_none());
        assert!(job.artifacts.is_empty());
    }

    #[test]
    fn test_original_stem_keeps_inner_dots() {
        assert_eq!(job().original_stem(), "Lecture 3.final");
    }

    #[test]
    fn test_pipeline_mode_parsing() {
        assert_eq!("audio_only".parse::<PipelineMode>(), Ok(PipelineMode::AudioOnly));
        assert!("everything".parse::<PipelineMode>().is_err());
        assert!(PipelineMode::Full.includes_visual() && PipelineMode::Full.includes_audio());
        assert!(!PipelineMode::VisualOnly.includes_audio());
        assert!(!PipelineMode::AudioOnly.includes_visual());
    }

    #[test]
    fn test_artifact_kinds_round_trip_names() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.as_str().parse::<ArtifactKind>(), Ok(kind));
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                Value::String(kind.as_str().to_string())
            );
        }
        assert!("thumbnail".parse::<ArtifactKind>().is_err());
        assert_eq!(ArtifactKind::Audio.download_name(), "audio.wav");
        assert_eq!(ArtifactKind::YoloCsv.media_type(), "text/csv");
    }

    #[test]
    fn test_processing_time_rounds() {
        let mut job = job();
        assert_eq!(job.processing_time(), None);
        let start = Utc::now();
        job.start_time = Some(start);
        job.end_time = Some(start + chrono::Duration::milliseconds(1_234));
        assert_eq!(job.processing_time(), Some(1.23));
    }

    #[test]
    fn test_summary_reads_results() {
        let mut job = job();
        assert_eq!(job.summary(), JobSummary::default());
        let mut results = Map::new();
        results.insert(
            "visual".to_string(),
            json!({"detections": [1, 2, 3], "text": [1]}),
        );
        results.insert(
            "audio".to_string(),
            json!({"language": "en", "segments": [1, 2]}),
        );
        results.insert("linguistic".to_string(), json!({"token_count": 42}));
        results.insert("stage_errors".to_string(), json!(["visual"]));
        job.results = Some(results);

        let summary = job.summary();
        assert_eq!(summary.yolo_detections, 3);
        assert_eq!(summary.ocr_detections, 1);
        assert_eq!(summary.audio_segments, 2);
        assert_eq!(summary.audio_language.as_deref(), Some("en"));
        assert_eq!(summary.linguistic_tokens, Some(42));
        assert_eq!(summary.stage_errors, vec!["visual"]);
    }
}
