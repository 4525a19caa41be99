//! Pipeline configuration

use crate::layout::StorageLayout;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// What a job becomes when every stage it attempted failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AllStagesFailedPolicy {
    /// Report `completed`; callers inspect `stage_errors`
    #[default]
    MarkCompleted,
    /// Report `error` with the stage failures as the message
    MarkError,
}

impl FromStr for AllStagesFailedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(Self::MarkCompleted),
            "error" => Ok(Self::MarkError),
            other => Err(format!("unknown policy '{other}'")),
        }
    }
}

/// Model files and languages used by the default model factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub yolo_model: PathBuf,
    pub whisper_model: PathBuf,
    pub ocr_language: String,
    /// `None` lets the transcriber detect the language
    pub transcription_language: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            yolo_model: PathBuf::from("models/yolov8n.onnx"),
            whisper_model: PathBuf::from("models/ggml-base.bin"),
            ocr_language: "eng".to_string(),
            transcription_language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub layout: StorageLayout,
    /// 0 means no limit
    pub max_concurrent_jobs: usize,
    pub job_timeout: Option<Duration>,
    pub all_failed_policy: AllStagesFailedPolicy,
    pub models: ModelSettings,
    /// Write the annotated video for visual runs
    pub save_video: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout: StorageLayout::new("."),
            max_concurrent_jobs: 2,
            job_timeout: None,
            all_failed_policy: AllStagesFailedPolicy::default(),
            models: ModelSettings::default(),
            save_video: true,
        }
    }
}

fn parsed_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `VAA_DATA_DIR`: storage root (default: ".")
    /// - `VAA_MAX_CONCURRENT_JOBS`: running job cap, 0 for none (default: 2)
    /// - `VAA_JOB_TIMEOUT_SECS`: per-job time limit, 0 for none (default: 0)
    /// - `VAA_ALL_FAILED_POLICY`: `completed` or `error` (default: completed)
    /// - `VAA_YOLO_MODEL`, `VAA_WHISPER_MODEL`: model paths
    /// - `VAA_OCR_LANGUAGE`: Tesseract languages (default: "eng")
    /// - `VAA_TRANSCRIPTION_LANGUAGE`: fixed transcription language (default: detect)
    #[must_use = "creates config from environment variables"]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PipelineConfig::from_env`] over an arbitrary variable source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let model_defaults = ModelSettings::default();

        let layout = lookup("VAA_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or(defaults.layout, StorageLayout::new);

        let timeout_secs: u64 = parsed_or(&lookup, "VAA_JOB_TIMEOUT_SECS", 0);

        Self {
            layout,
            max_concurrent_jobs: parsed_or(
                &lookup,
                "VAA_MAX_CONCURRENT_JOBS",
                defaults.max_concurrent_jobs,
            ),
            job_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            all_failed_policy: parsed_or(
                &lookup,
                "VAA_ALL_FAILED_POLICY",
                defaults.all_failed_policy,
            ),
            models: ModelSettings {
                yolo_model: lookup("VAA_YOLO_MODEL")
                    .map_or(model_defaults.yolo_model, PathBuf::from),
                whisper_model: lookup("VAA_WHISPER_MODEL")
                    .map_or(model_defaults.whisper_model, PathBuf::from),
                ocr_language: lookup("VAA_OCR_LANGUAGE").unwrap_or(model_defaults.ocr_language),
                transcription_language: lookup("VAA_TRANSCRIPTION_LANGUAGE")
                    .filter(|lang| !lang.trim().is_empty()),
            },
            save_video: defaults.save_video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> PipelineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.job_timeout, None);
        assert_eq!(config.all_failed_policy, AllStagesFailedPolicy::MarkCompleted);
    }

    #[test]
    fn test_values_from_variables() {
        let config = config(&[
            ("VAA_DATA_DIR", "/srv/vaa"),
            ("VAA_MAX_CONCURRENT_JOBS", "0"),
            ("VAA_JOB_TIMEOUT_SECS", "90"),
            ("VAA_ALL_FAILED_POLICY", "Error"),
            ("VAA_OCR_LANGUAGE", "eng+fra"),
            ("VAA_TRANSCRIPTION_LANGUAGE", "en"),
        ]);
        assert_eq!(config.layout.root(), std::path::Path::new("/srv/vaa"));
        assert_eq!(config.max_concurrent_jobs, 0);
        assert_eq!(config.job_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.all_failed_policy, AllStagesFailedPolicy::MarkError);
        assert_eq!(config.models.ocr_language, "eng+fra");
        assert_eq!(config.models.transcription_language.as_deref(), Some("en"));
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let config = config(&[
            ("VAA_MAX_CONCURRENT_JOBS", "many"),
            ("VAA_JOB_TIMEOUT_SECS", "-5"),
            ("VAA_ALL_FAILED_POLICY", "maybe"),
        ]);
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.job_timeout, None);
        assert_eq!(config.all_failed_policy, AllStagesFailedPolicy::MarkCompleted);
    }
}
