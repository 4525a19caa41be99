//! Pipeline manager: runs the requested stages for one job
//!
//! Visual and audio branches are isolated from each other. A failing branch
//! leaves a `<stage>_error` entry next to whatever the other branch produced
//! and the job still reaches a terminal state. Only failures outside the
//! per-branch guards (missing input, registry errors) mark the job `error`.

use crate::backend::{MediaToolkit, ModelFactory};
use crate::config::{AllStagesFailedPolicy, PipelineConfig};
use crate::job::{ArtifactKind, JobStatus, JobUpdate, PipelineMode};
use crate::layout::StorageLayout;
use crate::registry::JobRegistry;
use crate::PipelineError;
use serde_json::{json, Value};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use video_analysis_common::ProcessingError;
use video_analysis_frames::{VisualStage, VisualStageOptions};
use video_analysis_ingestion::AudioStage;
use video_analysis_linguistic::{LinguisticReport, LinguisticStage};
use video_analysis_transcription::TranscriptDocument;

type StageResult<T> = std::result::Result<T, ProcessingError>;

const PROGRESS_PREPARED: u8 = 20;
const PROGRESS_VISUAL_DONE: u8 = 60;
const PROGRESS_AUDIO_STARTED: u8 = 70;
const PROGRESS_TRANSCRIBED: u8 = 85;
const PROGRESS_LINGUISTIC_DONE: u8 = 95;

/// Runs a stage body on the blocking pool.
///
/// A panic in the body is resumed on the calling task, so the run crashes
/// instead of recording a stage error.
async fn blocking<T, F>(f: F) -> StageResult<T>
where
    F: FnOnce() -> StageResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(ProcessingError::Other(format!("stage task failed: {e}"))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> StageResult<Value> {
    serde_json::to_value(value).map_err(|e| ProcessingError::Other(e.to_string()))
}

/// Move `from` into `dir`, keeping its file name.
async fn relocate(from: &Path, dir: &Path) -> io::Result<PathBuf> {
    let name = from.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", from.display()),
        )
    })?;
    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(name);
    // rename fails across filesystems, e.g. out of a tmpfs scratch dir
    if tokio::fs::rename(from, &target).await.is_err() {
        tokio::fs::copy(from, &target).await?;
        tokio::fs::remove_file(from).await?;
    }
    Ok(target)
}

/// What the audio branch hands to the linguistic step
struct AudioOutcome {
    update: JobUpdate,
    text: String,
    stem: String,
}

#[derive(Clone)]
pub struct PipelineManager {
    registry: Arc<dyn JobRegistry>,
    models: Arc<dyn ModelFactory>,
    media: Arc<dyn MediaToolkit>,
    layout: StorageLayout,
    policy: AllStagesFailedPolicy,
    save_video: bool,
}

impl PipelineManager {
    pub fn new(
        registry: Arc<dyn JobRegistry>,
        models: Arc<dyn ModelFactory>,
        media: Arc<dyn MediaToolkit>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            registry,
            models,
            media,
            layout: config.layout.clone(),
            policy: config.all_failed_policy,
            save_video: config.save_video,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<dyn JobRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Run the stages selected by `mode` for a job already in `processing`.
    ///
    /// Every outcome lands in the registry; nothing is returned.
    pub async fn execute(&self, job_id: &str, mode: PipelineMode) {
        if let Err(err) = self.run(job_id, mode).await {
            error!("Analysis {} failed: {}", job_id, err);
            if let Err(mark_err) = self
                .registry
                .update(job_id, JobUpdate::failed(err.to_string()))
                .await
            {
                warn!("Could not record failure of {}: {}", job_id, mark_err);
            }
        }
    }

    async fn run(&self, job_id: &str, mode: PipelineMode) -> Result<JobStatus, PipelineError> {
        let start = Instant::now();
        let job = self.registry.get(job_id).await?;
        let video = job.file_path.clone();
        if !tokio::fs::try_exists(&video).await.unwrap_or(false) {
            return Err(PipelineError::InputMissing(video));
        }

        tokio::fs::create_dir_all(self.layout.results_dir(job_id)).await?;
        self.registry
            .update(job_id, JobUpdate::progress(PROGRESS_PREPARED))
            .await?;
        info!("Analysis {} running in {} mode", job_id, mode);

        let mut attempted = 0;
        let mut failed: Vec<&'static str> = Vec::new();

        if mode.includes_visual() {
            attempted += 1;
            let update = match self.run_visual(job_id, &video).await {
                Ok(update) => update,
                Err(err) => {
                    warn!("Visual stage failed for {}: {}", job_id, err);
                    failed.push("visual");
                    JobUpdate::progress(PROGRESS_VISUAL_DONE)
                        .with_result("visual_error", Value::String(err.to_string()))
                }
            };
            self.registry.update(job_id, update).await?;
        }

        if mode.includes_audio() {
            attempted += 1;
            self.registry
                .update(job_id, JobUpdate::progress(PROGRESS_AUDIO_STARTED))
                .await?;
            if let Err(err) = self.run_audio_branch(job_id, &video).await? {
                warn!("Audio stage failed for {}: {}", job_id, err);
                failed.push("audio");
                self.registry
                    .update(
                        job_id,
                        JobUpdate::default()
                            .with_result("audio_error", Value::String(err.to_string())),
                    )
                    .await?;
            }
        }

        let stage_errors = json!(failed);
        let finish = if attempted > 0 && failed.len() == attempted {
            warn!(
                "Every stage failed for {} ({}), policy {:?}",
                job_id,
                failed.join(", "),
                self.policy
            );
            match self.policy {
                AllStagesFailedPolicy::MarkCompleted => JobUpdate::completed(),
                AllStagesFailedPolicy::MarkError => {
                    JobUpdate::failed(format!("all stages failed: {}", failed.join(", ")))
                }
            }
        } else {
            JobUpdate::completed()
        };
        let job = self
            .registry
            .update(job_id, finish.with_result("stage_errors", stage_errors))
            .await?;

        info!(
            "Analysis {} finished as {} in {:.2}s",
            job_id,
            job.status,
            start.elapsed().as_secs_f64()
        );
        Ok(job.status)
    }

    async fn run_visual(&self, job_id: &str, video: &Path) -> StageResult<JobUpdate> {
        info!("Visual stage starting for {}", job_id);
        let models = Arc::clone(&self.models);
        let media = Arc::clone(&self.media);
        let options = VisualStageOptions {
            output_dir: self.layout.results_dir(job_id),
            save_video: self.save_video,
        };
        let video = video.to_path_buf();

        let output = blocking(move || {
            let mut detector = models.detector()?;
            let mut recognizer = models.recognizer()?;
            let mut stage = VisualStage::new(
                media.video_backend(),
                detector.as_mut(),
                recognizer.as_mut(),
                options,
            );
            Ok(stage.run(&video, None)?)
        })
        .await?;

        info!(
            "Visual stage for {}: {} detections, {} text fragments over {} frames",
            job_id,
            output.detections.len(),
            output.text.len(),
            output.frames_processed
        );

        let mut update = JobUpdate::progress(PROGRESS_VISUAL_DONE)
            .with_result("visual", to_json(&output)?)
            .with_artifact(ArtifactKind::YoloCsv, output.yolo_csv)
            .with_artifact(ArtifactKind::OcrCsv, output.ocr_csv)
            .with_artifact(ArtifactKind::SummaryJson, output.summary_json);
        if let Some(video) = output.annotated_video {
            update = update.with_artifact(ArtifactKind::Video, video);
        }
        Ok(update)
    }

    /// Audio then linguistic. The outer error is a registry failure, the inner one a stage failure.
    async fn run_audio_branch(
        &self,
        job_id: &str,
        video: &Path,
    ) -> Result<StageResult<()>, PipelineError> {
        let outcome = match self.run_audio(job_id, video).await {
            Ok(outcome) => outcome,
            Err(err) => return Ok(Err(err)),
        };
        self.registry.update(job_id, outcome.update).await?;

        let update = match self.run_linguistic(job_id, outcome.text, &outcome.stem).await {
            Ok(update) => update,
            Err(err) => return Ok(Err(err)),
        };
        self.registry.update(job_id, update).await?;
        Ok(Ok(()))
    }

    async fn run_audio(&self, job_id: &str, video: &Path) -> StageResult<AudioOutcome> {
        info!("Audio stage starting for {}", job_id);
        let models = Arc::clone(&self.models);
        let media = Arc::clone(&self.media);
        let input = video.to_path_buf();

        let output = blocking(move || {
            let transcriber = models.transcriber()?;
            let stage = AudioStage::new(
                media.probe(),
                media.audio_extractor(),
                transcriber.as_ref(),
            );
            Ok(stage.run(&input)?)
        })
        .await?;

        let audio_path = relocate(&output.audio_path, &self.layout.audio_dir()).await?;
        let transcript_dir = self.layout.transcripts_dir();
        tokio::fs::create_dir_all(&transcript_dir).await?;
        let transcript_name = output
            .transcript_path
            .file_name()
            .map_or_else(|| OsString::from(format!("{job_id}_transcript.json")), OsStr::to_os_string);
        let transcript_path = transcript_dir.join(transcript_name);
        let transcript = output.transcript.clone();
        {
            let audio_path = audio_path.clone();
            let transcript_path = transcript_path.clone();
            blocking(move || {
                TranscriptDocument::new(&audio_path, transcript).write(&transcript_path)?;
                Ok(())
            })
            .await?;
        }
        // scratch directory goes away with `output`
        let text = output.transcript.text();
        let result = json!({
            "metadata": to_json(&output.media)?,
            "language": output.transcript.language,
            "segments": to_json(&output.transcript.segments)?,
            "audio_path": audio_path,
            "transcript_path": transcript_path,
        });
        info!(
            "Audio stage for {}: {} segments, language {}",
            job_id,
            output.transcript.segments.len(),
            output.transcript.language
        );
        drop(output);

        let stem = video
            .file_stem()
            .map_or_else(|| job_id.to_string(), |s| s.to_string_lossy().into_owned());
        Ok(AudioOutcome {
            update: JobUpdate::progress(PROGRESS_TRANSCRIBED)
                .with_result("audio", result)
                .with_artifact(ArtifactKind::Audio, audio_path)
                .with_artifact(ArtifactKind::Transcript, transcript_path),
            text,
            stem,
        })
    }

    async fn run_linguistic(
        &self,
        job_id: &str,
        text: String,
        stem: &str,
    ) -> StageResult<JobUpdate> {
        let models = Arc::clone(&self.models);
        let report_path = self
            .layout
            .transcripts_dir()
            .join(format!("{stem}_linguistic.json"));
        let path = report_path.clone();

        let report: LinguisticReport = blocking(move || {
            let stage = LinguisticStage::new(models.tagger()?);
            let report = stage.analyze(&text)?;
            report.write_json(&path)?;
            Ok(report)
        })
        .await?;
        info!(
            "Linguistic stage for {}: {} tokens",
            job_id, report.token_count
        );

        Ok(JobUpdate::progress(PROGRESS_LINGUISTIC_DONE)
            .with_result("linguistic", to_json(&report)?)
            .with_artifact(ArtifactKind::LinguisticJson, report_path))
    }
}

impl std::fmt::Debug for PipelineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineManager")
            .field("layout", &self.layout)
            .field("policy", &self.policy)
            .field("save_video", &self.save_video)
            .finish_non_exhaustive()
    }
}
