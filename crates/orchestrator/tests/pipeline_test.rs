//! Pipeline runs end to end over fake models and media tools

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use video_analysis_orchestrator::testing::{FakeMedia, FakeModels};
use video_analysis_orchestrator::{
    new_job_id, AllStagesFailedPolicy, ArtifactKind, InMemoryJobRegistry, Job, JobOutcome,
    JobRegistry, JobStatus, JobSupervisor, NewJob, PipelineConfig, PipelineManager, PipelineMode,
    StorageLayout,
};

struct Harness {
    _dir: TempDir,
    registry: Arc<InMemoryJobRegistry>,
    manager: PipelineManager,
}

impl Harness {
    fn new(models: FakeModels, media: FakeMedia, policy: AllStagesFailedPolicy) -> Self {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            layout: StorageLayout::new(dir.path()),
            all_failed_policy: policy,
            ..PipelineConfig::default()
        };
        config.layout.ensure().unwrap();
        let registry = Arc::new(InMemoryJobRegistry::new());
        let manager = PipelineManager::new(
            registry.clone(),
            Arc::new(models),
            Arc::new(media),
            &config,
        );
        Self {
            _dir: dir,
            registry,
            manager,
        }
    }

    fn layout(&self) -> &StorageLayout {
        self.manager.layout()
    }

    /// Store a fake upload and move it to processing.
    async fn start(&self, mode: PipelineMode) -> String {
        let id = new_job_id();
        let stored_path = self.layout().upload_path(&id, "street.mp4");
        std::fs::write(&stored_path, b"not really a video").unwrap();
        self.registry
            .create(NewJob {
                id: id.clone(),
                original_filename: "street.mp4".to_string(),
                stored_path,
                pipeline_mode: mode,
            })
            .await
            .unwrap();
        self.registry.begin_processing(&id, mode).await.unwrap();
        id
    }

    async fn run(&self, mode: PipelineMode) -> Job {
        let id = self.start(mode).await;
        self.manager.execute(&id, mode).await;
        self.registry.get(&id).await.unwrap()
    }
}

fn result<'a>(job: &'a Job, key: &str) -> Option<&'a serde_json::Value> {
    job.results.as_ref().and_then(|r| r.get(key))
}

#[tokio::test]
async fn test_full_run_produces_every_artifact() {
    let harness = Harness::new(FakeModels::new(), FakeMedia::new(), Default::default());
    let job = harness.run(PipelineMode::Full).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert!(job.error.is_none());
    assert!(job.end_time.is_some());

    let kinds: Vec<ArtifactKind> = job.artifacts.keys().copied().collect();
    assert_eq!(kinds, ArtifactKind::ALL.to_vec());
    for path in job.artifacts.values() {
        assert!(path.exists(), "{} missing", path.display());
    }
    assert!(job.artifacts[&ArtifactKind::Video].starts_with(harness.layout().results_dir(&job.id)));
    assert!(job.artifacts[&ArtifactKind::Audio].starts_with(harness.layout().audio_dir()));
    assert!(job.artifacts[&ArtifactKind::Transcript].starts_with(harness.layout().transcripts_dir()));
    assert!(job.artifacts[&ArtifactKind::LinguisticJson]
        .starts_with(harness.layout().transcripts_dir()));

    let summary = job.summary();
    // 10 frames at 5 fps: text is read at seconds 0 and 1
    assert_eq!(summary.yolo_detections, 10);
    assert_eq!(summary.ocr_detections, 2);
    assert_eq!(summary.audio_segments, 2);
    assert_eq!(summary.audio_language.as_deref(), Some("en"));
    assert!(summary.linguistic_tokens.unwrap() > 0);
    assert!(summary.stage_errors.is_empty());

    let lens = &result(&job, "linguistic").unwrap()["interrogative_lens"];
    let who = lens["who"].as_array().unwrap();
    assert!(who.iter().any(|span| span == "Maria"), "{who:?}");
    assert!(result(&job, "visual_error").is_none());
    assert!(result(&job, "audio_error").is_none());
}

#[tokio::test]
async fn test_transcript_document_points_at_relocated_audio() {
    let harness = Harness::new(FakeModels::new(), FakeMedia::new(), Default::default());
    let job = harness.run(PipelineMode::AudioOnly).await;

    let document = video_analysis_transcription::TranscriptDocument::read(
        &job.artifacts[&ArtifactKind::Transcript],
    )
    .unwrap();
    assert_eq!(document.audio_file, job.artifacts[&ArtifactKind::Audio]);
    let transcript = document.transcript();
    assert_eq!(transcript.segments.len(), 2);
    assert_eq!(transcript.segments[0].text, "Maria fixed the bike in Paris yesterday.");
    assert_eq!(transcript.segments[1].start, 2.4);
}

#[tokio::test]
async fn test_linguistic_report_on_disk_matches_results() {
    let harness = Harness::new(FakeModels::new(), FakeMedia::new(), Default::default());
    let job = harness.run(PipelineMode::AudioOnly).await;

    let path = &job.artifacts[&ArtifactKind::LinguisticJson];
    let report = video_analysis_linguistic::LinguisticReport::read_json(path).unwrap();
    assert_eq!(
        report.text,
        "Maria fixed the bike in Paris yesterday. She used a wrench because the chain broke."
    );
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        *result(&job, "linguistic").unwrap()
    );

    let lens = serde_json::to_value(&report.interrogative_lens).unwrap();
    let places = lens["where"].as_array().unwrap();
    assert!(places.iter().any(|span| span == "Paris"), "{places:?}");
    let causes = lens["why"].as_array().unwrap();
    assert!(
        causes.iter().any(|span| span.as_str().unwrap().starts_with("because")),
        "{causes:?}"
    );
}

#[tokio::test]
async fn test_visual_only_has_no_audio_keys() {
    let harness = Harness::new(FakeModels::new(), FakeMedia::new(), Default::default());
    let job = harness.run(PipelineMode::VisualOnly).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.artifacts.keys().all(|k| k.is_visual()));
    assert!(job.artifacts.contains_key(&ArtifactKind::Video));
    assert!(result(&job, "audio").is_none());
    assert!(result(&job, "linguistic").is_none());
}

#[tokio::test]
async fn test_audio_only_has_no_visual_keys() {
    let harness = Harness::new(FakeModels::new(), FakeMedia::new(), Default::default());
    let job = harness.run(PipelineMode::AudioOnly).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.artifacts.keys().all(|k| !k.is_visual()));
    assert!(job.artifacts.contains_key(&ArtifactKind::Transcript));
    assert!(result(&job, "visual").is_none());
    assert!(!harness.layout().results_dir(&job.id).join("videos").exists());
}

#[tokio::test]
async fn test_visual_failure_leaves_audio_results() {
    let harness = Harness::new(
        FakeModels::new().failing_visual(),
        FakeMedia::new(),
        Default::default(),
    );
    let job = harness.run(PipelineMode::Full).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    let visual_error = result(&job, "visual_error").unwrap().as_str().unwrap();
    assert!(visual_error.contains("detector offline"), "{visual_error}");
    assert!(result(&job, "audio").is_some());
    assert!(job.artifacts.contains_key(&ArtifactKind::Transcript));
    assert!(job.artifacts.contains_key(&ArtifactKind::Audio));
    assert!(!job.artifacts.contains_key(&ArtifactKind::Video));
    assert_eq!(job.summary().stage_errors, vec!["visual".to_string()]);
}

#[tokio::test]
async fn test_missing_audio_track_is_an_audio_error() {
    let harness = Harness::new(
        FakeModels::new(),
        FakeMedia::without_audio(),
        Default::default(),
    );
    let job = harness.run(PipelineMode::Full).await;

    assert_eq!(job.status, JobStatus::Completed);
    let audio_error = result(&job, "audio_error").unwrap().as_str().unwrap();
    assert!(audio_error.contains("No audio"), "{audio_error}");
    assert!(job.artifacts.contains_key(&ArtifactKind::YoloCsv));
}

#[tokio::test]
async fn test_linguistic_failure_keeps_audio_results() {
    let harness = Harness::new(
        FakeModels::new().failing_linguistic(),
        FakeMedia::new(),
        Default::default(),
    );
    let job = harness.run(PipelineMode::AudioOnly).await;

    assert_eq!(job.status, JobStatus::Completed);
    let audio_error = result(&job, "audio_error").unwrap().as_str().unwrap();
    assert!(audio_error.contains("tagger offline"), "{audio_error}");
    assert_eq!(result(&job, "audio").unwrap()["language"], "en");
    assert!(result(&job, "linguistic").is_none());
    for kind in [ArtifactKind::Audio, ArtifactKind::Transcript] {
        assert!(job.artifacts[&kind].exists(), "{kind:?}");
    }
    assert!(!job.artifacts.contains_key(&ArtifactKind::LinguisticJson));
    assert_eq!(job.summary().stage_errors, vec!["audio".to_string()]);
}

#[tokio::test]
async fn test_all_stages_failed_default_policy_completes() {
    let harness = Harness::new(
        FakeModels::new().failing_visual().failing_audio(),
        FakeMedia::new(),
        AllStagesFailedPolicy::MarkCompleted,
    );
    let job = harness.run(PipelineMode::Full).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.artifacts.is_empty());
    assert_eq!(
        job.summary().stage_errors,
        vec!["visual".to_string(), "audio".to_string()]
    );
}

#[tokio::test]
async fn test_all_stages_failed_error_policy() {
    let harness = Harness::new(
        FakeModels::new().failing_audio(),
        FakeMedia::new(),
        AllStagesFailedPolicy::MarkError,
    );
    let job = harness.run(PipelineMode::AudioOnly).await;

    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.progress, 0);
    assert_eq!(job.error.as_deref(), Some("all stages failed: audio"));
    assert!(result(&job, "audio_error").is_some());
}

#[tokio::test]
async fn test_missing_video_marks_job_error() {
    let harness = Harness::new(FakeModels::new(), FakeMedia::new(), Default::default());
    let id = harness.start(PipelineMode::Full).await;
    let job = harness.registry.get(&id).await.unwrap();
    std::fs::remove_file(&job.file_path).unwrap();

    harness.manager.execute(&id, PipelineMode::Full).await;
    let job = harness.registry.get(&id).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.progress, 0);
    assert!(job.error.unwrap().contains("Video file not found"));
}

#[tokio::test]
async fn test_supervisor_reports_finished_jobs() {
    let harness = Harness::new(FakeModels::new(), FakeMedia::new(), Default::default());
    let supervisor = JobSupervisor::new(harness.manager.clone(), 1, None);

    let first = harness.start(PipelineMode::VisualOnly).await;
    let second = harness.start(PipelineMode::AudioOnly).await;
    let tickets = [
        supervisor.spawn(&first, PipelineMode::VisualOnly),
        supervisor.spawn(&second, PipelineMode::AudioOnly),
    ];
    for ticket in tickets {
        assert_eq!(
            supervisor.wait(ticket).await,
            JobOutcome::Finished(JobStatus::Completed)
        );
    }
    for id in [first, second] {
        assert_eq!(
            harness.registry.get(&id).await.unwrap().status,
            JobStatus::Completed
        );
    }
}

#[tokio::test]
async fn test_supervisor_times_out_hung_jobs() {
    let harness = Harness::new(
        FakeModels::new().with_transcribe_delay(Duration::from_millis(800)),
        FakeMedia::new(),
        Default::default(),
    );
    let supervisor = JobSupervisor::new(
        harness.manager.clone(),
        0,
        Some(Duration::from_millis(100)),
    );

    let id = harness.start(PipelineMode::AudioOnly).await;
    let ticket = supervisor.spawn(&id, PipelineMode::AudioOnly);
    assert_eq!(ticket.job_id(), id);
    assert_eq!(supervisor.wait(ticket).await, JobOutcome::TimedOut);

    let job = harness.registry.get(&id).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_supervisor_reports_panicking_runs() {
    let harness = Harness::new(
        FakeModels::new().panicking_audio(),
        FakeMedia::new(),
        Default::default(),
    );
    let supervisor = JobSupervisor::new(harness.manager.clone(), 0, None);

    let id = harness.start(PipelineMode::AudioOnly).await;
    let outcome = supervisor.spawn(&id, PipelineMode::AudioOnly).wait().await;
    match outcome {
        JobOutcome::Panicked(message) => assert!(message.contains("transcriber poisoned")),
        other => panic!("expected a panic, got {other:?}"),
    }

    let job = harness.registry.get(&id).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.progress, 0);
    assert!(job.error.unwrap().contains("analysis crashed"));
}

#[tokio::test]
async fn test_supervisor_cap_serializes_runs() {
    let harness = Harness::new(
        FakeModels::new().with_transcribe_delay(Duration::from_millis(400)),
        FakeMedia::new(),
        Default::default(),
    );
    let supervisor = JobSupervisor::new(harness.manager.clone(), 1, None);

    let first = harness.start(PipelineMode::AudioOnly).await;
    let second = harness.start(PipelineMode::AudioOnly).await;
    let first_ticket = supervisor.spawn(&first, PipelineMode::AudioOnly);
    while harness.registry.get(&first).await.unwrap().progress <= 10 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let second_ticket = supervisor.spawn(&second, PipelineMode::AudioOnly);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let running = harness.registry.get(&first).await.unwrap();
    let waiting = harness.registry.get(&second).await.unwrap();
    assert_eq!(running.status, JobStatus::Processing);
    assert_eq!(waiting.status, JobStatus::Processing);
    assert_eq!(waiting.progress, 10);

    for ticket in [first_ticket, second_ticket] {
        assert_eq!(
            supervisor.wait(ticket).await,
            JobOutcome::Finished(JobStatus::Completed)
        );
    }
}
