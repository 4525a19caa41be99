//! The frame analysis loop

use crate::annotate::annotate_frame;
use crate::export::{
    write_csv, write_summary, DetectionRecord, SummaryFiles, TextRecord, VisualSummary,
    DETECTION_HEADER, TEXT_HEADER,
};
use crate::io::{DisplayControl, FrameDisplay, FrameSink, VideoBackend};
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use video_analysis_object_detection::Detector;
use video_analysis_ocr::{preprocess_for_ocr, TextRecognizer};

/// Options for one visual run
#[derive(Debug, Clone)]
pub struct VisualStageOptions {
    /// Root directory; `videos/`, `csv/` and `json/` are created below it
    pub output_dir: PathBuf,
    /// Persist the annotated video
    pub save_video: bool,
}

/// Everything a visual run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualStageOutput {
    pub detections: Vec<DetectionRecord>,
    pub text: Vec<TextRecord>,
    pub frames_processed: u64,
    pub stopped_early: bool,
    pub annotated_video: Option<PathBuf>,
    pub yolo_csv: PathBuf,
    pub ocr_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// Tracks whether text recognition is due: once per integer second of video time
#[derive(Debug, Default)]
struct SecondTicker {
    previous: Option<u64>,
}

impl SecondTicker {
    fn is_due(&mut self, timestamp: f64) -> bool {
        let second = timestamp.max(0.0).floor() as u64;
        if self.previous == Some(second) {
            return false;
        }
        self.previous = Some(second);
        true
    }
}

/// Frame analysis over borrowed model capabilities
pub struct VisualStage<'a> {
    backend: &'a dyn VideoBackend,
    detector: &'a mut dyn Detector,
    recognizer: &'a mut dyn TextRecognizer,
    options: VisualStageOptions,
}

impl<'a> VisualStage<'a> {
    pub fn new(
        backend: &'a dyn VideoBackend,
        detector: &'a mut dyn Detector,
        recognizer: &'a mut dyn TextRecognizer,
        options: VisualStageOptions,
    ) -> Self {
        Self {
            backend,
            detector,
            recognizer,
            options,
        }
    }

    /// Analyze `video_path`, optionally showing each annotated frame live.
    pub fn run(
        &mut self,
        video_path: &Path,
        mut display: Option<&mut dyn FrameDisplay>,
    ) -> Result<VisualStageOutput> {
        let mut source = self.backend.open(video_path)?;
        let properties = source.properties();

        let videos_dir = self.options.output_dir.join("videos");
        let csv_dir = self.options.output_dir.join("csv");
        let json_dir = self.options.output_dir.join("json");
        for dir in [&videos_dir, &csv_dir, &json_dir] {
            std::fs::create_dir_all(dir)?;
        }

        let stem = video_path
            .file_stem()
            .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().into_owned());

        let annotated_video = self
            .options
            .save_video
            .then(|| videos_dir.join(format!("{stem}_annotated.mp4")));
        let mut sink: Option<Box<dyn FrameSink>> = match &annotated_video {
            Some(path) => Some(self.backend.create_writer(path, properties)?),
            None => None,
        };

        let mut detections = Vec::new();
        let mut text = Vec::new();
        let mut ticker = SecondTicker::default();
        let mut frame_index: u64 = 0;
        let mut stopped_early = false;

        info!("Analyzing frames of {}", video_path.display());
        while let Some(mut frame) = source.next_frame()? {
            let timestamp = frame_index as f64 / properties.fps;

            let frame_detections = self.detector.detect(&frame)?;
            detections.extend(
                frame_detections
                    .iter()
                    .map(|d| DetectionRecord::new(timestamp, d)),
            );

            let regions = if ticker.is_due(timestamp) {
                let regions = self.recognizer.recognize(&preprocess_for_ocr(&frame))?;
                debug!("{} text regions at {:.2}s", regions.len(), timestamp);
                text.extend(regions.iter().map(|r| TextRecord::new(timestamp, r)));
                regions
            } else {
                Vec::new()
            };

            annotate_frame(&mut frame, &frame_detections, &regions);

            if let Some(sink) = sink.as_mut() {
                sink.write_frame(&frame)?;
            }
            frame_index += 1;

            if let Some(display) = display.as_deref_mut() {
                if display.show(&frame, timestamp) == DisplayControl::Stop {
                    info!("Display requested stop at frame {}", frame_index);
                    stopped_early = true;
                    break;
                }
            }
        }

        if let Some(sink) = sink.take() {
            sink.finish()?;
        }

        let run_stamp = Utc::now();
        let suffix = run_stamp.format("%Y%m%d_%H%M%S");
        let yolo_csv = csv_dir.join(format!("{stem}_yolo_{suffix}.csv"));
        let ocr_csv = csv_dir.join(format!("{stem}_ocr_{suffix}.csv"));
        let summary_json = json_dir.join(format!("{stem}_summary.json"));

        write_csv(&yolo_csv, &detections, DETECTION_HEADER)?;
        write_csv(&ocr_csv, &text, TEXT_HEADER)?;
        write_summary(
            &summary_json,
            &VisualSummary {
                video_name: stem,
                timestamp: run_stamp,
                num_yolo_detections: detections.len(),
                num_ocr_detections: text.len(),
                output_video: annotated_video.clone(),
                output_files: SummaryFiles {
                    yolo_csv: yolo_csv.clone(),
                    ocr_csv: ocr_csv.clone(),
                },
            },
        )?;

        info!(
            "Visual analysis done: {} frames, {} detections, {} text fragments",
            frame_index,
            detections.len(),
            text.len()
        );

        Ok(VisualStageOutput {
            detections,
            text,
            frames_processed: frame_index,
            stopped_early,
            annotated_video,
            yolo_csv,
            ocr_csv,
            summary_json,
        })
    }
}
