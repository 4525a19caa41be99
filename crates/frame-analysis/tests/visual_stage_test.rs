//! Visual stage runs against in-memory video and stand-in models

use image::{Rgb, RgbImage};
use std::path::Path;
use std::sync::{Arc, Mutex};
use video_analysis_frames::{
    DisplayControl, FrameDisplay, FrameError, FrameSink, FrameSource, VideoBackend,
    VideoProperties, VisualStage, VisualStageOptions, VisualSummary,
};
use video_analysis_object_detection::{
    BoundingBox, Detection, Detector, ObjectDetectionError,
};
use video_analysis_ocr::{OCRError, TextRecognizer, TextRegion};

struct MemoryFrames {
    remaining: u64,
    properties: VideoProperties,
}

impl FrameSource for MemoryFrames {
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
            Rgb([200, 200, 200]),
        )))
    }
}

#[derive(Default, Clone)]
struct Recorded {
    frames: Arc<Mutex<Vec<RgbImage>>>,
    finished: Arc<Mutex<bool>>,
}

struct RecordingSink(Recorded);

impl FrameSink for RecordingSink {
    fn write_frame(&mut self, frame: &RgbImage) -> video_analysis_frames::Result<()> {
        self.0.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn finish(self: Box<Self>) -> video_analysis_frames::Result<()> {
        *self.0.finished.lock().unwrap() = true;
        Ok(())
    }
}

struct MemoryBackend {
    frames: u64,
    fps: f64,
    recorded: Recorded,
}

impl VideoBackend for MemoryBackend {
    fn open(&self, path: &Path) -> video_analysis_frames::Result<Box<dyn FrameSource>> {
        if !path.exists() {
            return Err(FrameError::Open {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }
        Ok(Box::new(MemoryFrames {
            remaining: self.frames,
            properties: VideoProperties {
                width: 32,
                height: 24,
                fps: self.fps,
            },
        }))
    }

    fn create_writer(
        &self,
        path: &Path,
        _properties: VideoProperties,
    ) -> video_analysis_frames::Result<Box<dyn FrameSink>> {
        std::fs::write(path, b"mp4")?;
        Ok(Box::new(RecordingSink(self.recorded.clone())))
    }
}

struct OnePerson;

impl Detector for OnePerson {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>, ObjectDetectionError> {
        Ok(vec![Detection {
            class_id: 0,
            class_name: "person".to_string(),
            confidence: 0.88,
            bbox: BoundingBox::new(2.0, 2.0, 12.0, 20.0),
        }])
    }
}

#[derive(Default)]
struct CountingRecognizer {
    calls: usize,
}

impl TextRecognizer for CountingRecognizer {
    fn recognize(&mut self, frame: &RgbImage) -> Result<Vec<TextRegion>, OCRError> {
        self.calls += 1;
        // frames arrive binarized
        assert!(frame.pixels().all(|p| p.0 == [255, 255, 255] || p.0 == [0, 0, 0]));
        Ok(vec![TextRegion::from_rect("EXIT", 0.93, 16.0, 4.0, 10.0, 6.0)])
    }
}

struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>, ObjectDetectionError> {
        Err(ObjectDetectionError::Inference("session poisoned".to_string()))
    }
}

struct StopAfter(usize);

impl FrameDisplay for StopAfter {
    fn show(&mut self, _frame: &RgbImage, _timestamp: f64) -> DisplayControl {
        self.0 -= 1;
        if self.0 == 0 {
            DisplayControl::Stop
        } else {
            DisplayControl::Continue
        }
    }
}

fn input_video(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("street.mp4");
    std::fs::write(&path, b"video").unwrap();
    path
}

#[test]
fn test_visual_stage_exports_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    let video = input_video(dir.path());
    let backend = MemoryBackend {
        frames: 10,
        fps: 4.0,
        recorded: Recorded::default(),
    };
    let mut detector = OnePerson;
    let mut recognizer = CountingRecognizer::default();

    let output = VisualStage::new(
        &backend,
        &mut detector,
        &mut recognizer,
        VisualStageOptions {
            output_dir: dir.path().join("results"),
            save_video: true,
        },
    )
    .run(&video, None)
    .unwrap();

    // 10 frames at 4 fps span seconds 0, 1 and 2
    assert_eq!(recognizer.calls, 3);
    assert_eq!(output.frames_processed, 10);
    assert_eq!(output.detections.len(), 10);
    assert_eq!(output.text.len(), 3);
    assert_eq!(output.text[1].timestamp, 1.0);
    assert_eq!(output.detections[5].timestamp, 1.25);
    assert!(!output.stopped_early);

    assert!(output.yolo_csv.starts_with(dir.path().join("results/csv")));
    assert!(output
        .yolo_csv
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("street_yolo_"));
    let yolo = std::fs::read_to_string(&output.yolo_csv).unwrap();
    assert_eq!(yolo.lines().count(), 11);
    let ocr = std::fs::read_to_string(&output.ocr_csv).unwrap();
    assert_eq!(ocr.lines().count(), 4);
    assert!(ocr.contains("EXIT"));

    let summary: VisualSummary =
        serde_json::from_str(&std::fs::read_to_string(&output.summary_json).unwrap()).unwrap();
    assert_eq!(summary.video_name, "street");
    assert_eq!(summary.num_yolo_detections, 10);
    assert_eq!(summary.num_ocr_detections, 3);
    assert_eq!(summary.output_video, output.annotated_video);
    assert_eq!(summary.output_files.ocr_csv, output.ocr_csv);

    let annotated = output.annotated_video.unwrap();
    assert!(annotated.ends_with("videos/street_annotated.mp4"));
    let frames = backend.recorded.frames.lock().unwrap();
    assert_eq!(frames.len(), 10);
    assert_ne!(frames[0].get_pixel(2, 2), &Rgb([200, 200, 200]));
    assert!(*backend.recorded.finished.lock().unwrap());
}

#[test]
fn test_visual_stage_without_video_output() {
    let dir = tempfile::tempdir().unwrap();
    let video = input_video(dir.path());
    let backend = MemoryBackend {
        frames: 3,
        fps: 30.0,
        recorded: Recorded::default(),
    };
    let mut detector = OnePerson;
    let mut recognizer = CountingRecognizer::default();

    let output = VisualStage::new(
        &backend,
        &mut detector,
        &mut recognizer,
        VisualStageOptions {
            output_dir: dir.path().to_path_buf(),
            save_video: false,
        },
    )
    .run(&video, None)
    .unwrap();

    assert!(output.annotated_video.is_none());
    assert!(backend.recorded.frames.lock().unwrap().is_empty());
    assert_eq!(recognizer.calls, 1);
}

#[test]
fn test_display_can_stop_early() {
    let dir = tempfile::tempdir().unwrap();
    let video = input_video(dir.path());
    let backend = MemoryBackend {
        frames: 50,
        fps: 25.0,
        recorded: Recorded::default(),
    };
    let mut detector = OnePerson;
    let mut recognizer = CountingRecognizer::default();
    let mut display = StopAfter(5);

    let output = VisualStage::new(
        &backend,
        &mut detector,
        &mut recognizer,
        VisualStageOptions {
            output_dir: dir.path().to_path_buf(),
            save_video: true,
        },
    )
    .run(&video, Some(&mut display))
    .unwrap();

    assert!(output.stopped_early);
    assert_eq!(output.frames_processed, 5);
    assert!(output.summary_json.exists());
    assert!(*backend.recorded.finished.lock().unwrap());
}

#[test]
fn test_unopenable_video_fails() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MemoryBackend {
        frames: 1,
        fps: 1.0,
        recorded: Recorded::default(),
    };
    let mut detector = OnePerson;
    let mut recognizer = CountingRecognizer::default();

    let err = VisualStage::new(
        &backend,
        &mut detector,
        &mut recognizer,
        VisualStageOptions {
            output_dir: dir.path().to_path_buf(),
            save_video: false,
        },
    )
    .run(&dir.path().join("missing.mp4"), None)
    .unwrap_err();
    assert!(matches!(err, FrameError::Open { .. }));
}

#[test]
fn test_model_error_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let video = input_video(dir.path());
    let backend = MemoryBackend {
        frames: 2,
        fps: 1.0,
        recorded: Recorded::default(),
    };
    let mut detector = FailingDetector;
    let mut recognizer = CountingRecognizer::default();

    let err = VisualStage::new(
        &backend,
        &mut detector,
        &mut recognizer,
        VisualStageOptions {
            output_dir: dir.path().to_path_buf(),
            save_video: false,
        },
    )
    .run(&video, None)
    .unwrap_err();
    assert!(matches!(err, FrameError::Detection(_)));
}
