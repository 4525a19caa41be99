//! Tabular and summary exports of the visual stage

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use video_analysis_common::round_to;
use video_analysis_object_detection::Detection;
use video_analysis_ocr::TextRegion;

/// One object detection row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub timestamp: f64,
    pub class_id: u16,
    pub class_name: String,
    pub confidence: f32,
    pub bbox_x1: f32,
    pub bbox_y1: f32,
    pub bbox_x2: f32,
    pub bbox_y2: f32,
}

impl DetectionRecord {
    #[must_use]
    pub fn new(timestamp: f64, detection: &Detection) -> Self {
        Self {
            timestamp: round_to(timestamp, 3),
            class_id: detection.class_id,
            class_name: detection.class_name.clone(),
            confidence: detection.confidence,
            bbox_x1: detection.bbox.x1,
            bbox_y1: detection.bbox.y1,
            bbox_x2: detection.bbox.x2,
            bbox_y2: detection.bbox.y2,
        }
    }
}

/// One recognized text row; `bbox` holds the quad as a JSON point list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub timestamp: f64,
    pub text: String,
    pub confidence: f32,
    pub bbox: String,
}

impl TextRecord {
    #[must_use]
    pub fn new(timestamp: f64, region: &TextRegion) -> Self {
        Self {
            timestamp: round_to(timestamp, 3),
            text: region.text.clone(),
            confidence: region.confidence,
            bbox: region.quad_json(),
        }
    }
}

/// Paths of the two tables referenced by the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFiles {
    pub yolo_csv: PathBuf,
    pub ocr_csv: PathBuf,
}

/// Summary document written after a visual run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSummary {
    pub video_name: String,
    pub timestamp: DateTime<Utc>,
    pub num_yolo_detections: usize,
    pub num_ocr_detections: usize,
    pub output_video: Option<PathBuf>,
    pub output_files: SummaryFiles,
}

/// Write rows to a CSV file with a header line, even when empty.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub const DETECTION_HEADER: &[&str] = &[
    "timestamp",
    "class_id",
    "class_name",
    "confidence",
    "bbox_x1",
    "bbox_y1",
    "bbox_x2",
    "bbox_y2",
];

pub const TEXT_HEADER: &[&str] = &["timestamp", "text", "confidence", "bbox"];

pub fn write_summary(path: &Path, summary: &VisualSummary) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    info!("Summary saved to {}", path.display());
    Ok(())
}
