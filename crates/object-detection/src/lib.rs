//! Object detection
//!
//! Frames go in, labelled pixel-space boxes come out. The [`Detector`]
//! capability hides the model; the `onnx` feature compiles in a `YOLOv8`
//! implementation backed by ONNX Runtime. Box decoding and non-maximum
//! suppression live in [`postprocess`] so they can be exercised without a
//! model file.

pub mod coco;
pub mod postprocess;
#[cfg(feature = "onnx")]
pub mod yolo;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use video_analysis_common::ProcessingError;

pub use coco::{class_name, COCO_CLASSES};
#[cfg(feature = "onnx")]
pub use yolo::YoloDetector;

/// Configuration for object detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDetectionConfig {
    /// Path to the exported ONNX model
    pub model_path: PathBuf,
    /// Minimum confidence threshold for detections (0.0-1.0)
    pub confidence_threshold: f32,
    /// `IoU` threshold for non-maximum suppression (0.0-1.0)
    pub iou_threshold: f32,
    /// Maximum number of detections to return per frame
    pub max_detections: usize,
    /// Square model input size (`YOLOv8` default is 640)
    pub input_size: u32,
}

impl Default for ObjectDetectionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/yolov8n.onnx"),
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
            input_size: 640,
        }
    }
}

/// Axis-aligned box in pixel coordinates of the source frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    #[must_use]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from a center/size box, the layout YOLO heads emit.
    #[must_use]
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    #[must_use]
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Calculate Intersection over Union (`IoU`) with another box
    #[must_use]
    #[inline]
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Clamp the box to a `width` x `height` frame.
    #[must_use]
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self::new(
            self.x1.clamp(0.0, w),
            self.y1.clamp(0.0, h),
            self.x2.clamp(0.0, w),
            self.y2.clamp(0.0, h),
        )
    }
}

/// One detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// COCO class ID
    pub class_id: u16,
    /// Human-readable class name
    pub class_name: String,
    /// Confidence score (0-1)
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Capability: find objects in a single RGB frame.
pub trait Detector: Send {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>, ObjectDetectionError>;
}

/// Error types for object detection
#[derive(Debug, Error)]
pub enum ObjectDetectionError {
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[cfg(feature = "onnx")]
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::Error),
}

impl From<ObjectDetectionError> for ProcessingError {
    fn from(err: ObjectDetectionError) -> Self {
        ProcessingError::ModelError(err.to_string())
    }
}
