//! Scene text recognition
//!
//! The [`TextRecognizer`] capability reads text out of a single frame and
//! reports each fragment with a quadrilateral location in pixel
//! coordinates. Frames are normally passed through [`preprocess_for_ocr`]
//! first. The Tesseract implementation is compiled in with the `tesseract`
//! feature.

pub mod preprocess;
#[cfg(feature = "tesseract")]
pub mod tesseract;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use video_analysis_common::ProcessingError;

pub use preprocess::{preprocess_for_ocr, OCR_BINARY_THRESHOLD};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

/// Configuration for OCR processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OCRConfig {
    /// Tesseract language codes (e.g., "eng", "eng+fra")
    pub language: String,
    /// Minimum confidence (0.0-1.0) for a fragment to be reported
    pub min_confidence: f32,
    /// Page segmentation mode (see Tesseract PSM)
    pub page_segmentation_mode: u32,
}

impl Default for OCRConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            min_confidence: 0.0,
            page_segmentation_mode: 3,
        }
    }
}

/// Four corner points, clockwise from top-left, in pixels
pub type Quad = [[f32; 2]; 4];

/// Detected text region with content and location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    /// Recognized text content
    pub text: String,
    /// Recognition confidence score (0.0-1.0)
    pub confidence: f32,
    pub quad: Quad,
}

impl TextRegion {
    /// Region for an axis-aligned rectangle.
    #[must_use]
    pub fn from_rect(text: impl Into<String>, confidence: f32, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            quad: [[x, y], [x + w, y], [x + w, y + h], [x, y + h]],
        }
    }

    /// Quad serialized as a JSON array of points, the form written to CSV exports
    #[must_use]
    pub fn quad_json(&self) -> String {
        serde_json::to_string(&self.quad).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Capability: recognize text fragments in one frame.
pub trait TextRecognizer: Send {
    fn recognize(&mut self, frame: &RgbImage) -> Result<Vec<TextRegion>, OCRError>;
}

/// Errors that can occur during OCR processing
#[derive(Error, Debug)]
pub enum OCRError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitError(String),

    #[error("Failed to run OCR: {0}")]
    RecognitionError(String),

    #[error("Invalid image dimensions: {0}")]
    InvalidImageDimensions(String),
}

impl From<OCRError> for ProcessingError {
    fn from(err: OCRError) -> Self {
        ProcessingError::ModelError(err.to_string())
    }
}
