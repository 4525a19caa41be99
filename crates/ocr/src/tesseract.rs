//! Tesseract backend via leptess

use crate::{OCRConfig, OCRError, TextRecognizer, TextRegion};
use image::RgbImage;
use leptess::{LepTess, Variable};
use tracing::debug;

/// OCR recognizer using Tesseract word boxes
pub struct TesseractRecognizer {
    engine: LepTess,
    config: OCRConfig,
}

impl TesseractRecognizer {
    pub fn new(config: OCRConfig) -> Result<Self, OCRError> {
        let mut engine = LepTess::new(None, &config.language).map_err(|e| {
            OCRError::InitError(format!(
                "Failed to initialize Tesseract with language '{}': {}",
                config.language, e
            ))
        })?;

        engine
            .set_variable(
                Variable::TesseditPagesegMode,
                &config.page_segmentation_mode.to_string(),
            )
            .map_err(|e| OCRError::InitError(format!("Failed to set PSM: {e}")))?;

        Ok(Self { engine, config })
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, frame: &RgbImage) -> Result<Vec<TextRegion>, OCRError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(OCRError::InvalidImageDimensions(format!(
                "Image dimensions must be non-zero (got {width}x{height})"
            )));
        }

        // leptess takes encoded image data
        let mut png = std::io::Cursor::new(Vec::new());
        frame
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| OCRError::RecognitionError(format!("Failed to encode frame: {e}")))?;
        self.engine
            .set_image_from_mem(png.get_ref())
            .map_err(|e| OCRError::RecognitionError(format!("Failed to set image: {e}")))?;

        // None means the page has no text
        let Some(boxes) = self
            .engine
            .get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true)
        else {
            return Ok(Vec::new());
        };

        let mut regions = Vec::new();
        for bbox in &boxes {
            let geom = bbox.get_geometry();
            self.engine.set_rectangle(geom.x, geom.y, geom.w, geom.h);

            let text = self.engine.get_utf8_text().unwrap_or_default().trim().to_string();
            if text.is_empty() {
                continue;
            }

            let confidence = self.engine.mean_text_conf() as f32 / 100.0;
            if confidence < self.config.min_confidence {
                continue;
            }

            debug!(
                "OCR found '{}' ({:.2}) at ({}, {})",
                text, confidence, geom.x, geom.y
            );
            regions.push(TextRegion::from_rect(
                text,
                confidence,
                geom.x as f32,
                geom.y as f32,
                geom.w as f32,
                geom.h as f32,
            ));
        }

        Ok(regions)
    }
}
