//! `YOLOv8` detector running through ONNX Runtime

use crate::postprocess::{decode_yolo_output, FrameScale};
use crate::{Detection, Detector, ObjectDetectionConfig, ObjectDetectionError};
use image::RgbImage;
use ndarray::Array4;
use ort::{session::Session, value::TensorRef};
use tracing::{debug, info};

/// Object detector using a `YOLOv8` ONNX export
pub struct YoloDetector {
    session: Session,
    config: ObjectDetectionConfig,
}

impl YoloDetector {
    pub fn new(config: ObjectDetectionConfig) -> Result<Self, ObjectDetectionError> {
        info!("Loading YOLOv8 model from {}", config.model_path.display());

        let session = Session::builder()
            .map_err(|e| ObjectDetectionError::ModelLoad(e.to_string()))?
            .commit_from_file(&config.model_path)
            .map_err(|e| ObjectDetectionError::ModelLoad(e.to_string()))?;

        Ok(Self { session, config })
    }

    /// Resize to the model input and convert to normalized NCHW.
    fn preprocess(&self, frame: &RgbImage) -> Array4<f32> {
        let size = self.config.input_size;
        let resized =
            image::imageops::resize(frame, size, size, image::imageops::FilterType::Triangle);

        let mut input = Array4::zeros((1, 3, size as usize, size as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            input[[0, 0, y, x]] = f32::from(pixel[0]) / 255.0;
            input[[0, 1, y, x]] = f32::from(pixel[1]) / 255.0;
            input[[0, 2, y, x]] = f32::from(pixel[2]) / 255.0;
        }
        input
    }
}

impl Detector for YoloDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>, ObjectDetectionError> {
        let input = self.preprocess(frame);
        let tensor = TensorRef::from_array_view(input.view())
            .map_err(|e| ObjectDetectionError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| ObjectDetectionError::Inference(e.to_string()))?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            ObjectDetectionError::Inference(format!("Failed to extract tensor: {e}"))
        })?;

        let dims = shape.as_ref();
        if dims.len() != 3 {
            return Err(ObjectDetectionError::Inference(format!(
                "Expected 3D output tensor, got {}D",
                dims.len()
            )));
        }
        debug!("ONNX output shape: {:?}", dims);

        let scale = FrameScale {
            frame_width: frame.width(),
            frame_height: frame.height(),
            input_size: self.config.input_size,
        };
        Ok(decode_yolo_output(
            data,
            dims[1] as usize,
            dims[2] as usize,
            scale,
            &self.config,
        ))
    }
}
