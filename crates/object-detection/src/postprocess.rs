//! Decoding of YOLOv8 output tensors and non-maximum suppression

use crate::{class_name, BoundingBox, Detection, ObjectDetectionConfig};
use tracing::debug;

/// Geometry needed to map model-space boxes back onto the source frame
#[derive(Debug, Clone, Copy)]
pub struct FrameScale {
    pub frame_width: u32,
    pub frame_height: u32,
    pub input_size: u32,
}

impl FrameScale {
    fn x(&self) -> f32 {
        self.frame_width as f32 / self.input_size as f32
    }

    fn y(&self) -> f32 {
        self.frame_height as f32 / self.input_size as f32
    }
}

/// Decode a `[1, 4 + classes, anchors]` tensor into frame-space detections.
///
/// `data` is the flattened tensor in feature-major order: feature `f` of
/// anchor `a` sits at `f * num_anchors + a`.
#[must_use]
pub fn decode_yolo_output(
    data: &[f32],
    num_features: usize,
    num_anchors: usize,
    scale: FrameScale,
    config: &ObjectDetectionConfig,
) -> Vec<Detection> {
    if num_features <= 4 || data.len() < num_features * num_anchors {
        return Vec::new();
    }

    let num_classes = num_features - 4;
    let mut raw = Vec::with_capacity(num_anchors / 10);

    for anchor in 0..num_anchors {
        let feature = |f: usize| data[f * num_anchors + anchor];

        let (best_class, confidence) = (0..num_classes)
            .map(|c| (c, feature(4 + c)))
            .fold((0usize, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });

        if confidence < config.confidence_threshold {
            continue;
        }

        let bbox = BoundingBox::from_center(
            feature(0) * scale.x(),
            feature(1) * scale.y(),
            feature(2) * scale.x(),
            feature(3) * scale.y(),
        )
        .clamp_to(scale.frame_width, scale.frame_height);

        let class_id = best_class as u16;
        raw.push(Detection {
            class_id,
            class_name: class_name(class_id).to_string(),
            confidence,
            bbox,
        });
    }

    debug!("Raw detections before NMS: {}", raw.len());

    let mut kept = non_max_suppression(raw, config.iou_threshold);
    kept.truncate(config.max_detections);
    kept
}

/// Per-class greedy NMS, highest confidence first.
#[must_use]
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Detection> = Vec::with_capacity(detections.len());
    for det in detections {
        let suppressed = keep
            .iter()
            .any(|k| k.class_id == det.class_id && k.bbox.iou(&det.bbox) >= iou_threshold);
        if !suppressed {
            keep.push(det);
        }
    }
    keep
}
