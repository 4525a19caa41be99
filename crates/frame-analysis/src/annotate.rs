//! Drawing detections and text regions onto frames

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_polygon_mut, draw_hollow_rect_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use video_analysis_object_detection::Detection;
use video_analysis_ocr::TextRegion;

pub const DETECTION_COLOR: Rgb<u8> = Rgb([255, 64, 0]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LINE_THICKNESS: u32 = 2;

/// Draw an object box, `LINE_THICKNESS` pixels wide, inside the frame.
pub fn draw_detection(frame: &mut RgbImage, detection: &Detection) {
    let bbox = detection.bbox.clamp_to(frame.width(), frame.height());
    let x = bbox.x1.round() as u32;
    let y = bbox.y1.round() as u32;
    let w = (bbox.width().round() as u32).min(frame.width().saturating_sub(x));
    let h = (bbox.height().round() as u32).min(frame.height().saturating_sub(y));

    for t in 0..LINE_THICKNESS {
        let inner_w = w.saturating_sub(2 * t);
        let inner_h = h.saturating_sub(2 * t);
        if inner_w > 0 && inner_h > 0 {
            let rect = Rect::at((x + t) as i32, (y + t) as i32).of_size(inner_w, inner_h);
            draw_hollow_rect_mut(frame, rect, DETECTION_COLOR);
        }
    }
}

/// Outline a recognized text quadrilateral.
pub fn draw_text_region(frame: &mut RgbImage, region: &TextRegion) {
    let points: Vec<Point<f32>> = region.quad.iter().map(|[x, y]| Point::new(*x, *y)).collect();
    // polygon drawing rejects closed or degenerate outlines
    if points.first() == points.last() {
        return;
    }
    draw_hollow_polygon_mut(frame, &points, TEXT_COLOR);
}

/// Draw all detections then all text regions.
pub fn annotate_frame(frame: &mut RgbImage, detections: &[Detection], regions: &[TextRegion]) {
    for detection in detections {
        draw_detection(frame, detection);
    }
    for region in regions {
        draw_text_region(frame, region);
    }
}
