//! Frame clean-up before text recognition

use image::{DynamicImage, RgbImage};

/// Luma level above which a pixel becomes white
pub const OCR_BINARY_THRESHOLD: u8 = 150;

/// Grayscale the frame, binarize it at [`OCR_BINARY_THRESHOLD`], and return it
/// as RGB again so recognizers see a uniform pixel format.
#[must_use]
pub fn preprocess_for_ocr(frame: &RgbImage) -> RgbImage {
    let mut gray = image::imageops::grayscale(frame);
    for pixel in gray.pixels_mut() {
        pixel[0] = if pixel[0] > OCR_BINARY_THRESHOLD { 255 } else { 0 };
    }
    DynamicImage::ImageLuma8(gray).to_rgb8()
}
