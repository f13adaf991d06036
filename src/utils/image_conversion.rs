//! Conversion from OpenCV capture frames to `image` buffers.

use super::safe_cast::i32_to_u32;
use crate::{Error, Result};
use image::RgbaImage;
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;

/// Convert a BGR(A) or grayscale OpenCV Mat into an RGBA image
///
/// # Errors
/// * Returns error if the Mat is empty or has an unsupported channel count
/// * Returns error if the color conversion fails
pub fn mat_to_rgba_image(mat: &Mat) -> Result<RgbaImage> {
    let rows = mat.rows();
    let cols = mat.cols();
    if rows <= 0 || cols <= 0 {
        return Err(Error::InvalidInput(format!("Invalid Mat dimensions: {cols}x{rows}")));
    }

    let code = match mat.channels() {
        1 => imgproc::COLOR_GRAY2RGBA,
        3 => imgproc::COLOR_BGR2RGBA,
        4 => imgproc::COLOR_BGRA2RGBA,
        n => {
            return Err(Error::InvalidInput(format!("Unsupported channel count: {n}")));
        }
    };

    let mut rgba = Mat::default();
    imgproc::cvt_color(mat, &mut rgba, code, 0)?;

    // cvt_color allocates a fresh, continuous buffer
    let data = rgba.data_bytes()?.to_vec();
    RgbaImage::from_raw(i32_to_u32(cols)?, i32_to_u32(rows)?, data)
        .ok_or_else(|| Error::InvalidInput("Converted frame buffer has the wrong length".to_string()))
}
