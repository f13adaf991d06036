//! Composite photo capture: the current frame with the overlay on top,
//! mirrored to match the on-screen preview, exported as PNG.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::info;
use std::path::{Path, PathBuf};

/// Composite `overlay` over `frame` and mirror the result horizontally.
///
/// The frame is scaled to the overlay's size first, so landmark placement
/// done on the overlay surface lines up with the frame content.
#[must_use]
pub fn compose_photo(frame: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let (width, height) = overlay.dimensions();
    let mut composite = if frame.dimensions() == (width, height) {
        frame.clone()
    } else {
        imageops::resize(frame, width, height, FilterType::Triangle)
    };
    imageops::overlay(&mut composite, overlay, 0, 0);
    imageops::flip_horizontal_in_place(&mut composite);
    composite
}

/// File name for a photo taken at `taken_at`: `<prefix>_<unix millis>.png`
#[must_use]
pub fn photo_file_name(prefix: &str, taken_at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.png", taken_at.timestamp_millis())
}

/// Write a composite photo into `dir`, named with the current timestamp.
///
/// # Errors
///
/// Returns `Error::Export` if the directory is missing or the PNG cannot be
/// written
pub fn export_photo(photo: &RgbaImage, dir: &Path, prefix: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::Export(format!("Output directory not found: {}", dir.display())));
    }
    let path = dir.join(photo_file_name(prefix, Utc::now()));
    photo
        .save_with_format(&path, image::ImageFormat::Png)
        .map_err(|e| Error::Export(format!("Failed to write {}: {e}", path.display())))?;
    info!("Photo taken successfully: {}", path.display());
    Ok(path)
}
