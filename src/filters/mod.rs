//! Overlay filter descriptors.
//!
//! A filter is a named raster overlay together with the rule that places it
//! on the face: which anchor region it hangs from and how large it is
//! relative to the face width.

/// Registry of configured filters keyed by name
pub mod registry;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub use registry::FilterRegistry;

/// Facial region an overlay is positioned relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    /// Centered on the eye line (glasses)
    Eyes,
    /// Hung from the nose tip (masks, whiskers)
    Nose,
    /// Sitting on the top of the head (ears)
    Forehead,
    /// Anchor string not recognized; such filters never draw
    #[serde(other)]
    Unsupported,
}

impl AnchorKind {
    /// Parse an anchor name, mapping anything unknown to `Unsupported`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "eyes" => Self::Eyes,
            "nose" => Self::Nose,
            "forehead" => Self::Forehead,
            _ => Self::Unsupported,
        }
    }
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eyes => "eyes",
            Self::Nose => "nose",
            Self::Forehead => "forehead",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Static description of one overlay filter
#[derive(Debug, Clone)]
pub struct FilterDescriptor {
    /// Asset path of the overlay image, relative to the asset directory
    pub image_path: PathBuf,
    /// Placement rule
    pub anchor: AnchorKind,
    /// Overlay width as a multiple of the face width
    pub width_factor: f64,
    /// Overlay height as a multiple of the overlay width
    pub height_factor: f64,
    image: Option<Arc<RgbaImage>>,
}

impl FilterDescriptor {
    /// Create a descriptor whose image is not loaded yet
    #[must_use]
    pub fn new(image_path: impl Into<PathBuf>, anchor: AnchorKind, width_factor: f64, height_factor: f64) -> Self {
        Self {
            image_path: image_path.into(),
            anchor,
            width_factor,
            height_factor,
            image: None,
        }
    }

    /// Decoded overlay image, if its load succeeded
    #[must_use]
    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        self.image.as_ref()
    }

    /// Whether the overlay image is available for drawing
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.image.is_some()
    }

    /// Attach a decoded image. Builder form used by tests and callers that
    /// load images themselves.
    #[must_use]
    pub fn with_image(mut self, image: Arc<RgbaImage>) -> Self {
        self.image = Some(image);
        self
    }

    pub(crate) fn bind(&mut self, image: Arc<RgbaImage>) {
        self.image = Some(image);
    }
}
