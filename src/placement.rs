//! Overlay placement: turns an anchor frame and a filter descriptor into the
//! transform used to draw the overlay image.

use crate::constants::{EYES_Y_OFFSET_FACTOR, FOREHEAD_Y_OFFSET_FACTOR, NOSE_Y_OFFSET_FACTOR};
use crate::filters::{AnchorKind, FilterDescriptor, FilterRegistry};
use crate::landmarks::AnchorFrame;
use log::debug;
use nalgebra::Point2;

/// Where and how to draw one overlay.
///
/// The overlay is drawn in a coordinate system translated to `center` and
/// rotated by `rotation`; its top-left corner sits at `(-width / 2, y_offset)`
/// in that system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTransform {
    pub center: Point2<f64>,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians, equal to the head roll
    pub rotation: f64,
    /// Offset of the overlay's top edge from `center`, before rotation
    pub y_offset: f64,
}

impl OverlayTransform {
    /// Offset of the overlay's left edge from `center`, before rotation
    #[must_use]
    pub fn x_offset(&self) -> f64 {
        -self.width / 2.0
    }

    /// Whether the overlay covers no area (coincident eye landmarks)
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Compute the draw transform of `descriptor` for one face.
///
/// Returns `None` when the descriptor's image is not loaded or its anchor
/// kind is unsupported.
#[must_use]
pub fn resolve_transform(frame: &AnchorFrame, descriptor: &FilterDescriptor) -> Option<OverlayTransform> {
    if !descriptor.is_bound() {
        return None;
    }

    let width = frame.face_width * descriptor.width_factor;
    let height = width * descriptor.height_factor;

    let (center, y_offset) = match descriptor.anchor {
        AnchorKind::Eyes => (
            Point2::new(frame.center_x, frame.eye_line_y()),
            -height * EYES_Y_OFFSET_FACTOR,
        ),
        AnchorKind::Nose => (frame.nose, -height * NOSE_Y_OFFSET_FACTOR),
        AnchorKind::Forehead => (
            Point2::new(frame.center_x, frame.forehead.y),
            -height * FOREHEAD_Y_OFFSET_FACTOR,
        ),
        AnchorKind::Unsupported => return None,
    };

    Some(OverlayTransform {
        center,
        width,
        height,
        rotation: frame.angle,
        y_offset,
    })
}

/// Resolve a filter by name. Unknown names yield `None`, not an error.
#[must_use]
pub fn resolve_named(frame: &AnchorFrame, registry: &FilterRegistry, name: &str) -> Option<OverlayTransform> {
    let Some(descriptor) = registry.get(name) else {
        debug!("No filter named {name}");
        return None;
    };
    resolve_transform(frame, descriptor)
}
