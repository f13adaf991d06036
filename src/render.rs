//! Render sink abstraction, a raster implementation of it, and the per-frame
//! render step.

use crate::capture::DetectionResult;
use crate::filters::FilterRegistry;
use crate::landmarks::compute_anchors;
use crate::placement::{resolve_transform, OverlayTransform};
use crate::session::SessionState;
use crate::utils::safe_cast::f64_to_u32_clamp;
use image::{Pixel, Rgba, RgbaImage};
use log::debug;
use nalgebra::{Matrix3, Point2, Vector2};

/// A 2D drawing surface with a save/restore transform stack, modelled on an
/// immediate-mode canvas.
pub trait RenderSurface {
    /// Surface width in pixels
    fn width(&self) -> u32;

    /// Surface height in pixels
    fn height(&self) -> u32;

    /// Erase the whole surface to transparent. Does not touch the transform.
    fn clear(&mut self);

    /// Push the current transform
    fn save(&mut self);

    /// Pop the last saved transform. No-op when nothing is saved.
    fn restore(&mut self);

    /// Move the origin by `(dx, dy)` in current coordinates
    fn translate(&mut self, dx: f64, dy: f64);

    /// Rotate the coordinate system by `angle` radians
    fn rotate(&mut self, angle: f64);

    /// Scale the coordinate system
    fn scale(&mut self, sx: f64, sy: f64);

    /// Draw `image` stretched into the rectangle `(x, y, width, height)` of
    /// the current coordinate system
    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64);
}

/// Run `draw` between a `save` and a `restore` of `surface`
pub fn with_saved_state<S, F>(surface: &mut S, draw: F)
where
    S: RenderSurface + ?Sized,
    F: FnOnce(&mut S),
{
    surface.save();
    draw(surface);
    surface.restore();
}

/// Draw one overlay image with its placement transform
pub fn draw_overlay<S: RenderSurface + ?Sized>(surface: &mut S, image: &RgbaImage, transform: &OverlayTransform) {
    with_saved_state(surface, |s| {
        s.translate(transform.center.x, transform.center.y);
        s.rotate(transform.rotation);
        s.draw_image(
            image,
            transform.x_offset(),
            transform.y_offset,
            transform.width,
            transform.height,
        );
    });
}

/// Render the overlay for one detector result.
///
/// The surface is always cleared. Nothing is drawn before the session is
/// ready, while no filter is selected, when no face was detected, or when
/// the selected filter cannot be resolved. Returns the transform that was
/// drawn.
pub fn render_frame<S: RenderSurface + ?Sized>(
    surface: &mut S,
    session: &SessionState,
    registry: &FilterRegistry,
    detection: &DetectionResult,
) -> Option<OverlayTransform> {
    surface.clear();

    if !session.is_ready() {
        return None;
    }
    let name = session.active_filter()?;
    let face = detection.first_face()?;

    let Some(descriptor) = registry.get(name) else {
        debug!("Selected filter {name} is not configured");
        return None;
    };
    let anchors = compute_anchors(face, f64::from(surface.width()), f64::from(surface.height()));
    let Some(transform) = resolve_transform(&anchors, descriptor) else {
        debug!("Filter {name} has no drawable placement");
        return None;
    };
    let image = descriptor.image()?;

    draw_overlay(surface, image, &transform);
    Some(transform)
}

/// Raster render surface backed by an RGBA buffer
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    transform: Matrix3<f64>,
    saved: Vec<Matrix3<f64>>,
}

impl Canvas {
    /// Create a transparent canvas
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            transform: Matrix3::identity(),
            saved: Vec::new(),
        }
    }

    /// Current pixel contents
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take ownership of the pixel contents
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Current transform as a homogeneous 2D matrix
    #[must_use]
    pub fn current_transform(&self) -> &Matrix3<f64> {
        &self.transform
    }

    /// Number of saved, not yet restored, states
    #[must_use]
    pub fn saved_depth(&self) -> usize {
        self.saved.len()
    }

    /// Resize to match a new frame size. Clears pixels and resets the
    /// transform stack.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("Resizing canvas to {width}x{height}");
        *self = Self::new(width, height);
    }

    // Pixel bounds of a rectangle after mapping it through the transform
    fn device_bounds(&self, x: f64, y: f64, width: f64, height: f64) -> (u32, u32, u32, u32) {
        let corners = [
            (x, y),
            (x + width, y),
            (x, y + height),
            (x + width, y + height),
        ]
        .map(|(cx, cy)| self.transform.transform_point(&Point2::new(cx, cy)));

        let (min_x, max_x, min_y, max_y) = corners.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(min_x, max_x, min_y, max_y), p| (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y)),
        );

        (
            f64_to_u32_clamp(min_x.floor(), 0, self.width()),
            f64_to_u32_clamp(max_x.ceil(), 0, self.width()),
            f64_to_u32_clamp(min_y.floor(), 0, self.height()),
            f64_to_u32_clamp(max_y.ceil(), 0, self.height()),
        )
    }
}

impl RenderSurface for Canvas {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform *= Matrix3::new_translation(&Vector2::new(dx, dy));
    }

    fn rotate(&mut self, angle: f64) {
        self.transform *= Matrix3::new_rotation(angle);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform *= Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy));
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0) || !x.is_finite() || !y.is_finite() {
            return;
        }
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(inverse) = self.transform.try_inverse() else {
            return;
        };

        let (x0, x1, y0, y1) = self.device_bounds(x, y, width, height);
        let src_width = f64::from(image.width());
        let src_height = f64::from(image.height());

        // Sample pixel centres back into image space (nearest neighbour)
        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.transform_point(&Point2::new(f64::from(px) + 0.5, f64::from(py) + 0.5));
                let u = (local.x - x) / width;
                let v = (local.y - y) / height;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }

                let sx = f64_to_u32_clamp((u * src_width).floor(), 0, image.width() - 1);
                let sy = f64_to_u32_clamp((v * src_height).floor(), 0, image.height() - 1);
                let src = *image.get_pixel(sx, sy);
                if src[3] == 0 {
                    continue;
                }
                self.pixels.get_pixel_mut(px, py).blend(&src);
            }
        }
    }
}
