//! Face-mesh landmark sets and the per-frame anchor geometry derived from them.

use crate::constants::{FOREHEAD_CENTER, LEFT_EYE_OUTER, NOSE_TIP, NUM_FACE_MESH_LANDMARKS, RIGHT_EYE_OUTER};
use crate::{Error, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A single normalized landmark as emitted by the detector (x, y in [0, 1])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f64,
    pub y: f64,
    /// Relative depth, present in face-mesh output but unused for placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

/// Landmarks of one detected face, indexed positionally
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point2<f64>>,
}

impl LandmarkSet {
    /// Create a landmark set from normalized points
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 468 points are supplied
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        if points.len() < NUM_FACE_MESH_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Landmark set has {} points, expected at least {NUM_FACE_MESH_LANDMARKS}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Build a landmark set from raw detector output
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 468 points are supplied
    pub fn from_normalized(landmarks: &[NormalizedLandmark]) -> Result<Self> {
        Self::new(landmarks.iter().map(|lm| Point2::new(lm.x, lm.y)).collect())
    }

    /// Number of points in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed set; present for API symmetry
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Normalized point at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Point2<f64>> {
        self.points.get(index)
    }

    /// All normalized points
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    // Construction guarantees every consumed index is in range.
    fn project(&self, index: usize, width: f64, height: f64) -> Point2<f64> {
        let p = self.points[index];
        Point2::new(p.x * width, p.y * height)
    }
}

/// Anchor points of one face in surface pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorFrame {
    pub left_eye: Point2<f64>,
    pub right_eye: Point2<f64>,
    pub nose: Point2<f64>,
    pub forehead: Point2<f64>,
    /// Mean x of the two eye corners
    pub center_x: f64,
    /// Pixel distance between the outer eye corners; scale reference for every overlay
    pub face_width: f64,
    /// In-plane head roll in radians
    pub angle: f64,
}

impl AnchorFrame {
    /// Mean y of the two eye corners
    #[must_use]
    pub fn eye_line_y(&self) -> f64 {
        (self.left_eye.y + self.right_eye.y) / 2.0
    }
}

/// Project the consumed landmarks into a `surface_width` x `surface_height` surface
/// and derive the face scale and roll.
#[must_use]
pub fn compute_anchors(landmarks: &LandmarkSet, surface_width: f64, surface_height: f64) -> AnchorFrame {
    let left_eye = landmarks.project(LEFT_EYE_OUTER, surface_width, surface_height);
    let right_eye = landmarks.project(RIGHT_EYE_OUTER, surface_width, surface_height);
    let nose = landmarks.project(NOSE_TIP, surface_width, surface_height);
    let forehead = landmarks.project(FOREHEAD_CENTER, surface_width, surface_height);

    let dx = right_eye.x - left_eye.x;
    let dy = right_eye.y - left_eye.y;

    AnchorFrame {
        left_eye,
        right_eye,
        nose,
        forehead,
        center_x: (left_eye.x + right_eye.x) / 2.0,
        face_width: dx.hypot(dy),
        angle: dy.atan2(dx),
    }
}
