//! Capture sources and landmark providers.
//!
//! Both are external collaborators: a capture source produces frames, a
//! landmark provider turns a frame into zero or more face landmark sets.
//! This module defines the seams plus replay implementations that read
//! frames and recorded detector output from disk.

use crate::landmarks::{LandmarkSet, NormalizedLandmark};
use crate::{Error, Result};
use image::RgbaImage;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Image extensions accepted by [`ImageSequenceSource`]
const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One captured video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position of the frame in the capture stream
    pub index: u64,
    /// Pixel data as captured (not mirrored)
    pub image: RgbaImage,
}

impl Frame {
    /// Wrap an image as a frame
    #[must_use]
    pub fn new(index: u64, image: RgbaImage) -> Self {
        Self { index, image }
    }

    /// Frame width and height
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Detector output for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    /// Detected faces in detector order
    pub faces: Vec<LandmarkSet>,
}

impl DetectionResult {
    /// Result with no faces
    #[must_use]
    pub fn no_face() -> Self {
        Self::default()
    }

    /// Result with a single face
    #[must_use]
    pub fn single(face: LandmarkSet) -> Self {
        Self { faces: vec![face] }
    }

    /// The only face the overlay engine uses
    #[must_use]
    pub fn first_face(&self) -> Option<&LandmarkSet> {
        self.faces.first()
    }

    /// Whether any face was detected
    #[must_use]
    pub fn has_face(&self) -> bool {
        !self.faces.is_empty()
    }
}

/// Source of video frames
pub trait CaptureSource: Send {
    /// Open the device or stream
    ///
    /// # Errors
    ///
    /// Returns `Error::Capture` when the source is unavailable
    fn start(&mut self) -> Result<()>;

    /// Release the device or stream
    fn stop(&mut self);

    /// Block until the next frame is ready. `Ok(None)` marks the end of a
    /// finite stream.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Nominal frame size
    fn resolution(&self) -> (u32, u32);
}

/// Face landmark detector
pub trait LandmarkProvider: Send {
    /// Detect face landmarks in a frame
    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult>;
}

impl<T: CaptureSource + ?Sized> CaptureSource for Box<T> {
    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }

    fn resolution(&self) -> (u32, u32) {
        (**self).resolution()
    }
}

impl<T: LandmarkProvider + ?Sized> LandmarkProvider for Box<T> {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult> {
        (**self).detect(frame)
    }
}

/// Replays still images from disk as a frame stream
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    position: usize,
    resolution: (u32, u32),
    started: bool,
}

impl ImageSequenceSource {
    /// Use a single image or every image in a directory, in file name order
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or holds no images
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let paths = if path.is_dir() {
            let mut paths: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_frame_file(p))
                .collect();
            paths.sort();
            paths
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(Error::Capture(format!("Frame source not found: {}", path.display())));
        };

        if paths.is_empty() {
            return Err(Error::Capture(format!("No frames in {}", path.display())));
        }

        let resolution = image::image_dimensions(&paths[0])?;
        Ok(Self {
            paths,
            position: 0,
            resolution,
            started: false,
        })
    }

    /// Number of frames in the sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the sequence has no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

impl CaptureSource for ImageSequenceSource {
    fn start(&mut self) -> Result<()> {
        info!("Replaying {} frame(s)", self.paths.len());
        self.position = 0;
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if !self.started {
            return Err(Error::Capture("Capture source not started".to_string()));
        }
        let Some(path) = self.paths.get(self.position) else {
            return Ok(None);
        };
        debug!("Reading frame {}", path.display());
        let image = image::open(path)?.to_rgba8();
        let index = self.position as u64;
        self.position += 1;
        Ok(Some(Frame::new(index, image)))
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }
}

/// Replays recorded detector output.
///
/// The JSON layout follows face-mesh results: an array with one entry per
/// frame, each an array of faces, each an array of `{x, y, z?}` points.
/// Frames past the end of the recording report no face.
#[derive(Debug, Clone)]
pub struct ReplayLandmarkProvider {
    frames: Vec<DetectionResult>,
}

impl ReplayLandmarkProvider {
    /// Build a provider from per-frame detection results
    #[must_use]
    pub fn new(frames: Vec<DetectionResult>) -> Self {
        Self { frames }
    }

    /// Parse a recording from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or faces with too few landmarks
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<Vec<Vec<NormalizedLandmark>>> = serde_json::from_str(json)?;
        let frames = raw
            .iter()
            .map(|faces| {
                faces
                    .iter()
                    .map(|points| LandmarkSet::from_normalized(points))
                    .collect::<Result<Vec<_>>>()
                    .map(|faces| DetectionResult { faces })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(frames))
    }

    /// Load a recording from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Number of recorded frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the recording is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkProvider for ReplayLandmarkProvider {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult> {
        let index = usize::try_from(frame.index)
            .map_err(|_| Error::Detector(format!("Frame index {} out of range", frame.index)))?;
        Ok(self.frames.get(index).cloned().unwrap_or_default())
    }
}

#[cfg(feature = "camera")]
pub use camera::CameraSource;

#[cfg(feature = "camera")]
mod camera {
    use super::{CaptureSource, Frame};
    use crate::utils::image_conversion::mat_to_rgba_image;
    use crate::{Error, Result};
    use log::{info, warn};
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};

    /// Webcam capture through OpenCV
    pub struct CameraSource {
        index: i32,
        requested: (u32, u32),
        capture: Option<VideoCapture>,
        frames_read: u64,
    }

    impl CameraSource {
        /// Describe a camera; nothing is opened until `start`
        #[must_use]
        pub fn new(index: i32, width: u32, height: u32) -> Self {
            Self {
                index,
                requested: (width, height),
                capture: None,
                frames_read: 0,
            }
        }
    }

    impl CaptureSource for CameraSource {
        fn start(&mut self) -> Result<()> {
            info!("Opening camera {}", self.index);
            let mut cap = VideoCapture::new(self.index, videoio::CAP_ANY)?;
            if !cap.is_opened()? {
                return Err(Error::Capture(format!(
                    "Camera {} is unavailable or access was denied",
                    self.index
                )));
            }

            cap.set(CAP_PROP_FRAME_WIDTH, f64::from(self.requested.0))?;
            cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(self.requested.1))?;
            // Reduce buffer size for lower latency
            cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;

            self.capture = Some(cap);
            self.frames_read = 0;
            Ok(())
        }

        fn stop(&mut self) {
            if let Some(mut cap) = self.capture.take() {
                if let Err(e) = cap.release() {
                    warn!("Failed to release camera: {e}");
                }
            }
        }

        fn next_frame(&mut self) -> Result<Option<Frame>> {
            let cap = self
                .capture
                .as_mut()
                .ok_or_else(|| Error::Capture("Camera not started".to_string()))?;

            let mut mat = Mat::default();
            if !cap.read(&mut mat)? || mat.empty() {
                return Err(Error::Capture("Camera stopped delivering frames".to_string()));
            }

            let frame = Frame::new(self.frames_read, mat_to_rgba_image(&mat)?);
            self.frames_read += 1;
            Ok(Some(frame))
        }

        fn resolution(&self) -> (u32, u32) {
            self.requested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_FACE_MESH_LANDMARKS;

    fn recording(frames: &[usize]) -> String {
        let point = r#"{"x":0.5,"y":0.5,"z":-0.01}"#;
        let face = format!("[{}]", vec![point; NUM_FACE_MESH_LANDMARKS].join(","));
        let frames: Vec<String> = frames
            .iter()
            .map(|&faces| format!("[{}]", vec![face.as_str(); faces].join(",")))
            .collect();
        format!("[{}]", frames.join(","))
    }

    #[test]
    fn test_detection_result_first_face() {
        assert!(DetectionResult::no_face().first_face().is_none());
        assert!(!DetectionResult::no_face().has_face());
    }

    #[test]
    fn test_replay_provider() {
        let mut provider = ReplayLandmarkProvider::from_json(&recording(&[1, 0, 2])).unwrap();
        assert_eq!(provider.len(), 3);

        let frame = |index| Frame::new(index, RgbaImage::new(1, 1));
        assert_eq!(provider.detect(&frame(0)).unwrap().faces.len(), 1);
        assert!(!provider.detect(&frame(1)).unwrap().has_face());
        assert_eq!(provider.detect(&frame(2)).unwrap().faces.len(), 2);
        // Past the end of the recording
        assert!(!provider.detect(&frame(7)).unwrap().has_face());
    }

    #[test]
    fn test_replay_rejects_short_faces() {
        let json = r#"[[[{"x":0.1,"y":0.2}]]]"#;
        assert!(matches!(
            ReplayLandmarkProvider::from_json(json),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(ReplayLandmarkProvider::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_frame_extensions() {
        assert!(is_frame_file(Path::new("a/frame_001.PNG")));
        assert!(is_frame_file(Path::new("frame.jpeg")));
        assert!(!is_frame_file(Path::new("landmarks.json")));
        assert!(!is_frame_file(Path::new("README")));
    }

    #[test]
    fn test_missing_sequence() {
        assert!(matches!(
            ImageSequenceSource::open("/definitely/not/here"),
            Err(Error::Capture(_))
        ));
    }
}
