//! Constants used throughout the application

/// Minimum number of points in a face-mesh landmark set
pub const NUM_FACE_MESH_LANDMARKS: usize = 468;

/// Landmark count when iris refinement is enabled on the detector
pub const NUM_REFINED_FACE_MESH_LANDMARKS: usize = 478;

/// Face-mesh landmark indices consumed by the placement engine
pub const LEFT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_OUTER: usize = 263;
pub const NOSE_TIP: usize = 1;
pub const FOREHEAD_CENTER: usize = 10;

/// Vertical offset of the overlay's top edge, as a fraction of overlay height
pub const EYES_Y_OFFSET_FACTOR: f64 = 0.5;
pub const NOSE_Y_OFFSET_FACTOR: f64 = 0.25;
pub const FOREHEAD_Y_OFFSET_FACTOR: f64 = 0.75;

/// Selection name that disables the overlay
pub const NO_FILTER: &str = "none";

/// Default capture resolution requested from the camera
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1280;
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 720;

/// Default per-image load timeout in milliseconds
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 5000;

/// Default directory holding the filter images
pub const DEFAULT_ASSET_DIR: &str = "filters";

/// File name prefix for exported photos
pub const DEFAULT_PHOTO_PREFIX: &str = "snap_photo";

/// Capacity of the application event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 8;
