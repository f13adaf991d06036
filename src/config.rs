//! Configuration management for the face overlay application

use crate::constants::{
    DEFAULT_ASSET_DIR, DEFAULT_CAPTURE_HEIGHT, DEFAULT_CAPTURE_WIDTH, DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_PHOTO_PREFIX,
    NO_FILTER,
};
use crate::filters::{AnchorKind, FilterDescriptor, FilterRegistry};
use crate::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter image loading
    pub assets: AssetConfig,

    /// Capture source parameters
    pub capture: CaptureConfig,

    /// Photo export
    pub photo: PhotoConfig,

    /// Filter selected at startup (`none` disables the overlay)
    pub default_filter: String,

    /// Filter definitions by name
    pub filters: BTreeMap<String, FilterSpec>,
}

/// Where filter images come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory that filter image paths are relative to
    pub dir: PathBuf,

    /// Give up on a single image after this many milliseconds
    pub load_timeout_ms: u64,
}

/// Capture source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera index
    pub camera_index: i32,

    /// Requested frame width
    pub width: u32,

    /// Requested frame height
    pub height: u32,
}

/// Photo export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Directory exported photos are written to
    pub output_dir: PathBuf,

    /// File name prefix; a millisecond timestamp and `.png` are appended
    pub prefix: String,
}

/// One filter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Image path relative to the asset directory
    pub image: PathBuf,

    /// Anchor region: eyes, nose or forehead
    pub anchor: AnchorKind,

    /// Overlay width as a multiple of the face width
    #[serde(alias = "widthFactor")]
    pub width_factor: f64,

    /// Overlay height as a multiple of the overlay width
    #[serde(alias = "heightFactor")]
    pub height_factor: f64,
}

impl FilterSpec {
    fn new(image: &str, anchor: AnchorKind, width_factor: f64, height_factor: f64) -> Self {
        Self {
            image: PathBuf::from(image),
            anchor,
            width_factor,
            height_factor,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            capture: CaptureConfig::default(),
            photo: PhotoConfig::default(),
            default_filter: NO_FILTER.to_string(),
            filters: default_filters(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_ASSET_DIR),
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            prefix: DEFAULT_PHOTO_PREFIX.to_string(),
        }
    }
}

/// Built-in filter set, available without any configuration file
#[must_use]
pub fn default_filters() -> BTreeMap<String, FilterSpec> {
    BTreeMap::from([
        ("glasses".to_string(), FilterSpec::new("glasses.png", AnchorKind::Eyes, 2.2, 0.5)),
        ("ears".to_string(), FilterSpec::new("dog_ears.png", AnchorKind::Forehead, 2.4, 0.9)),
        ("mask".to_string(), FilterSpec::new("mask.png", AnchorKind::Nose, 1.3, 1.5)),
        ("whiskers".to_string(), FilterSpec::new("whiskers.png", AnchorKind::Nose, 2.0, 0.5)),
    ])
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Per-image load timeout
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.assets.load_timeout_ms)
    }

    /// Build the filter registry. Images are not loaded yet.
    #[must_use]
    pub fn build_registry(&self) -> FilterRegistry {
        self.filters
            .iter()
            .map(|(name, spec)| {
                if spec.anchor == AnchorKind::Unsupported {
                    warn!("Filter {name} has an unrecognized anchor and will never be drawn");
                }
                (
                    name.clone(),
                    FilterDescriptor::new(spec.image.clone(), spec.anchor, spec.width_factor, spec.height_factor),
                )
            })
            .collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate filters
        if self.filters.is_empty() {
            return Err(Error::ConfigError("At least one filter must be configured".to_string()));
        }
        for (name, spec) in &self.filters {
            if name == NO_FILTER {
                return Err(Error::ConfigError(format!(
                    "'{NO_FILTER}' is reserved and cannot name a filter"
                )));
            }
            if spec.image.as_os_str().is_empty() {
                return Err(Error::ConfigError(format!("Filter {name} has no image path")));
            }
            if !(spec.width_factor.is_finite() && spec.width_factor > 0.0) {
                return Err(Error::ConfigError(format!(
                    "Filter {name}: width factor must be a positive number"
                )));
            }
            if !(spec.height_factor.is_finite() && spec.height_factor > 0.0) {
                return Err(Error::ConfigError(format!(
                    "Filter {name}: height factor must be a positive number"
                )));
            }
        }

        if self.default_filter != NO_FILTER && !self.filters.contains_key(&self.default_filter) {
            return Err(Error::ConfigError(format!(
                "Default filter not configured: {}",
                self.default_filter
            )));
        }

        // Validate loading and capture settings
        if self.assets.load_timeout_ms == 0 {
            return Err(Error::ConfigError("Load timeout must be greater than 0".to_string()));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(Error::ConfigError("Capture size must be non-zero".to_string()));
        }
        if self.capture.camera_index < 0 {
            return Err(Error::ConfigError("Camera index must not be negative".to_string()));
        }

        if self.photo.prefix.is_empty() {
            return Err(Error::ConfigError("Photo prefix must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Overlay Configuration

# Filter images
assets:
  dir: "filters"
  load_timeout_ms: 5000

# Capture source
capture:
  camera_index: 0
  width: 1280
  height: 720

# Photo export
photo:
  output_dir: "."
  prefix: "snap_photo"

# Filter selected at startup
default_filter: "none"

# Filters: anchor is one of eyes, nose, forehead
filters:
  ears:
    image: "dog_ears.png"
    anchor: "forehead"
    width_factor: 2.4
    height_factor: 0.9
  glasses:
    image: "glasses.png"
    anchor: "eyes"
    width_factor: 2.2
    height_factor: 0.5
  mask:
    image: "mask.png"
    anchor: "nose"
    width_factor: 1.3
    height_factor: 1.5
  whiskers:
    image: "whiskers.png"
    anchor: "nose"
    width_factor: 2.0
    height_factor: 0.5
"#;
