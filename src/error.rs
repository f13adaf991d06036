//! Error types for the face overlay library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "camera")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Recorded landmark data could not be parsed
    #[error("Landmark data error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A filter image could not be loaded
    #[error("Asset load error: {0}")]
    AssetLoad(String),

    /// Camera unavailable, permission denied or capture stopped
    #[error("Capture error: {0}")]
    Capture(String),

    /// The landmark provider failed on a frame
    #[error("Landmark detector error: {0}")]
    Detector(String),

    /// Composite photo could not be written
    #[error("Photo export error: {0}")]
    Export(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
