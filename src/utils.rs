//! Utility functions for numeric conversions and frame format interop.

pub mod safe_cast;

#[cfg(feature = "camera")]
pub mod image_conversion;
