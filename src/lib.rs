//! Face overlay library for landmark-anchored webcam filters.
//!
//! This library places image overlays (glasses, ears, masks, whiskers) on a
//! face using the landmark points of an external face-mesh detector:
//! - Anchor geometry derived from four fixed landmarks (outer eye corners,
//!   nose tip, forehead centre)
//! - Per-filter placement rules sized from the face width and rotated with
//!   the head roll
//! - A canvas-style raster surface with a save/restore transform stack
//! - Concurrent, failure-tolerant loading of the overlay images
//!
//! The per-frame pipeline consists of:
//! 1. A capture source producing frames
//! 2. A landmark provider returning zero or more faces per frame
//! 3. The render step clearing the overlay surface and drawing the active
//!    filter on the first face
//!
//! # Examples
//!
//! ## Placing an overlay
//!
//! ```
//! use face_overlay::filters::{AnchorKind, FilterDescriptor};
//! use face_overlay::landmarks::{compute_anchors, LandmarkSet};
//! use face_overlay::placement::resolve_transform;
//! use image::RgbaImage;
//! use nalgebra::Point2;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut points = vec![Point2::new(0.5, 0.5); 468];
//! points[33] = Point2::new(0.25, 0.5); // left eye, outer corner
//! points[263] = Point2::new(0.75, 0.5); // right eye, outer corner
//! let face = LandmarkSet::new(points)?;
//!
//! let anchors = compute_anchors(&face, 640.0, 480.0);
//! assert_eq!(anchors.face_width, 320.0);
//!
//! let glasses = FilterDescriptor::new("glasses.png", AnchorKind::Eyes, 2.2, 0.5)
//!     .with_image(Arc::new(RgbaImage::new(64, 16)));
//! let transform = resolve_transform(&anchors, &glasses).expect("image is bound");
//! println!("Draw {}x{} at {:?}", transform.width, transform.height, transform.center);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the event loop
//!
//! ```no_run
//! use face_overlay::app::{AppEvent, OverlayApp};
//! use face_overlay::config::Config;
//! use face_overlay::loader::{load_filter_images, FsAssetSource};
//! use face_overlay::session::FilterSelection;
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! # async fn demo() -> face_overlay::Result<()> {
//! let config = Config::default();
//! let registry = config.build_registry();
//! let requests = registry.load_requests();
//!
//! let (events, rx) = mpsc::channel(8);
//! let app = OverlayApp::new(registry, config.photo.clone());
//! let consumer = tokio::spawn(app.run(rx));
//!
//! let source = Arc::new(FsAssetSource::new(&config.assets.dir));
//! let outcomes = load_filter_images(source, requests, config.load_timeout()).await;
//! let _ = events.send(AppEvent::FiltersLoaded(outcomes)).await;
//! let _ = events.send(AppEvent::SelectFilter(FilterSelection::from_name("glasses"))).await;
//! // ... capture worker publishes AppEvent::Results here ...
//! let _ = events.send(AppEvent::Shutdown).await;
//!
//! let summary = consumer.await.expect("event loop panicked")?;
//! println!("Drew {} overlays", summary.overlays_drawn);
//! # Ok(())
//! # }
//! ```

/// Face-mesh landmark sets and anchor geometry
pub mod landmarks;

/// Overlay filter descriptors and the filter registry
pub mod filters;

/// Overlay placement rules
pub mod placement;

/// Render surface, raster canvas and the frame render step
pub mod render;

/// Session state: filter selection and readiness
pub mod session;

/// Concurrent filter image loading
pub mod loader;

/// Capture sources and landmark providers
pub mod capture;

/// Composite photo capture and export
pub mod photo;

/// Utility functions for numeric conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
