//! Concurrent, failure-tolerant loading of filter images.
//!
//! Every configured image is requested once. All requests run at the same
//! time and are joined at a single point; a missing, undecodable or slow
//! image only disables its own filter.

use crate::filters::FilterRegistry;
use crate::{Error, Result};
use futures::future::{join_all, BoxFuture};
use image::RgbaImage;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Where filter image bytes come from
pub trait AssetSource: Send + Sync {
    /// Load and decode one image
    fn load(&self, path: PathBuf) -> BoxFuture<'static, Result<RgbaImage>>;
}

/// Reads filter images from a directory on disk
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    /// Resolve image paths relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn load(&self, path: PathBuf) -> BoxFuture<'static, Result<RgbaImage>> {
        let full_path = self.root.join(path);
        Box::pin(async move {
            let bytes = tokio::fs::read(&full_path).await?;
            let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
                .await
                .map_err(|e| Error::AssetLoad(format!("Decoder task failed: {e}")))??;
            Ok(image.to_rgba8())
        })
    }
}

/// Result of one image load attempt
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Filter name
    pub name: String,
    /// Decoded image; `None` if the attempt failed or timed out
    pub image: Option<Arc<RgbaImage>>,
}

impl LoadOutcome {
    /// Whether the image was loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }
}

/// Load every requested image concurrently and wait until all attempts have
/// resolved. Failures and timeouts are logged and reported as unbound
/// outcomes; they never fail the whole load.
pub async fn load_filter_images(
    source: Arc<dyn AssetSource>,
    requests: Vec<(String, PathBuf)>,
    timeout: Duration,
) -> Vec<LoadOutcome> {
    let start = Instant::now();
    let futures = requests.into_iter().map(|(name, path)| {
        let load = source.load(path.clone());
        async move {
            let image = match tokio::time::timeout(timeout, load).await {
                Ok(Ok(image)) => {
                    debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
                    Some(Arc::new(image))
                }
                Ok(Err(e)) => {
                    warn!("Failed to load image: {}: {e}", path.display());
                    None
                }
                Err(_) => {
                    warn!("Timed out loading image: {} after {timeout:?}", path.display());
                    None
                }
            };
            LoadOutcome { name, image }
        }
    });
    let outcomes = join_all(futures).await;

    let loaded = outcomes.iter().filter(|o| o.is_loaded()).count();
    info!(
        "Filter loading finished in {:?}: {loaded} loaded, {} failed",
        start.elapsed(),
        outcomes.len() - loaded
    );
    outcomes
}

/// Load the images of every filter in `registry` and bind the successful ones
pub async fn load_registry(registry: &mut FilterRegistry, source: Arc<dyn AssetSource>, timeout: Duration) {
    let outcomes = load_filter_images(source, registry.load_requests(), timeout).await;
    registry.bind_images(outcomes);
}
