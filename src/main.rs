//! Face overlay application: replays frames and recorded landmarks through
//! the overlay pipeline and exports a composite photo.

use anyhow::{bail, Context, Result};
use clap::Parser;
use face_overlay::app::{run_capture, AppEvent, CaptureEnd, CaptureOptions, Notice, OverlayApp, RunSummary};
use face_overlay::capture::{CaptureSource, ImageSequenceSource, ReplayLandmarkProvider};
use face_overlay::config::{Config, EXAMPLE_CONFIG};
use face_overlay::constants::EVENT_CHANNEL_CAPACITY;
use face_overlay::loader::{load_filter_images, FsAssetSource};
use face_overlay::session::FilterSelection;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Image file or directory of frames to replay
    #[arg(short = 'i', long)]
    frames: Option<PathBuf>,

    /// Camera index to capture from instead of replaying frames
    #[cfg(feature = "camera")]
    #[arg(long)]
    cam: Option<i32>,

    /// Recorded face-mesh landmarks (JSON, one entry per frame)
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Filter to apply (a configured name, or "none")
    #[arg(short, long)]
    filter: Option<String>,

    /// Directory containing the filter images
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Per-image load timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Frame rate to pace capture at (0 runs unpaced)
    #[arg(long, default_value = "0")]
    fps: f64,

    /// Take a photo of the last frame before exiting
    #[arg(short, long)]
    photo: bool,

    /// Directory photos are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Face Overlay");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", Notice::InitFailed(format!("{e:#}")));
            return Err(e);
        }
    };

    let summary = run(&args, config).await?;
    println!(
        "Frames: {}, overlays drawn: {}, photos: {}",
        summary.frames, summary.overlays_drawn, summary.photos
    );
    Ok(())
}

/// Read the configuration file, apply command line overrides and validate
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(path) = &args.config {
        info!("Loading configuration from: {}", path.display());
        Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::default()
    };

    if let Some(filter) = &args.filter {
        config.default_filter.clone_from(filter);
    }
    if let Some(dir) = &args.assets {
        config.assets.dir.clone_from(dir);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.assets.load_timeout_ms = timeout_ms;
    }
    if let Some(dir) = &args.output_dir {
        config.photo.output_dir.clone_from(dir);
    }
    #[cfg(feature = "camera")]
    if let Some(index) = args.cam {
        config.capture.camera_index = index;
    }

    config.validate()?;
    Ok(config)
}

fn landmark_provider(args: &Args) -> Result<ReplayLandmarkProvider> {
    match &args.landmarks {
        Some(path) => {
            let provider = ReplayLandmarkProvider::from_file(path)
                .with_context(|| format!("Failed to read landmarks from {}", path.display()))?;
            info!("Replaying landmarks for {} frame(s)", provider.len());
            Ok(provider)
        }
        None => {
            warn!("No landmark recording given; every frame reports no face");
            Ok(ReplayLandmarkProvider::new(Vec::new()))
        }
    }
}

fn capture_source(args: &Args, config: &Config) -> Result<Box<dyn CaptureSource>> {
    #[cfg(feature = "camera")]
    if args.cam.is_some() {
        let capture = &config.capture;
        return Ok(Box::new(face_overlay::capture::CameraSource::new(
            capture.camera_index,
            capture.width,
            capture.height,
        )));
    }
    #[cfg(not(feature = "camera"))]
    let _ = config;

    let Some(path) = &args.frames else {
        bail!("No frame source given; pass --frames <path>");
    };
    Ok(Box::new(ImageSequenceSource::open(path)?))
}

async fn run(args: &Args, config: Config) -> Result<RunSummary> {
    let source = capture_source(args, &config).map_err(|e| {
        eprintln!("{}", Notice::InitFailed(format!("{e:#}")));
        e
    })?;
    let provider = landmark_provider(args)?;

    let registry = config.build_registry();
    let requests = registry.load_requests();

    let (events, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let consumer = tokio::spawn(OverlayApp::new(registry, config.photo.clone()).with_notices(notice_tx).run(events_rx));

    let notices = tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            match notice {
                Notice::Ready | Notice::PhotoSaved(_) => info!("{notice}"),
                other => eprintln!("{other}"),
            }
        }
    });

    let selection = FilterSelection::from_name(&config.default_filter);
    info!("Selected filter: {selection}");
    // Send failures below mean the event loop already stopped; its result says why
    let _ = events.send(AppEvent::SelectFilter(selection)).await;

    // Capture starts only once every filter image has resolved
    let outcomes = load_filter_images(
        Arc::new(FsAssetSource::new(&config.assets.dir)),
        requests,
        config.load_timeout(),
    )
    .await;
    let _ = events.send(AppEvent::FiltersLoaded(outcomes)).await;

    let options = CaptureOptions {
        frame_interval: (args.fps > 0.0).then(|| Duration::from_secs_f64(1.0 / args.fps)),
        max_frames: args.max_frames,
    };
    let capture_events = events.clone();
    let end = tokio::task::spawn_blocking(move || run_capture(source, provider, &capture_events, options))
        .await
        .context("Capture worker panicked")?;

    if end == CaptureEnd::Exhausted {
        if args.photo {
            let _ = events.send(AppEvent::TakePhoto).await;
        }
        let _ = events.send(AppEvent::Shutdown).await;
    }
    drop(events);

    let summary = consumer.await.context("Event loop panicked")??;
    notices.await.context("Notice printer panicked")?;
    Ok(summary)
}
