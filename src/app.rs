//! Main application module: the single consumer that owns session state and
//! turns detector results into overlay frames.

use crate::{
    capture::{CaptureSource, DetectionResult, Frame, LandmarkProvider},
    config::PhotoConfig,
    error::{Error, Result},
    filters::FilterRegistry,
    loader::LoadOutcome,
    photo::{compose_photo, export_photo},
    render::{render_frame, Canvas, RenderSurface},
    session::{FilterSelection, SessionState},
};
use image::RgbaImage;
use log::{debug, error, info, warn};
use std::fmt;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Input to the application, processed strictly in arrival order
#[derive(Debug)]
pub enum AppEvent {
    /// Every filter image load attempt has resolved
    FiltersLoaded(Vec<LoadOutcome>),
    /// Detector output for a captured frame
    Results {
        frame: Frame,
        detection: DetectionResult,
    },
    /// User picked a filter (or `none`)
    SelectFilter(FilterSelection),
    /// User asked for a composite photo
    TakePhoto,
    /// Capture failed; the visual feature cannot continue
    CaptureFailed(Error),
    /// Capture stream ended or the user quit
    Shutdown,
}

/// User-facing notices that must not go unnoticed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Filters finished loading; the loading indicator can be hidden
    Ready,
    /// Camera denied or unavailable
    CameraUnavailable(String),
    /// Startup failed
    InitFailed(String),
    /// Photo export failed
    PhotoFailed,
    /// Photo written
    PhotoSaved(PathBuf),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Filters ready"),
            Self::CameraUnavailable(_) => f.write_str("Camera access is required for this app."),
            Self::InitFailed(message) => write!(f, "App failed to start: {message}"),
            Self::PhotoFailed => f.write_str("Could not take photo"),
            Self::PhotoSaved(path) => write!(f, "Photo saved to {}", path.display()),
        }
    }
}

/// Counters reported when the event loop ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Detector results processed
    pub frames: u64,
    /// Frames on which an overlay was drawn
    pub overlays_drawn: u64,
    /// Photos exported
    pub photos: u64,
}

/// The overlay application state machine
pub struct OverlayApp {
    session: SessionState,
    registry: FilterRegistry,
    canvas: Canvas,
    last_frame: Option<RgbaImage>,
    photo: PhotoConfig,
    notices: Option<mpsc::UnboundedSender<Notice>>,
    summary: RunSummary,
}

impl OverlayApp {
    /// Create an application around a registry whose images are not loaded yet
    #[must_use]
    pub fn new(registry: FilterRegistry, photo: PhotoConfig) -> Self {
        info!("Initializing overlay application with {} filter(s)", registry.len());
        Self {
            session: SessionState::new(),
            registry,
            canvas: Canvas::new(0, 0),
            last_frame: None,
            photo,
            notices: None,
            summary: RunSummary::default(),
        }
    }

    /// Forward user-facing notices to `sender`
    #[must_use]
    pub fn with_notices(mut self, sender: mpsc::UnboundedSender<Notice>) -> Self {
        self.notices = Some(sender);
        self
    }

    /// Session state
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Filter registry
    #[must_use]
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Overlay surface as last rendered
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Counters so far
    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Process one event
    ///
    /// # Errors
    ///
    /// Returns the capture error when capture failed; every other failure is
    /// reported as a notice and the loop continues
    pub fn handle_event(&mut self, event: AppEvent) -> Result<ControlFlow<()>> {
        match event {
            AppEvent::FiltersLoaded(outcomes) => {
                self.registry.bind_images(outcomes);
                self.session.mark_ready();
                info!(
                    "All filters ready ({}/{} drawable)",
                    self.registry.bound_count(),
                    self.registry.len()
                );
                self.notify(Notice::Ready);
            }
            AppEvent::Results { frame, detection } => self.on_results(frame, &detection),
            AppEvent::SelectFilter(selection) => self.session.select(selection),
            AppEvent::TakePhoto => self.take_photo(),
            AppEvent::CaptureFailed(e) => {
                error!("Camera access denied or error: {e}");
                self.notify(Notice::CameraUnavailable(e.to_string()));
                return Err(e);
            }
            AppEvent::Shutdown => {
                info!("Application shutting down");
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Consume events until shutdown or until every sender is dropped
    ///
    /// # Errors
    ///
    /// Returns the capture error if capture failed
    pub async fn run(mut self, mut events: mpsc::Receiver<AppEvent>) -> Result<RunSummary> {
        info!("Starting event loop");
        while let Some(event) = events.recv().await {
            if self.handle_event(event)?.is_break() {
                break;
            }
        }
        info!(
            "Processed {} frame(s), drew {} overlay(s), took {} photo(s)",
            self.summary.frames, self.summary.overlays_drawn, self.summary.photos
        );
        Ok(self.summary)
    }

    fn on_results(&mut self, frame: Frame, detection: &DetectionResult) {
        let (width, height) = frame.dimensions();
        if (self.canvas.width(), self.canvas.height()) != (width, height) {
            self.canvas.resize(width, height);
        }

        self.summary.frames += 1;
        if render_frame(&mut self.canvas, &self.session, &self.registry, detection).is_some() {
            self.summary.overlays_drawn += 1;
        } else {
            debug!("No overlay drawn for frame {}", frame.index);
        }
        self.last_frame = Some(frame.image);
    }

    fn take_photo(&mut self) {
        let Some(frame) = &self.last_frame else {
            warn!("Could not take photo: no frame captured yet");
            self.notify(Notice::PhotoFailed);
            return;
        };
        let photo = compose_photo(frame, self.canvas.image());
        match export_photo(&photo, &self.photo.output_dir, &self.photo.prefix) {
            Ok(path) => {
                self.summary.photos += 1;
                self.notify(Notice::PhotoSaved(path));
            }
            Err(e) => {
                error!("Photo Error: {e}");
                self.notify(Notice::PhotoFailed);
            }
        }
    }

    fn notify(&self, notice: Notice) {
        if let Some(sender) = &self.notices {
            // Receiver gone means nobody is listening anymore
            let _ = sender.send(notice);
        }
    }
}

/// How a capture worker ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEnd {
    /// The source ran out of frames or the frame limit was reached
    Exhausted,
    /// The source failed; `AppEvent::CaptureFailed` was published
    Failed,
    /// The event loop stopped listening
    ConsumerClosed,
}

/// Pacing and limits for [`run_capture`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOptions {
    /// Minimum time between frames; `None` runs as fast as the source allows
    pub frame_interval: Option<Duration>,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

/// Capture frames, run the landmark provider on each and publish results.
///
/// Blocks the calling thread; run it with `tokio::task::spawn_blocking`.
/// `blocking_send` waits for channel capacity, so a slow consumer throttles
/// capture instead of queueing frames without bound. A detector error on a
/// single frame is treated as "no face"; a capture error publishes
/// `AppEvent::CaptureFailed` and ends the worker.
pub fn run_capture<C, P>(
    mut source: C,
    mut provider: P,
    events: &mpsc::Sender<AppEvent>,
    options: CaptureOptions,
) -> CaptureEnd
where
    C: CaptureSource,
    P: LandmarkProvider,
{
    if let Err(e) = source.start() {
        let _ = events.blocking_send(AppEvent::CaptureFailed(e));
        return CaptureEnd::Failed;
    }
    let (width, height) = source.resolution();
    info!("Capture started at {width}x{height}");

    let mut captured = 0u64;
    let end = loop {
        if options.max_frames.is_some_and(|max| captured >= max) {
            info!("Frame limit of {captured} reached");
            break CaptureEnd::Exhausted;
        }

        let started = Instant::now();
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("End of capture stream reached");
                break CaptureEnd::Exhausted;
            }
            Err(e) => {
                let _ = events.blocking_send(AppEvent::CaptureFailed(e));
                break CaptureEnd::Failed;
            }
        };
        captured += 1;

        let detection = match provider.detect(&frame) {
            Ok(detection) => detection,
            Err(e) => {
                warn!("Landmark detection failed on frame {}: {e}", frame.index);
                DetectionResult::no_face()
            }
        };

        if events.blocking_send(AppEvent::Results { frame, detection }).is_err() {
            debug!("Event loop closed, stopping capture");
            break CaptureEnd::ConsumerClosed;
        }

        if let Some(remaining) = options
            .frame_interval
            .and_then(|interval| interval.checked_sub(started.elapsed()))
        {
            std::thread::sleep(remaining);
        }
    };

    source.stop();
    end
}
