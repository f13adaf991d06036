//! Tests for the per-frame render step: gating, idempotence and the
//! save/restore discipline


use face_overlay::capture::DetectionResult;
use face_overlay::render::{render_frame, Canvas, RenderSurface};
use face_overlay::session::{FilterSelection, SessionState};
use image::Rgba;
use test_helpers::{builtin_registry, level_detection, level_face, RecordingSurface, SurfaceCall};

fn ready_session(filter: &str) -> SessionState {
    let mut session = SessionState::new();
    session.mark_ready();
    session.select_name(filter);
    session
}

#[test]
fn test_nothing_drawn_before_ready() {
    let registry = builtin_registry(true);
    let mut session = SessionState::new();
    session.select_name("glasses");
    let mut surface = RecordingSurface::new(640, 480);

    for _ in 0..5 {
        assert!(render_frame(&mut surface, &session, &registry, &level_detection()).is_none());
    }
    assert_eq!(surface.draw_count(), 0);
    assert_eq!(surface.count(&SurfaceCall::Clear), 5);
}

#[test]
fn test_draws_once_ready() {
    let registry = builtin_registry(true);
    let session = ready_session("glasses");
    let mut surface = RecordingSurface::new(640, 480);

    let transform = render_frame(&mut surface, &session, &registry, &level_detection()).unwrap();
    assert_eq!(surface.calls.first(), Some(&SurfaceCall::Clear));
    assert_eq!(surface.draw_count(), 1);

    let drawn = surface
        .calls
        .iter()
        .find_map(|call| match call {
            SurfaceCall::DrawImage { x, y, width, height } => Some((*x, *y, *width, *height)),
            _ => None,
        })
        .unwrap();
    assert_eq!(drawn, (transform.x_offset(), transform.y_offset, transform.width, transform.height));
}

#[test]
fn test_save_restore_balanced() {
    let registry = builtin_registry(true);
    let session = ready_session("ears");
    let mut surface = RecordingSurface::new(640, 480);

    render_frame(&mut surface, &session, &registry, &level_detection());
    let calls = &surface.calls;
    assert_eq!(surface.count(&SurfaceCall::Save), 1);
    assert_eq!(surface.count(&SurfaceCall::Restore), 1);

    let save = calls.iter().position(|c| *c == SurfaceCall::Save).unwrap();
    let restore = calls.iter().position(|c| *c == SurfaceCall::Restore).unwrap();
    let draw = calls
        .iter()
        .position(|c| matches!(c, SurfaceCall::DrawImage { .. }))
        .unwrap();
    assert!(save < draw && draw < restore);
    assert!(matches!(calls[save + 1], SurfaceCall::Translate(..)));
    assert!(matches!(calls[save + 2], SurfaceCall::Rotate(..)));
}

#[test]
fn test_render_is_idempotent() {
    let registry = builtin_registry(true);
    let session = ready_session("mask");
    let mut canvas = Canvas::new(640, 480);

    render_frame(&mut canvas, &session, &registry, &level_detection());
    let first = canvas.image().clone();
    render_frame(&mut canvas, &session, &registry, &level_detection());

    assert_eq!(canvas.image(), &first);
    assert_eq!(canvas.saved_depth(), 0);
}

#[test]
fn test_none_selection_clears_only() {
    let registry = builtin_registry(true);
    let session = ready_session("none");
    assert_eq!(session.selection(), &FilterSelection::None);

    let mut surface = RecordingSurface::new(640, 480);
    assert!(render_frame(&mut surface, &session, &registry, &level_detection()).is_none());
    assert_eq!(surface.calls, vec![SurfaceCall::Clear]);
}

#[test]
fn test_no_face_clears_previous_overlay() {
    let registry = builtin_registry(true);
    let session = ready_session("glasses");
    let mut canvas = Canvas::new(640, 480);

    assert!(render_frame(&mut canvas, &session, &registry, &level_detection()).is_some());
    assert!(canvas.image().pixels().any(|p| p.0[3] != 0));

    assert!(render_frame(&mut canvas, &session, &registry, &DetectionResult::no_face()).is_none());
    assert!(canvas.image().pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
}

#[test]
fn test_only_first_face_is_used() {
    let registry = builtin_registry(true);
    let session = ready_session("glasses");
    let shifted = test_helpers::face_at(640.0, 480.0, (400.0, 300.0), (500.0, 300.0), (450.0, 340.0), (450.0, 250.0));
    let detection = DetectionResult {
        faces: vec![level_face(), shifted],
    };

    let mut surface = RecordingSurface::new(640, 480);
    let transform = render_frame(&mut surface, &session, &registry, &detection).unwrap();
    assert_eq!(surface.draw_count(), 1);
    assert!((transform.center.x - 200.0).abs() < 1e-9);
}

#[test]
fn test_failed_filter_disables_only_itself() {
    let mut registry = builtin_registry(false);
    let bound = builtin_registry(true);
    for name in ["glasses", "mask", "whiskers"] {
        registry.insert(name, bound.get(name).unwrap().clone());
    }
    assert_eq!(registry.bound_count(), 3);

    let mut surface = RecordingSurface::new(640, 480);
    for name in ["glasses", "mask", "whiskers"] {
        surface.reset();
        let session = ready_session(name);
        assert!(render_frame(&mut surface, &session, &registry, &level_detection()).is_some());
        assert_eq!(surface.draw_count(), 1, "{name} should draw");
    }

    surface.reset();
    let session = ready_session("ears");
    assert!(render_frame(&mut surface, &session, &registry, &level_detection()).is_none());
    assert_eq!(surface.calls, vec![SurfaceCall::Clear]);
}

#[test]
fn test_unknown_selection_draws_nothing() {
    let registry = builtin_registry(true);
    let session = ready_session("top_hat");
    let mut surface = RecordingSurface::new(640, 480);
    assert!(render_frame(&mut surface, &session, &registry, &level_detection()).is_none());
    assert_eq!(surface.draw_count(), 0);
}

#[test]
fn test_canvas_transform_restored_after_frame() {
    let registry = builtin_registry(true);
    let session = ready_session("glasses");
    let mut canvas = Canvas::new(320, 240);
    let identity = *canvas.current_transform();

    render_frame(&mut canvas, &session, &registry, &level_detection());
    assert_eq!(canvas.current_transform(), &identity);
    assert_eq!((canvas.width(), canvas.height()), (320, 240));
}
