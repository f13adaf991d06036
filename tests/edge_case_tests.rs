//! Edge case tests for landmark geometry, the canvas and capture replay


use face_overlay::capture::{CaptureSource, ImageSequenceSource, LandmarkProvider, ReplayLandmarkProvider};
use face_overlay::landmarks::compute_anchors;
use face_overlay::placement::resolve_named;
use face_overlay::render::{draw_overlay, Canvas, RenderSurface};
use image::RgbaImage;
use test_helpers::{builtin_registry, face_at, solid_image};

#[test]
fn test_extreme_landmark_values() {
    let registry = builtin_registry(true);
    let extremes = [
        (f64::NAN, f64::NAN),
        (f64::INFINITY, f64::NEG_INFINITY),
        (1e12, -1e12),
        (-5.0, 7.0),
    ];

    for (x, y) in extremes {
        let face = face_at(1.0, 1.0, (x, y), (0.5, 0.5), (0.5, 0.6), (0.5, 0.2));
        let anchors = compute_anchors(&face, 640.0, 480.0);
        let mut canvas = Canvas::new(64, 48);
        for name in ["glasses", "ears", "mask", "whiskers"] {
            // Drawing must never panic, whatever the geometry
            if let Some(transform) = resolve_named(&anchors, &registry, name) {
                draw_overlay(&mut canvas, &solid_image(4, 4, [255, 255, 255, 255]), &transform);
            }
        }
        assert_eq!(canvas.saved_depth(), 0);
    }
}

#[test]
fn test_landmarks_outside_frame() {
    let face = face_at(1.0, 1.0, (-0.5, 0.5), (1.5, 0.5), (0.5, 0.6), (0.5, -0.2));
    let anchors = compute_anchors(&face, 100.0, 100.0);
    assert!((anchors.face_width - 200.0).abs() < 1e-9);

    let transform = resolve_named(&anchors, &builtin_registry(true), "ears").unwrap();
    let mut canvas = Canvas::new(100, 100);
    draw_overlay(&mut canvas, &solid_image(4, 4, [0, 255, 0, 255]), &transform);
    assert_eq!(canvas.image().dimensions(), (100, 100));
}

#[test]
fn test_empty_canvas_and_empty_image() {
    let mut canvas = Canvas::new(0, 0);
    canvas.clear();
    canvas.draw_image(&solid_image(2, 2, [1, 2, 3, 255]), 0.0, 0.0, 10.0, 10.0);
    assert_eq!(canvas.image().dimensions(), (0, 0));

    let mut canvas = Canvas::new(8, 8);
    canvas.draw_image(&RgbaImage::new(0, 0), 0.0, 0.0, 8.0, 8.0);
    assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
}

#[test]
fn test_unbalanced_restore_is_ignored() {
    let mut canvas = Canvas::new(4, 4);
    let identity = *canvas.current_transform();
    canvas.restore();
    canvas.restore();
    assert_eq!(canvas.current_transform(), &identity);
    assert_eq!(canvas.saved_depth(), 0);
}

#[test]
fn test_degenerate_scale_draws_nothing() {
    let mut canvas = Canvas::new(8, 8);
    canvas.save();
    canvas.scale(0.0, 1.0);
    canvas.draw_image(&solid_image(2, 2, [255, 0, 0, 255]), 0.0, 0.0, 8.0, 8.0);
    canvas.restore();
    assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
}

#[test]
fn test_single_image_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("still.png");
    solid_image(5, 4, [9, 9, 9, 255]).save(&path).unwrap();

    let mut source = ImageSequenceSource::open(&path).unwrap();
    assert_eq!(source.resolution(), (5, 4));
    source.start().unwrap();
    let frame = source.next_frame().unwrap().unwrap();
    assert_eq!(frame.index, 0);
    assert_eq!(frame.dimensions(), (5, 4));
    assert!(source.next_frame().unwrap().is_none());
    source.stop();
}

#[test]
fn test_sequence_skips_non_images_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    solid_image(2, 2, [2, 0, 0, 255]).save(dir.path().join("b.png")).unwrap();
    solid_image(2, 2, [1, 0, 0, 255]).save(dir.path().join("a.png")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

    let mut source = ImageSequenceSource::open(dir.path()).unwrap();
    assert_eq!(source.len(), 2);
    source.start().unwrap();
    let first = source.next_frame().unwrap().unwrap();
    assert_eq!(first.image.get_pixel(0, 0).0, [1, 0, 0, 255]);
}

#[test]
fn test_empty_recording_reports_no_face() {
    let mut provider = ReplayLandmarkProvider::from_json("[]").unwrap();
    assert!(provider.is_empty());
    let frame = face_overlay::capture::Frame::new(0, RgbaImage::new(1, 1));
    assert!(!provider.detect(&frame).unwrap().has_face());
}
