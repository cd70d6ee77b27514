//! Integration tests: stroke painting through a session.

mod common;

use image::{Rgb, Rgba};
use pretty_assertions::assert_eq;
use rockpaint::canvas::{CanvasBounds, Composite, Surface};
use rockpaint::components::tools::{
    BrushState, ContinuousMode, StrokePoint, StrokeRng, StrokeState, ToolMode,
};
use rockpaint::{CommittedOp, PainterEvent, PainterSettings};

use common::{BASE_GRAY, drag, ready_project};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

#[test]
fn freehand_stroke_paints_band_of_brush_size() {
    let mut surface = Surface::new(64, 32);
    let mut stroke = StrokeState::default();
    let mut rng = StrokeRng::new(0);
    let brush = BrushState::new(Rgb([255, 0, 0]), 4);

    stroke.begin(StrokePoint::local(0.0, 0.0));
    assert!(surface.is_blank());
    stroke.extend(&mut surface, StrokePoint::local(10.0, 0.0), ToolMode::Freehand, &brush, &mut rng);
    stroke.end();

    for x in 0..=10 {
        for y in 0..=1 {
            assert_eq!(surface.get_pixel(x, y), RED, "({}, {})", x, y);
        }
    }
    assert_eq!(surface.get_pixel(5, 2)[3], 0);
    assert_eq!(surface.get_pixel(13, 0)[3], 0);
}

#[test]
fn eraser_clears_previously_painted_pixels() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.set_brush_color(Rgb([255, 0, 0]));
    project.set_brush_size(8);
    drag(&mut project, &[(50.0, 50.0), (150.0, 50.0)]);
    assert_eq!(project.surface().get_pixel(100, 50), RED);

    project.set_mode(ContinuousMode::Eraser);
    drag(&mut project, &[(60.0, 50.0), (140.0, 50.0)]);
    for x in 60..140 {
        for y in 48..=51 {
            assert_eq!(project.surface().get_pixel(x, y)[3], 0, "({}, {})", x, y);
        }
    }
    // Outside the eraser path the stroke and base survive.
    assert_eq!(project.surface().get_pixel(52, 50), RED);
    assert_eq!(project.surface().get_pixel(100, 80), BASE_GRAY);
}

#[test]
fn eraser_ignores_brush_color() {
    let mut surface = Surface::new(20, 20);
    surface.fill_circle(10.0, 10.0, 6.0, RED, Composite::SourceOver);
    let mut stroke = StrokeState::default();
    let mut rng = StrokeRng::new(0);
    let brush = BrushState::new(Rgb([0, 255, 0]), 4);
    stroke.begin(StrokePoint::local(10.0, 10.0));
    stroke.extend(&mut surface, StrokePoint::local(10.0, 10.0), ToolMode::Eraser, &brush, &mut rng);
    assert_eq!(surface.get_pixel(10, 10), Rgba([0, 0, 0, 0]));
}

#[test]
fn spray_leaves_scattered_dots_not_a_line() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.set_brush_color(Rgb([0, 0, 0]));
    project.set_brush_size(20);
    project.set_mode(ContinuousMode::Spray);
    drag(&mut project, &[(250.0, 175.0), (250.0, 175.0), (250.0, 175.0)]);

    let black = Rgba([0, 0, 0, 255]);
    let painted: Vec<(u32, u32)> = project
        .pixels()
        .enumerate_pixels()
        .filter(|(_, _, p)| **p == black)
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!painted.is_empty());
    for (x, y) in &painted {
        let d = ((*x as f32 + 0.5 - 250.0).powi(2) + (*y as f32 + 0.5 - 175.0).powi(2)).sqrt();
        assert!(d < 24.0, "spray dot at ({}, {})", x, y);
    }
    // Granular: far fewer pixels than a solid disc of radius 20.
    assert!(painted.len() < 600, "{} pixels painted", painted.len());
}

#[test]
fn glitter_dots_are_bright_and_near_the_pointer() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.set_brush_size(10);
    project.set_mode(ContinuousMode::Glitter);
    drag(&mut project, &[(100.0, 100.0), (300.0, 100.0)]);

    let mut found = 0;
    for (x, y, p) in project.pixels().enumerate_pixels() {
        if *p == BASE_GRAY {
            continue;
        }
        found += 1;
        assert!((x as f32 - 300.0).abs() <= 10.0 && (y as f32 - 100.0).abs() <= 10.0);
        // 70% lightness keeps every channel well above black.
        assert!(p[0].max(p[1]).max(p[2]) >= 200, "dull glitter {:?}", p);
    }
    assert!(found > 0);
}

#[test]
fn strokes_follow_canvas_bounds() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.set_bounds(CanvasBounds::new(200.0, 100.0));
    project.set_brush_color(Rgb([255, 0, 0]));
    drag(&mut project, &[(220.0, 120.0), (260.0, 120.0)]);
    assert_eq!(project.surface().get_pixel(40, 20), RED);
    assert_eq!(project.surface().get_pixel(240, 120), BASE_GRAY);
}

#[test]
fn stroke_end_does_not_snapshot_by_default() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    drag(&mut project, &[(10.0, 10.0), (100.0, 100.0)]);
    assert_eq!(project.history().len(), 1);
    assert!(!project.undo());
    assert!(project.take_events().is_empty());
}

#[test]
fn stroke_end_snapshots_when_enabled() {
    let settings = PainterSettings {
        snapshot_strokes: true,
        ..PainterSettings::default()
    };
    let (mut project, _src) = ready_project(settings);
    drag(&mut project, &[(10.0, 10.0), (100.0, 100.0)]);
    assert_eq!(project.history().len(), 2);
    assert_eq!(
        project.take_events(),
        vec![PainterEvent::Committed(CommittedOp::Stroke)]
    );
    assert!(project.undo());
    assert!(project.pixels().pixels().all(|p| *p == BASE_GRAY));
}

#[test]
fn moves_without_a_press_are_ignored() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.pointer_move(50.0, 50.0);
    project.pointer_move(80.0, 80.0);
    assert!(project.pixels().pixels().all(|p| *p == BASE_GRAY));
}
