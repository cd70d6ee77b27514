//! Integration tests: stamps, deferred loads, export and the gallery.

mod common;

use image::{Rgb, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use rockpaint::assets::{AssetSource, decode_image};
use rockpaint::canvas::{CanvasBounds, SURFACE_HEIGHT, SURFACE_WIDTH};
use rockpaint::components::tools::{ContinuousMode, ModeChange};
use rockpaint::gallery::{Gallery, MemoryStore};
use rockpaint::io::{DEFAULT_DOWNLOAD_NAME, load_image};
use rockpaint::{CommittedOp, PainterEvent, PainterSettings, Project};

use common::{BASE_BLUE, BASE_GRAY, STAMP_COLORS, assets, ready_project};

fn tap(project: &mut Project, x: f32, y: f32) -> bool {
    project.pointer_down(x, y);
    project.pointer_up(x, y).is_some()
}

fn close_to(a: Rgba<u8>, b: Rgba<u8>) -> bool {
    a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= 1)
}

#[test]
fn stamps_cycle_through_the_carousel() {
    let (mut project, src) = ready_project(PainterSettings::default());
    let spots = [(60.0, 60.0), (200.0, 60.0), (340.0, 60.0), (60.0, 200.0)];
    for &(x, y) in &spots {
        assert!(tap(&mut project, x, y));
        assert_eq!(project.pump_loads(&src), 1);
    }

    let seen: Vec<Rgba<u8>> = spots
        .iter()
        .map(|&(x, y)| project.surface().get_pixel(x as u32, y as u32))
        .collect();
    assert_eq!(
        seen,
        vec![STAMP_COLORS[0], STAMP_COLORS[1], STAMP_COLORS[2], STAMP_COLORS[0]]
    );
    assert_eq!(project.history().len(), 5);
    // Far from every stamp the base shows through.
    assert_eq!(project.surface().get_pixel(480, 330), BASE_GRAY);
}

#[test]
fn stamp_commits_a_snapshot_and_event() {
    let (mut project, src) = ready_project(PainterSettings::default());
    assert!(tap(&mut project, 250.0, 175.0));
    assert_eq!(project.pending_loads().len(), 1);
    project.pump_loads(&src);
    assert_eq!(
        project.take_events(),
        vec![PainterEvent::Committed(CommittedOp::Stamp)]
    );
    assert!(project.undo());
    assert!(project.pixels().pixels().all(|p| *p == BASE_GRAY));
}

#[test]
fn drag_never_stamps() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.pointer_down(100.0, 100.0);
    project.pointer_move(150.0, 100.0);
    assert_eq!(project.pointer_up(150.0, 100.0), None);
    assert!(project.pending_loads().is_empty());
}

#[test]
fn small_jitter_still_counts_as_a_click() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.pointer_down(100.0, 100.0);
    project.pointer_move(101.0, 101.0);
    assert!(project.pointer_up(101.0, 101.0).is_some());
}

#[test]
fn cancelled_press_never_stamps() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.pointer_down(100.0, 100.0);
    project.pointer_cancel();
    assert!(!project.is_drawing());
    assert!(project.pending_loads().is_empty());
}

#[test]
fn continuous_mode_blocks_stamps() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    for mode in ContinuousMode::all() {
        project.set_mode(*mode);
        assert!(!tap(&mut project, 100.0, 100.0), "{:?}", mode);
        project.set_mode(*mode);
    }
    assert!(project.modes().active().is_none());
    assert!(tap(&mut project, 100.0, 100.0));
}

#[test]
fn click_during_stroke_is_ignored() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.pointer_down(10.0, 10.0);
    assert_eq!(project.click(10.0, 10.0), None);
    assert_eq!(project.stamps().cursor(), 0);
}

#[test]
fn stamp_lands_at_translated_position() {
    let (mut project, src) = ready_project(PainterSettings::default());
    project.set_bounds(CanvasBounds::new(300.0, 200.0));
    assert!(tap(&mut project, 400.0, 300.0));
    project.pump_loads(&src);
    assert_eq!(project.surface().get_pixel(100, 100), STAMP_COLORS[0]);
    assert_eq!(project.surface().get_pixel(250, 250), BASE_GRAY);
}

#[test]
fn mode_changes_are_reported() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    project.set_mode(ContinuousMode::Spray);
    project.set_mode(ContinuousMode::Eraser);
    project.set_mode(ContinuousMode::Eraser);
    assert_eq!(
        project.take_events(),
        vec![
            PainterEvent::ModeChanged(ModeChange {
                previous: None,
                current: Some(ContinuousMode::Spray),
            }),
            PainterEvent::ModeChanged(ModeChange {
                previous: Some(ContinuousMode::Spray),
                current: Some(ContinuousMode::Eraser),
            }),
            PainterEvent::ModeChanged(ModeChange {
                previous: Some(ContinuousMode::Eraser),
                current: None,
            }),
        ]
    );
}

#[test]
fn color_history_keeps_last_five() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    // Default brush color is already one of the swatches.
    assert_eq!(project.color_history().len(), 3);

    let picks: Vec<Rgb<u8>> = (1..=7u8).map(|v| Rgb([v, v * 10, v * 20])).collect();
    for c in &picks {
        project.set_brush_color(*c);
    }
    assert_eq!(project.color_history().to_vec(), picks[2..].to_vec());
    assert_eq!(project.brush().color, picks[6]);

    project.take_events();
    project.set_brush_color(picks[4]);
    assert!(project.take_events().is_empty());
    assert_eq!(project.color_history().to_vec(), picks[2..].to_vec());
}

#[test]
fn stale_base_completion_is_dropped() {
    let (mut project, _src) = ready_project(PainterSettings::default());
    let older = project.request_base("rock_base1.png");
    let newer = project.request_base("rock_base2.png");

    let blue = RgbaImage::from_pixel(SURFACE_WIDTH, SURFACE_HEIGHT, BASE_BLUE);
    let gray = RgbaImage::from_pixel(SURFACE_WIDTH, SURFACE_HEIGHT, BASE_GRAY);
    assert!(project.complete_load(newer, Ok(blue)));
    assert!(!project.complete_load(older, Ok(gray)));

    assert!(project.pixels().pixels().all(|p| *p == BASE_BLUE));
    assert_eq!(project.current_base(), "rock_base2.png");
    assert_eq!(project.history().len(), 2);
    assert!(!project.complete_load(older, Err("late".into())));
}

#[test]
fn small_base_is_stretched_over_the_surface() {
    let (mut project, src) = ready_project(PainterSettings::default());
    project.request_base("rock_base2.png");
    assert_eq!(project.pump_loads(&src), 1);
    for &(x, y) in &[(0, 0), (250, 175), (499, 349)] {
        let p = project.surface().get_pixel(x, y);
        assert!(close_to(p, BASE_BLUE), "({}, {}) = {:?}", x, y, p);
    }
    assert_eq!(
        project.take_events(),
        vec![PainterEvent::Committed(CommittedOp::BaseReplaced)]
    );
}

#[test]
fn clear_repaints_current_base() {
    let (mut project, src) = ready_project(PainterSettings::default());
    tap(&mut project, 100.0, 100.0);
    project.pump_loads(&src);
    project.take_events();

    project.clear();
    assert_eq!(project.pump_loads(&src), 1);
    assert!(project.pixels().pixels().all(|p| *p == BASE_GRAY));
    assert_eq!(project.history().len(), 3);
    assert_eq!(
        project.take_events(),
        vec![PainterEvent::Committed(CommittedOp::Cleared)]
    );
}

#[test]
fn missing_stamp_reports_failure_and_leaves_surface() {
    let settings = PainterSettings {
        stamps: vec!["no_such_stamp.png".to_string()],
        ..PainterSettings::default()
    };
    let (mut project, src) = ready_project(settings);
    assert!(tap(&mut project, 100.0, 100.0));
    assert_eq!(project.pump_loads(&src), 0);

    let events = project.take_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        PainterEvent::AssetFailed { key, .. } if key == "no_such_stamp.png"
    ));
    assert_eq!(project.history().len(), 1);
    assert!(project.pixels().pixels().all(|p| *p == BASE_GRAY));
}

#[test]
fn failed_initial_base_leaves_history_empty() {
    let settings = PainterSettings {
        base_image: "no_such_base.png".to_string(),
        ..PainterSettings::default()
    };
    let mut project = Project::new(settings);
    assert_eq!(project.pump_loads(&assets()), 0);
    assert!(project.history().is_empty());
    assert!(project.surface().is_blank());
    assert!(!project.undo());
}

#[test]
fn same_seed_gives_same_artwork() {
    let paint = || {
        let (mut project, src) = ready_project(PainterSettings::default());
        tap(&mut project, 120.0, 90.0);
        project.set_mode(ContinuousMode::Glitter);
        common::drag(&mut project, &[(10.0, 10.0), (40.0, 40.0), (80.0, 20.0)]);
        project.pump_loads(&src);
        project.pixels().clone()
    };
    assert!(paint() == paint());
}

#[test]
fn gallery_save_stores_the_artwork() {
    let (mut project, src) = ready_project(PainterSettings::default());
    tap(&mut project, 100.0, 100.0);
    project.pump_loads(&src);
    project.take_events();

    let mut gallery = Gallery::new(MemoryStore::new());
    let id = project.save_to_gallery(&mut gallery).unwrap();
    assert_eq!(
        project.take_events(),
        vec![PainterEvent::GallerySaved { id, stored: 1 }]
    );

    let entries = gallery.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id);
    assert!(decode_image(&entries[0].png).unwrap() == *project.pixels());
}

#[test]
fn download_writes_default_name_into_directory() {
    let (project, _src) = ready_project(PainterSettings::default());
    let dir = std::env::temp_dir().join(format!("rockpaint-dl-{}", project.id));
    std::fs::create_dir_all(&dir).unwrap();

    let written = project.download(&dir).unwrap();
    assert_eq!(written, dir.join(DEFAULT_DOWNLOAD_NAME));
    assert!(load_image(&written).unwrap() == *project.pixels());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn memory_source_serves_inserted_assets() {
    let src = assets();
    assert!(src.fetch("stamp_rock2.png").is_ok());
    assert!(src.fetch("stamp_rock9.png").is_err());
}
