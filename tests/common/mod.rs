#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use rockpaint::assets::MemoryAssetSource;
use rockpaint::canvas::{SURFACE_HEIGHT, SURFACE_WIDTH};
use rockpaint::{PainterSettings, Project};

pub const BASE_GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
pub const BASE_BLUE: Rgba<u8> = Rgba([20, 40, 200, 255]);
pub const STAMP_COLORS: [Rgba<u8>; 3] = [
    Rgba([255, 0, 0, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([0, 0, 255, 255]),
];

/// Assets named after the defaults in `PainterSettings`, plus a second base.
pub fn assets() -> MemoryAssetSource {
    let mut src = MemoryAssetSource::new();
    src.insert_image(
        "rock_base1.png",
        &RgbaImage::from_pixel(SURFACE_WIDTH, SURFACE_HEIGHT, BASE_GRAY),
    )
    .unwrap();
    // Smaller than the surface so it has to be stretched.
    src.insert_image("rock_base2.png", &RgbaImage::from_pixel(50, 35, BASE_BLUE))
        .unwrap();
    for (i, color) in STAMP_COLORS.iter().enumerate() {
        src.insert_image(
            format!("stamp_rock{}.png", i + 1),
            &RgbaImage::from_pixel(50, 50, *color),
        )
        .unwrap();
    }
    src
}

/// Session with its base image already painted and snapshotted.
pub fn ready_project(settings: PainterSettings) -> (Project, MemoryAssetSource) {
    let src = assets();
    let mut project = Project::new(settings);
    assert_eq!(project.pump_loads(&src), 1);
    project.take_events();
    (project, src)
}

pub fn drag(project: &mut Project, points: &[(f32, f32)]) {
    let (first, rest) = points.split_first().expect("at least one point");
    project.pointer_down(first.0, first.1);
    for &(x, y) in rest {
        project.pointer_move(x, y);
    }
    let last = points.last().copied().unwrap_or(*first);
    project.pointer_up(last.0, last.1);
}
