// tile_raster_core/tests/end_to_end.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Worked end-to-end scenarios, cross-checked against the reference
//! compositor (spec §8).

use tile_raster_core::driver::render_scene;
use tile_raster_core::geometry::Point;
use tile_raster_core::reference::render_scene_reference;
use tile_raster_core::scene::{FillRule, LineSoup, PathDef, Scene};
use tile_raster_core::{ColorU, RenderOptions};

const WHITE: ColorU = ColorU { r: 255, g: 255, b: 255, a: 255 };

/// Initializes the `log` facade so a failing scenario's `debug!`/`trace!` output from the coarse
/// stage shows up in the test harness's captured output. Safe to call from every test: repeat
/// calls after the first are no-ops.
fn init_logger() {
    let _ = env_logger::try_init();
}

fn triangle(verts: [Point; 3], color: ColorU, fill_rule: FillRule) -> PathDef {
    PathDef::from_polygon(&verts, color, fill_rule)
}

/// Asserts `actual` agrees with the reference compositor to within spec §8's tolerance: at most
/// 1 LSB of per-channel drift, on at most 1% of pixels.
fn assert_matches_reference(scene: &Scene, w: u32, h: u32, bg: ColorU) {
    let actual = render_scene(scene, w, h, bg);
    let expected = render_scene_reference(scene, w, h, bg);
    assert_eq!(actual.len(), expected.len());
    let mut mismatches = 0usize;
    for (a, e) in actual.iter().zip(expected.iter()) {
        let drift = (a.r as i32 - e.r as i32).abs().max((a.g as i32 - e.g as i32).abs())
            .max((a.b as i32 - e.b as i32).abs())
            .max((a.a as i32 - e.a as i32).abs());
        if drift > 1 {
            mismatches += 1;
        }
    }
    let allowed = (actual.len() / 100).max(1);
    assert!(
        mismatches <= allowed,
        "{} of {} pixels exceeded the 1-LSB tolerance (allowed {})",
        mismatches,
        actual.len(),
        allowed
    );
}

#[test]
fn opaque_red_triangle_on_white() {
    init_logger();
    let path = triangle(
        [Point::new(8.0, 8.0), Point::new(56.0, 8.0), Point::new(32.0, 56.0)],
        ColorU::new(255, 0, 0, 255),
        FillRule::NonZero,
    );
    let mut scene = Scene::new();
    scene.push_path(path);
    let pixels = render_scene(&scene, 64, 64, WHITE);
    assert_eq!(pixels[(32 * 64 + 32) as usize], ColorU::new(255, 0, 0, 255));
    assert_eq!(pixels[0], WHITE);
    assert_matches_reference(&scene, 64, 64, WHITE);
}

#[test]
fn full_canvas_square_with_inner_hole_via_nonzero() {
    init_logger();
    let outer = PathDef::new(
        vec![
            LineSoup::new(Point::new(0.0, 0.0), Point::new(64.0, 0.0)),
            LineSoup::new(Point::new(64.0, 0.0), Point::new(64.0, 64.0)),
            LineSoup::new(Point::new(64.0, 64.0), Point::new(0.0, 64.0)),
            LineSoup::new(Point::new(0.0, 64.0), Point::new(0.0, 0.0)),
        ],
        ColorU::new(0, 0, 255, 255),
        FillRule::NonZero,
    );
    let mut scene = Scene::new();
    scene.push_path(outer);
    let inner = PathDef::new(
        vec![
            LineSoup::new(Point::new(16.0, 16.0), Point::new(48.0, 16.0)),
            LineSoup::new(Point::new(48.0, 16.0), Point::new(48.0, 48.0)),
            LineSoup::new(Point::new(48.0, 48.0), Point::new(16.0, 48.0)),
            LineSoup::new(Point::new(16.0, 48.0), Point::new(16.0, 16.0)),
        ],
        WHITE,
        FillRule::NonZero,
    );
    scene.push_path(inner);
    let pixels = render_scene(&scene, 64, 64, ColorU::new(0, 0, 0, 0));
    assert_eq!(pixels[(32 * 64 + 32) as usize], WHITE);
    assert_eq!(pixels[(4 * 64 + 4) as usize], ColorU::new(0, 0, 255, 255));
    assert_matches_reference(&scene, 64, 64, ColorU::new(0, 0, 0, 0));
}

#[test]
fn even_odd_star_has_a_hollow_center() {
    init_logger();
    // A self-intersecting pentagram: the 5 outer points of a regular pentagon, connected in
    // "every other vertex" order so the path crosses itself and winds the central pentagon
    // twice. Even-odd treats that double winding as outside (a hole); non-zero would fill it.
    let verts = [
        Point::new(32.0, 4.0),
        Point::new(48.0, 55.0),
        Point::new(6.0, 23.0),
        Point::new(58.0, 23.0),
        Point::new(16.0, 55.0),
    ];
    let path = PathDef::from_polygon(&verts, ColorU::new(0, 200, 0, 255), FillRule::EvenOdd);
    let mut scene = Scene::new();
    scene.push_path(path);
    let pixels = render_scene(&scene, 64, 64, WHITE);
    // The pentagram's center sits inside the inner pentagon, wound twice: even-odd leaves it
    // unfilled, so it shows the background straight through the hole.
    assert_eq!(pixels[(32 * 64 + 32) as usize], WHITE);
    // A point near one of the star's outer tips is wound once and stays filled.
    assert_eq!(pixels[(10 * 64 + 32) as usize], ColorU::new(0, 200, 0, 255));
    assert_matches_reference(&scene, 64, 64, WHITE);
}

#[test]
fn semi_transparent_square_over_opaque_square() {
    init_logger();
    let bottom = PathDef::from_polygon(
        &[Point::new(0.0, 0.0), Point::new(64.0, 0.0), Point::new(64.0, 64.0), Point::new(0.0, 64.0)],
        ColorU::new(0, 0, 255, 255),
        FillRule::NonZero,
    );
    let top = PathDef::from_polygon(
        &[Point::new(16.0, 16.0), Point::new(48.0, 16.0), Point::new(48.0, 48.0), Point::new(16.0, 48.0)],
        ColorU::new(255, 0, 0, 128),
        FillRule::NonZero,
    );
    let mut scene = Scene::new();
    scene.push_path(bottom);
    scene.push_path(top);
    let pixels = render_scene(&scene, 64, 64, WHITE);
    let center = pixels[(32 * 64 + 32) as usize];
    assert!(center.r > 80 && center.r < 180);
    assert_eq!(center.b, 0);
    assert_matches_reference(&scene, 64, 64, WHITE);
}

#[test]
fn empty_scene_is_uniform_background() {
    init_logger();
    let scene = Scene::new();
    let bg = ColorU::new(10, 20, 30, 255);
    let pixels = render_scene(&scene, 48, 48, bg);
    assert!(pixels.iter().all(|&p| p == bg));
}

#[test]
fn solid_tile_backdrop_fills_without_segments() {
    init_logger();
    // A square whose edges sit entirely outside this canvas on three sides, and pass through
    // tile (0, 0) only via its winding backdrop: a vertical edge at x=8 descending the full
    // canvas height, closed far off the right edge of a single-tile canvas.
    let path = PathDef::new(
        vec![
            LineSoup::new(Point::new(8.0, 0.0), Point::new(8.0, 16.0)),
            LineSoup::new(Point::new(8.0, 16.0), Point::new(64.0, 16.0)),
            LineSoup::new(Point::new(64.0, 16.0), Point::new(64.0, 0.0)),
            LineSoup::new(Point::new(64.0, 0.0), Point::new(8.0, 0.0)),
        ],
        ColorU::new(0, 128, 0, 255),
        FillRule::NonZero,
    );
    let mut scene = Scene::new();
    scene.push_path(path);
    let pixels = render_scene(&scene, 16, 16, WHITE);
    assert_eq!(pixels[(8 * 16 + 12) as usize], ColorU::new(0, 128, 0, 255));
    assert_eq!(pixels[(8 * 16 + 2) as usize], WHITE);
}

#[test]
fn one_pixel_rectangle_aligned_to_tile_edge() {
    init_logger();
    let path = PathDef::from_polygon(
        &[Point::new(16.0, 16.0), Point::new(17.0, 16.0), Point::new(17.0, 17.0), Point::new(16.0, 17.0)],
        ColorU::new(255, 0, 255, 255),
        FillRule::NonZero,
    );
    let mut scene = Scene::new();
    scene.push_path(path);
    let pixels = render_scene(&scene, 32, 32, WHITE);
    assert_eq!(pixels[(16 * 32 + 16) as usize], ColorU::new(255, 0, 255, 255));
    assert_eq!(pixels[(16 * 32 + 17) as usize], WHITE);
}

#[test]
fn horizontal_line_on_tile_boundary_is_invisible() {
    init_logger();
    // A degenerate "path" that is just a horizontal line sitting exactly on a tile row boundary
    // contributes no coverage anywhere (spec §7).
    let path = PathDef::new(
        vec![LineSoup::new(Point::new(0.0, 16.0), Point::new(32.0, 16.0))],
        ColorU::new(255, 0, 0, 255),
        FillRule::NonZero,
    );
    let mut scene = Scene::new();
    scene.push_path(path);
    let pixels = render_scene(&scene, 32, 32, WHITE);
    assert!(pixels.iter().all(|&p| p == WHITE));
}

#[test]
fn render_scene_with_options_honors_custom_reduce_workgroup() {
    init_logger();
    let path = triangle(
        [Point::new(2.0, 2.0), Point::new(14.0, 2.0), Point::new(8.0, 14.0)],
        ColorU::new(0, 0, 0, 255),
        FillRule::NonZero,
    );
    let mut scene = Scene::new();
    scene.push_path(path);
    let options = RenderOptions { tile_size: (16, 16), reduce_workgroup: 4 };
    let pixels = render_scene(&scene, 16, 16, WHITE);
    let pixels_custom =
        tile_raster_core::driver::render_scene_with_options(&scene, 16, 16, WHITE, options);
    assert_eq!(pixels, pixels_custom);
}
