// tile_raster_core/src/reference.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A differential oracle for the main pipeline (spec §4.6, §8): renders each
//! path in isolation against a transparent background using the real
//! coarse+fine stages, then composites the per-path results back-to-front
//! with straight source-over. Agreeing with `driver::render_scene` to within
//! the tolerance spec §8 allows catches coarse/fine bugs that a
//! self-consistent single pipeline could not.

use crate::coarse::rasterize_scene;
use crate::color::{ColorU, PremulColorF32};
use crate::concurrent::executor::SequentialExecutor;
use crate::fine::run_tile;
use crate::scene::Scene;

/// Renders `scene` with the reference compositor and returns a row-major RGBA8 image over
/// `background` (straight alpha), the same contract as `driver::render_scene`.
pub fn render_scene_reference(scene: &Scene, canvas_w: u32, canvas_h: u32, background: ColorU) -> Vec<ColorU> {
    let mut pixels = vec![background; (canvas_w * canvas_h) as usize];

    for path in &scene.paths {
        let mut single = Scene::new();
        single.push_path(path.clone());
        let layer = render_layer(&single, canvas_w, canvas_h);
        for (dst, src) in pixels.iter_mut().zip(layer.iter()) {
            *dst = composite_straight(*src, *dst);
        }
    }

    pixels
}

/// Renders one path's isolated contribution over a transparent background, using the same
/// coarse+fine stages the main pipeline uses.
fn render_layer(single_path_scene: &Scene, canvas_w: u32, canvas_h: u32) -> Vec<PremulColorF32> {
    let executor = SequentialExecutor;
    let coarse = rasterize_scene(single_path_scene, canvas_w, canvas_h, &executor);
    let transparent = PremulColorF32::default();

    let mut out = vec![transparent; (canvas_w * canvas_h) as usize];
    for ty in 0..coarse.grid_h {
        for tx in 0..coarse.grid_w {
            let ptcl = coarse.tile_ptcl(tx, ty);
            let tile_pixels = run_tile(ptcl, &coarse.segments, transparent);
            for local_y in 0..16u32 {
                let y = ty * 16 + local_y;
                if y >= canvas_h {
                    continue;
                }
                for local_x in 0..16u32 {
                    let x = tx * 16 + local_x;
                    if x >= canvas_w {
                        continue;
                    }
                    out[(y * canvas_w + x) as usize] = tile_pixels[(local_y * 16 + local_x) as usize];
                }
            }
        }
    }
    out
}

/// Straight-alpha source-over: `fg` (premultiplied) painted over `bg` (straight-alpha 8-bit).
fn composite_straight(fg: PremulColorF32, bg: ColorU) -> ColorU {
    let bg_premul = PremulColorF32 {
        r: bg.r as f32 / 255.0 * (bg.a as f32 / 255.0),
        g: bg.g as f32 / 255.0 * (bg.a as f32 / 255.0),
        b: bg.b as f32 / 255.0 * (bg.a as f32 / 255.0),
        a: bg.a as f32 / 255.0,
    };
    fg.over(bg_premul).to_straight_u8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::scene::{FillRule, PathDef};

    #[test]
    fn isolated_opaque_square_matches_its_own_color() {
        let verts = [
            Point::new(0.0, 0.0),
            Point::new(16.0, 0.0),
            Point::new(16.0, 16.0),
            Point::new(0.0, 16.0),
        ];
        let color = ColorU::new(10, 20, 30, 255);
        let path = PathDef::from_polygon(&verts, color, FillRule::NonZero);
        let mut scene = Scene::new();
        scene.push_path(path);
        let pixels = render_scene_reference(&scene, 16, 16, ColorU::new(255, 255, 255, 255));
        assert_eq!(pixels[0], color);
    }

    #[test]
    fn empty_scene_leaves_background_untouched() {
        let scene = Scene::new();
        let bg = ColorU::new(5, 6, 7, 255);
        let pixels = render_scene_reference(&scene, 8, 8, bg);
        assert!(pixels.iter().all(|&p| p == bg));
    }
}
