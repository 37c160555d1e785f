// tile_raster_core/src/driver.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ties the pipeline together: encode, pack, scan, rasterize coarse, then
//! interpret every tile's PTCL fine-grained to produce a final image.

use crate::coarse::rasterize_scene;
use crate::color::{ColorU, PremulColorF32};
use crate::concurrent::rayon::RayonExecutor;
use crate::encoding::draw_tags::{compute_draw_monoids, extract_draw_info};
use crate::encoding::layout::pack_scene;
use crate::encoding::path_tags::compute_path_monoids;
use crate::encoding::{encode_scene, pack_tag_stream};
use crate::fine::run_tile;
use crate::options::RenderOptions;
use crate::scene::Scene;
use log::info;

/// Renders `scene` into a `canvas_w x canvas_h` straight-alpha RGBA8 image over `background`,
/// using the default `RenderOptions` and a Rayon-backed executor.
pub fn render_scene(scene: &Scene, canvas_w: u32, canvas_h: u32, background: ColorU) -> Vec<ColorU> {
    render_scene_with_options(scene, canvas_w, canvas_h, background, RenderOptions::default())
}

/// Renders `scene` with explicit `options` (spec §4, the full encode -> scan -> coarse -> fine
/// pipeline).
///
/// The path/draw tag monoid scans run here against the fully packed scene buffer, exercising the
/// same encoding this crate ships for GPU-side consumption; the coarse stage itself walks
/// `scene.paths` directly rather than re-decoding that buffer; see `coarse`'s module
/// documentation for why.
pub fn render_scene_with_options(
    scene: &Scene,
    canvas_w: u32,
    canvas_h: u32,
    background: ColorU,
    options: RenderOptions,
) -> Vec<ColorU> {
    debug_assert!(canvas_w >= 1 && canvas_h >= 1, "canvas must be at least 1x1");

    let encoded = encode_scene(scene);
    let path_tag_words = pack_tag_stream(&encoded.path_tags);
    let executor = RayonExecutor;

    let path_monoids = compute_path_monoids(&path_tag_words, &executor);
    let draw_monoids = compute_draw_monoids(&encoded.draw_tags, &executor);
    let packed = pack_scene(&encoded, options.reduce_workgroup);
    let draw_info = extract_draw_info(&encoded.draw_tags, &draw_monoids, packed.draw_data());
    info!(
        "driver: encoded {} paths, {} path-tag words, {} draw objects, {} packed words",
        encoded.n_paths,
        path_tag_words.len(),
        encoded.n_draw_objects,
        packed.buffer.len()
    );
    debug_assert_eq!(path_monoids.len(), path_tag_words.len());
    debug_assert_eq!(draw_monoids.len(), encoded.draw_tags.len());
    // The scene buffer's own draw-info extraction must agree with each path's color exactly,
    // since coarse rasterizes straight from `scene.paths` rather than decoding the packed buffer.
    debug_assert_eq!(draw_info.len(), scene.paths.len());
    debug_assert!(draw_info
        .iter()
        .zip(scene.paths.iter())
        .all(|(&info_word, path)| info_word == path.color.to_premul_packed()));

    let coarse = rasterize_scene(scene, canvas_w, canvas_h, &executor);

    let background_premul = PremulColorF32 {
        r: background.r as f32 / 255.0 * (background.a as f32 / 255.0),
        g: background.g as f32 / 255.0 * (background.a as f32 / 255.0),
        b: background.b as f32 / 255.0 * (background.a as f32 / 255.0),
        a: background.a as f32 / 255.0,
    };

    let mut pixels = vec![background; (canvas_w * canvas_h) as usize];
    let (tile_w, tile_h) = options.tile_size;
    for ty in 0..coarse.grid_h {
        for tx in 0..coarse.grid_w {
            let ptcl = coarse.tile_ptcl(tx, ty);
            let tile_pixels = run_tile(ptcl, &coarse.segments, background_premul);
            for local_y in 0..tile_h {
                let y = ty * tile_h + local_y;
                if y >= canvas_h {
                    continue;
                }
                for local_x in 0..tile_w {
                    let x = tx * tile_w + local_x;
                    if x >= canvas_w {
                        continue;
                    }
                    let premul = tile_pixels[(local_y * tile_w + local_x) as usize];
                    pixels[(y * canvas_w + x) as usize] = premul.to_straight_u8();
                }
            }
        }
    }

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::scene::{FillRule, PathDef};

    #[test]
    fn opaque_triangle_paints_its_interior() {
        let verts = [Point::new(4.0, 4.0), Point::new(28.0, 4.0), Point::new(16.0, 28.0)];
        let path = PathDef::from_polygon(&verts, ColorU::new(255, 0, 0, 255), FillRule::NonZero);
        let mut scene = Scene::new();
        scene.push_path(path);
        let pixels = render_scene(&scene, 32, 32, ColorU::new(255, 255, 255, 255));
        let centroid = pixels[(16 * 32 + 16) as usize];
        assert_eq!(centroid, ColorU::new(255, 0, 0, 255));
    }

    #[test]
    fn empty_scene_is_uniform_background() {
        let scene = Scene::new();
        let bg = ColorU::new(1, 2, 3, 255);
        let pixels = render_scene(&scene, 16, 16, bg);
        assert!(pixels.iter().all(|&p| p == bg));
    }
}
