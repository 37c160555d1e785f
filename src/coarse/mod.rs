// tile_raster_core/src/coarse/mod.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The coarse rasterizer: turns each path's line soup into a per-tile
//! segment list, a signed backdrop, and a per-tile command list (spec §4.4).

pub mod dda;
pub mod ptcl;

use crate::concurrent::executor::Executor;
use crate::geometry::{Point, RectF, TileRect};
use crate::scene::{PathDef, Scene};
use dda::{trace_line, TileSegment};
use log::{debug, trace};
use smallvec::SmallVec;

/// A tile's winding backdrop and its (post-allocation) segment bookkeeping field, dual-purposed
/// as the spec describes: a live count during path_count, then `!seg_start` once segments for
/// the path have been assigned contiguous ranges.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tile {
    pub backdrop: i32,
    pub segment_count_or_ix: u32,
}

impl Tile {
    #[inline]
    pub fn has_segments(&self) -> bool {
        self.segment_count_or_ix != 0
    }

    #[inline]
    pub fn segment_start(&self) -> u32 {
        !self.segment_count_or_ix
    }
}

/// A clipped, tile-relative coverage segment (spec §3, `PathSegment`).
#[derive(Clone, Copy, Debug)]
pub struct PathSegment {
    pub p0: Point,
    pub p1: Point,
    pub y_edge: f32,
}

/// Everything coarse produces for one path before PTCL emission: its tile bbox, the dense tile
/// grid within that bbox, and the flat per-tile-contiguous segment array (spec §3, `Path`).
struct PathTiles {
    bbox: TileRect,
    tiles: Vec<Tile>,
    counts: Vec<u32>,
    segments: Vec<PathSegment>,
    packed_color: u32,
    even_odd: bool,
}

/// The coarse stage's full output: one PTCL stream per global tile, and the global segment
/// array every `CMD_FILL`'s `seg_index` indexes into.
pub struct CoarseOutput {
    pub grid_w: u32,
    pub grid_h: u32,
    pub ptcl: Vec<Vec<u32>>,
    pub segments: Vec<PathSegment>,
}

impl CoarseOutput {
    #[inline]
    pub fn tile_ptcl(&self, tx: u32, ty: u32) -> &[u32] {
        &self.ptcl[(ty * self.grid_w + tx) as usize]
    }
}

/// Runs coarse rasterization for every path in `scene` against a `grid_w x grid_h` tile grid
/// covering `canvas_w x canvas_h` pixels (spec §4.4).
pub fn rasterize_scene(
    scene: &Scene,
    canvas_w: u32,
    canvas_h: u32,
    executor: &dyn Executor,
) -> CoarseOutput {
    let grid_w = div_ceil(canvas_w, dda::TILE_WIDTH as u32);
    let grid_h = div_ceil(canvas_h, dda::TILE_HEIGHT as u32);

    let per_path: Vec<Option<PathTiles>> = executor.build_vector(scene.paths.len(), |i| {
        build_path_tiles(&scene.paths[i], canvas_w, canvas_h, grid_w, grid_h)
    });

    let mut ptcl: Vec<Vec<u32>> = vec![vec![]; (grid_w * grid_h) as usize];
    let mut segments = vec![];

    for path_tiles in per_path.iter().flatten() {
        let seg_base = segments.len() as u32;
        segments.extend_from_slice(&path_tiles.segments);

        let bbox = path_tiles.bbox;
        let width = bbox.width();
        debug!(
            "coarse: path bbox=({},{})-({},{}) segments={} tiles={}",
            bbox.x0, bbox.y0, bbox.x1, bbox.y1, path_tiles.segments.len(), path_tiles.tiles.len()
        );
        for local_ty in 0..bbox.height() {
            for local_tx in 0..width {
                let local = (local_ty * width + local_tx) as usize;
                let tile = path_tiles.tiles[local];
                let count = path_tiles.counts[local];
                let global_tx = bbox.x0 + local_tx;
                let global_ty = bbox.y0 + local_ty;
                let global_index = (global_ty * grid_w + global_tx) as usize;
                trace!(
                    "coarse: tile ({},{}) backdrop={} count={}",
                    global_tx, global_ty, tile.backdrop, count
                );
                if count > 0 {
                    ptcl::push_fill(
                        &mut ptcl[global_index],
                        count,
                        path_tiles.even_odd,
                        seg_base + tile.segment_start(),
                        tile.backdrop,
                    );
                    ptcl::push_color(&mut ptcl[global_index], path_tiles.packed_color);
                } else if tile.backdrop != 0 {
                    ptcl::push_solid(&mut ptcl[global_index]);
                    ptcl::push_color(&mut ptcl[global_index], path_tiles.packed_color);
                }
            }
        }
    }

    for stream in ptcl.iter_mut() {
        ptcl::push_end(stream);
    }

    CoarseOutput { grid_w, grid_h, ptcl, segments }
}

fn build_path_tiles(
    path: &PathDef,
    canvas_w: u32,
    canvas_h: u32,
    grid_w: u32,
    grid_h: u32,
) -> Option<PathTiles> {
    if path.is_empty() {
        return None;
    }
    let canvas_bounds = RectF::new(Point::new(0.0, 0.0), Point::new(canvas_w as f32, canvas_h as f32));
    let clamped_lines: Vec<(Point, Point)> = path
        .lines
        .iter()
        .map(|line| (clamp_point(line.p0, canvas_bounds), clamp_point(line.p1, canvas_bounds)))
        .collect();

    let endpoints: Vec<Point> =
        clamped_lines.iter().flat_map(|&(a, b)| [a, b]).collect();
    let extent = RectF::bounding(&endpoints).clamp_to(canvas_bounds);

    let tx0 = (extent.min.x() / dda::TILE_WIDTH).floor().max(0.0) as u32;
    let ty0 = (extent.min.y() / dda::TILE_HEIGHT).floor().max(0.0) as u32;
    let tx1 = ((extent.max.x() / dda::TILE_WIDTH).ceil() as u32).min(grid_w).max(tx0);
    let ty1 = ((extent.max.y() / dda::TILE_HEIGHT).ceil() as u32).min(grid_h).max(ty0);
    let bbox = TileRect { x0: tx0, y0: ty0, x1: tx1, y1: ty1 };
    if bbox.tile_count() == 0 {
        return None;
    }

    let width = bbox.width();
    let mut tiles = vec![Tile::default(); bbox.tile_count() as usize];
    let mut segments_by_tile: Vec<SmallVec<[PathSegment; 4]>> =
        vec![SmallVec::new(); bbox.tile_count() as usize];

    for &(p0, p1) in &clamped_lines {
        let line_trace = trace_line(p0, p1);
        for seg in line_trace.segments {
            if let Some(local) = local_index(&bbox, seg.tx, seg.ty, width) {
                tiles[local].segment_count_or_ix += 1;
                segments_by_tile[local].push(to_path_segment(seg));
            }
        }
        for seed in line_trace.backdrop {
            if let Some(local) = local_index(&bbox, seed.tx, seed.ty, width) {
                tiles[local].backdrop += seed.delta;
            }
        }
    }

    let mut counts = vec![0u32; tiles.len()];
    let mut segments = Vec::with_capacity(segments_by_tile.iter().map(|v| v.len()).sum());
    let mut seg_ix = 0u32;
    for (local, tile) in tiles.iter_mut().enumerate() {
        let count = tile.segment_count_or_ix;
        counts[local] = count;
        if count > 0 {
            tile.segment_count_or_ix = !seg_ix;
            segments.extend(segments_by_tile[local].iter().copied());
            seg_ix += count;
        } else {
            tile.segment_count_or_ix = 0;
        }
    }

    for row in 0..bbox.height() {
        let mut running = 0i32;
        for col in 0..width {
            let local = (row * width + col) as usize;
            running += tiles[local].backdrop;
            tiles[local].backdrop = running;
        }
    }

    Some(PathTiles {
        bbox,
        tiles,
        counts,
        segments,
        packed_color: path.color.to_premul_packed(),
        even_odd: path.fill_rule.is_even_odd(),
    })
}

#[inline]
fn local_index(bbox: &TileRect, tx: i32, ty: i32, width: u32) -> Option<usize> {
    if tx < bbox.x0 as i32 || tx >= bbox.x1 as i32 || ty < bbox.y0 as i32 || ty >= bbox.y1 as i32 {
        return None;
    }
    let local_tx = (tx - bbox.x0 as i32) as u32;
    let local_ty = (ty - bbox.y0 as i32) as u32;
    Some((local_ty * width + local_tx) as usize)
}

#[inline]
fn to_path_segment(seg: TileSegment) -> PathSegment {
    PathSegment { p0: seg.p0, p1: seg.p1, y_edge: seg.y_edge }
}

#[inline]
fn clamp_point(p: Point, bounds: RectF) -> Point {
    Point::new(
        p.x().max(bounds.min.x()).min(bounds.max.x()),
        p.y().max(bounds.min.y()).min(bounds.max.y()),
    )
}

#[inline]
fn div_ceil(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}
