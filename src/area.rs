// tile_raster_core/src/area.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The analytic per-pixel coverage kernel (`fillPath`), shared by the fine
//! rasterizer and the CPU reference compositor (spec §4.5 steps 1-4).

use crate::coarse::PathSegment;

pub const TILE_SIZE: usize = 16;
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;

/// Accumulates the exact signed coverage of `segments` into a 16x16 `area` buffer (row-major,
/// `area[y*16+x]`), starting from whatever `area` already holds. Does not apply a fill rule or
/// clamp — callers do that afterward (spec §4.5's "fill rule application").
pub fn accumulate_coverage(area: &mut [f32; TILE_PIXELS], segments: &[PathSegment]) {
    for yi in 0..TILE_SIZE {
        for segment in segments {
            accumulate_segment_row(area, yi, segment);
        }
    }
}

fn accumulate_segment_row(area: &mut [f32; TILE_PIXELS], yi: usize, s: &PathSegment) {
    let dy = s.p1.y() - s.p0.y();
    let dx = s.p1.x() - s.p0.x();
    let y = s.p0.y() - yi as f32;
    let y0 = y.clamp(0.0, 1.0);
    let y1 = (y + dy).clamp(0.0, 1.0);
    let delta = y0 - y1;

    let y_edge_contrib = if dx == 0.0 {
        0.0
    } else {
        dx.signum() * (yi as f32 - s.y_edge + 1.0).clamp(0.0, 1.0)
    };

    if delta != 0.0 {
        let t0 = (y0 - y) / dy;
        let t1 = (y1 - y) / dy;
        let x0 = s.p0.x() + t0 * dx;
        let x1 = s.p0.x() + t1 * dx;
        let xmin0 = x0.min(x1);
        let xmax0 = x0.max(x1);
        for i in 0..TILE_SIZE {
            let xmin = (xmin0 - i as f32).min(1.0) - 1e-6;
            let xmax = xmax0 - i as f32;
            let b = xmax.min(1.0);
            let c = b.max(0.0);
            let d = xmin.max(0.0);
            let a = (b + 0.5 * (d * d - c * c) - xmin) / (xmax - xmin);
            area[yi * TILE_SIZE + i] += y_edge_contrib + a * delta;
        }
    } else if y_edge_contrib != 0.0 {
        for i in 0..TILE_SIZE {
            area[yi * TILE_SIZE + i] += y_edge_contrib;
        }
    }
}

/// Non-zero: `min(|area|, 1)`. Even-odd: `|area - 2*round(0.5*area)|` (spec §4.5).
pub fn apply_fill_rule(area: &mut [f32; TILE_PIXELS], even_odd: bool) {
    for a in area.iter_mut() {
        *a = if even_odd {
            (*a - 2.0 * (0.5 * *a).round()).abs()
        } else {
            a.abs().min(1.0)
        };
    }
}
