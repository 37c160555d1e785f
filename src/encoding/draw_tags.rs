// tile_raster_core/src/encoding/draw_tags.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The draw-tag monoid: tracks how many draw objects, clips, scene-data
//! words, and info words precede each draw tag, then extracts each draw's
//! info payload from the scene buffer (spec §4.3).

use crate::concurrent::executor::Executor;
use crate::encoding::DRAW_TAG_COLOR;

pub const DRAW_REDUCE_WG: usize = 256;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DrawMonoid {
    pub path_ix: u32,
    pub clip_ix: u32,
    pub scene_offset: u32,
    pub info_offset: u32,
}

impl DrawMonoid {
    #[inline]
    pub fn identity() -> DrawMonoid {
        DrawMonoid::default()
    }

    #[inline]
    pub fn combine(&self, other: &DrawMonoid) -> DrawMonoid {
        DrawMonoid {
            path_ix: self.path_ix + other.path_ix,
            clip_ix: self.clip_ix + other.clip_ix,
            scene_offset: self.scene_offset + other.scene_offset,
            info_offset: self.info_offset + other.info_offset,
        }
    }

    /// Derives one tag's monoid contribution (spec §4.3).
    pub fn from_tag(tag: u32) -> DrawMonoid {
        DrawMonoid {
            path_ix: if tag != 0 { 1 } else { 0 },
            clip_ix: tag & 1,
            scene_offset: (tag >> 2) & 0x7,
            info_offset: (tag >> 6) & 0xf,
        }
    }
}

fn reduce_block(tags: &[u32]) -> DrawMonoid {
    tags.iter()
        .map(|&tag| DrawMonoid::from_tag(tag))
        .fold(DrawMonoid::identity(), |acc, m| acc.combine(&m))
}

/// Exclusive-prefix `DrawMonoid` for every tag in `tags`, by the same two-level reduce/scan
/// structure as `path_tags::compute_path_monoids`.
pub fn compute_draw_monoids(tags: &[u32], executor: &dyn Executor) -> Vec<DrawMonoid> {
    if tags.is_empty() {
        return vec![];
    }
    let n_blocks = (tags.len() + DRAW_REDUCE_WG - 1) / DRAW_REDUCE_WG;

    let block_sums: Vec<DrawMonoid> = executor.build_vector(n_blocks, |block| {
        let start = block * DRAW_REDUCE_WG;
        let end = (start + DRAW_REDUCE_WG).min(tags.len());
        reduce_block(&tags[start..end])
    });

    let mut block_prefixes = vec![DrawMonoid::identity(); n_blocks];
    let mut running = DrawMonoid::identity();
    for block in 0..n_blocks {
        block_prefixes[block] = running;
        running = running.combine(&block_sums[block]);
    }

    executor.build_vector(tags.len(), |i| {
        let block = i / DRAW_REDUCE_WG;
        let block_start = block * DRAW_REDUCE_WG;
        let mut prefix = block_prefixes[block];
        for &tag in &tags[block_start..i] {
            prefix = prefix.combine(&DrawMonoid::from_tag(tag));
        }
        prefix
    })
}

/// Extracts each draw object's info payload from the scene buffer's draw-data region: for a
/// `DrawTagColor`, the single packed RGBA word at `draw_data[monoid.scene_offset]`.
pub fn extract_draw_info(tags: &[u32], monoids: &[DrawMonoid], draw_data: &[u32]) -> Vec<u32> {
    let total_info = monoids
        .last()
        .zip(tags.last())
        .map(|(m, &t)| m.combine(&DrawMonoid::from_tag(t)).info_offset)
        .unwrap_or(0);
    let mut info = vec![0u32; total_info as usize];
    for (i, &tag) in tags.iter().enumerate() {
        if tag == DRAW_TAG_COLOR {
            let monoid = monoids[i];
            info[monoid.info_offset as usize] = draw_data[monoid.scene_offset as usize];
        }
    }
    info
}
