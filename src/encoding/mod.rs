// tile_raster_core/src/encoding/mod.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Flattens a `Scene` into the packed `u32` scene buffer the monoid scans
//! and the coarse rasterizer consume.

pub mod draw_tags;
pub mod layout;
pub mod path_tags;

use crate::scene::Scene;
use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian};

pub const PATH_TAG_LINE_TO: u8 = 0x09;
pub const PATH_TAG_QUAD_TO: u8 = 0x0A;
pub const PATH_TAG_CUBIC_TO: u8 = 0x0B;
pub const PATH_TAG_PATH: u8 = 0x10;
pub const PATH_TAG_TRANSFORM: u8 = 0x20;
pub const PATH_TAG_STYLE: u8 = 0x40;

pub const DRAW_TAG_NOP: u32 = 0x00;
pub const DRAW_TAG_BEGIN_CLIP: u32 = 0x09;
pub const DRAW_TAG_COLOR: u32 = 0x44;
pub const DRAW_TAG_END_CLIP: u32 = 0x21;

bitflags! {
    /// The style word that follows a `Style` path tag.
    pub struct StyleFlags: u32 {
        const EVEN_ODD = 0b01;
    }
}

/// An identity affine transform, `[a, b, c, d, e, f]` with `p' = (a*x + c*y + e, b*x + d*y + f)`.
const IDENTITY_TRANSFORM: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// The per-region arrays produced by flattening a `Scene`, before packing into one flat buffer
/// (spec §4.1). Kept separate from `PackedScene` so tests can inspect individual regions.
#[derive(Clone, Debug, Default)]
pub struct EncodedScene {
    pub path_tags: Vec<u8>,
    pub path_data: Vec<u32>,
    pub draw_tags: Vec<u32>,
    pub draw_data: Vec<u32>,
    pub transforms: Vec<u32>,
    pub styles: Vec<u32>,
    pub n_paths: u32,
    pub n_draw_objects: u32,
}

/// Flattens every path in `scene` into tag/data streams, in scene order.
pub fn encode_scene(scene: &Scene) -> EncodedScene {
    let mut encoded = EncodedScene::default();
    for path in &scene.paths {
        encode_path(&mut encoded, path);
    }
    encoded
}

fn encode_path(encoded: &mut EncodedScene, path: &crate::scene::PathDef) {
    encoded.path_tags.push(PATH_TAG_TRANSFORM);
    for word in IDENTITY_TRANSFORM.iter() {
        encoded.transforms.push(word.to_bits());
    }

    encoded.path_tags.push(PATH_TAG_STYLE);
    let mut style = StyleFlags::empty();
    if path.fill_rule.is_even_odd() {
        style |= StyleFlags::EVEN_ODD;
    }
    encoded.styles.push(style.bits());

    let mut last_end = None;
    for line in &path.lines {
        let needs_move = match last_end {
            Some(prev_p1) => prev_p1 != line.p0,
            None => true,
        };
        if needs_move {
            push_line_to(encoded, line.p0);
        }
        push_line_to(encoded, line.p1);
        last_end = Some(line.p1);
    }
    encoded.path_tags.push(PATH_TAG_PATH);

    encoded.draw_tags.push(DRAW_TAG_COLOR);
    encoded.draw_data.push(path.color.to_premul_packed());

    encoded.n_paths += 1;
    encoded.n_draw_objects += 1;
}

fn push_line_to(encoded: &mut EncodedScene, p: crate::geometry::Point) {
    encoded.path_tags.push(PATH_TAG_LINE_TO);
    encoded.path_data.push(p.x().to_bits());
    encoded.path_data.push(p.y().to_bits());
}

/// Packs 4 path-tag bytes (little-endian: first byte in the low bits) into one `u32` word, padding
/// with `0` (an unused tag value, safe as a no-op) when `tags` has fewer than 4 elements.
#[inline]
pub fn pack_tag_word(tags: &[u8]) -> u32 {
    let mut padded = [0u8; 4];
    let n = tags.len().min(4);
    padded[..n].copy_from_slice(&tags[..n]);
    LittleEndian::read_u32(&padded)
}

/// Packs a byte stream into `u32` words, 4 bytes per word, padding the final word with zero bytes.
pub fn pack_tag_stream(tags: &[u8]) -> Vec<u32> {
    tags.chunks(4).map(pack_tag_word).collect()
}
