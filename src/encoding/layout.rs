// tile_raster_core/src/encoding/layout.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Packs the encoded per-region arrays into one flat `u32` buffer with
//! named region offsets (spec §3, `PackedScene`/`SceneLayout`).

use crate::encoding::{pack_tag_stream, EncodedScene};
use serde::{Deserialize, Serialize};

/// Base offsets (in `u32` words) of each region within a `PackedScene`'s flat buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct SceneLayout {
    pub path_tag_base: u32,
    pub path_data_base: u32,
    pub draw_tag_base: u32,
    pub draw_data_base: u32,
    pub transform_base: u32,
    pub style_base: u32,
    pub n_draw_objects: u32,
    pub n_paths: u32,
    pub n_clips: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PackedScene {
    pub buffer: Vec<u32>,
    pub layout: SceneLayout,
}

impl PackedScene {
    #[inline]
    pub fn path_tags(&self) -> &[u32] {
        &self.buffer[self.layout.path_tag_base as usize..self.layout.path_data_base as usize]
    }

    #[inline]
    pub fn path_data(&self) -> &[u32] {
        &self.buffer[self.layout.path_data_base as usize..self.layout.draw_tag_base as usize]
    }

    #[inline]
    pub fn draw_tags(&self) -> &[u32] {
        &self.buffer[self.layout.draw_tag_base as usize..self.layout.draw_data_base as usize]
    }

    #[inline]
    pub fn draw_data(&self) -> &[u32] {
        &self.buffer[self.layout.draw_data_base as usize..self.layout.transform_base as usize]
    }
}

/// Packs `encoded` into one flat buffer: `[path_tags_padded][path_data][draw_tags][draw_data]
/// [transforms][styles]`, with the path-tag region padded to a multiple of `reduce_workgroup`
/// words (spec §4.1).
pub fn pack_scene(encoded: &EncodedScene, reduce_workgroup: u32) -> PackedScene {
    let mut path_tag_words = pack_tag_stream(&encoded.path_tags);
    let padded_len = round_up(path_tag_words.len(), reduce_workgroup as usize);
    path_tag_words.resize(padded_len, 0);

    let mut buffer = Vec::with_capacity(
        path_tag_words.len()
            + encoded.path_data.len()
            + encoded.draw_tags.len()
            + encoded.draw_data.len()
            + encoded.transforms.len()
            + encoded.styles.len(),
    );

    let path_tag_base = buffer.len() as u32;
    buffer.extend_from_slice(&path_tag_words);
    let path_data_base = buffer.len() as u32;
    buffer.extend_from_slice(&encoded.path_data);
    let draw_tag_base = buffer.len() as u32;
    buffer.extend_from_slice(&encoded.draw_tags);
    let draw_data_base = buffer.len() as u32;
    buffer.extend_from_slice(&encoded.draw_data);
    let transform_base = buffer.len() as u32;
    buffer.extend_from_slice(&encoded.transforms);
    let style_base = buffer.len() as u32;
    buffer.extend_from_slice(&encoded.styles);

    PackedScene {
        buffer,
        layout: SceneLayout {
            path_tag_base,
            path_data_base,
            draw_tag_base,
            draw_data_base,
            transform_base,
            style_base,
            n_draw_objects: encoded.n_draw_objects,
            n_paths: encoded.n_paths,
            n_clips: 0,
        },
    }
}

#[inline]
fn round_up(value: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return value;
    }
    (value + multiple - 1) / multiple * multiple
}
