// tile_raster_core/src/concurrent/executor.rs
//
// Copyright © 2024 The Tile Raster Core Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An abstraction over threading and parallelism systems such as Rayon.

/// An abstraction over threading and parallelism systems such as Rayon.
pub trait Executor {
    /// Maps `0..length` to per-index output vectors and concatenates them in index order.
    fn flatten_into_vector<T, F>(&self, length: usize, builder: F) -> Vec<T>
                                 where T: Send, F: Fn(usize) -> Vec<T> + Send + Sync;

    /// Maps `0..length` to one output value per index, preserving index order. Every executor so
    /// far derives this the same way from `flatten_into_vector`, so it isn't part of the per-impl
    /// contract.
    fn build_vector<T, F>(&self, length: usize, builder: F) -> Vec<T>
                          where T: Send, F: Fn(usize) -> T + Send + Sync {
        self.flatten_into_vector(length, |index| vec![builder(index)])
    }
}

pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn flatten_into_vector<T, F>(&self, length: usize, builder: F) -> Vec<T>
                                 where T: Send, F: Fn(usize) -> Vec<T> + Send + Sync {
        (0..length).into_iter().fold(vec![], |mut vec0, index| {
            let item0 = builder(index);
            vec0.extend(item0.into_iter());
            vec0
        })
    }
}
