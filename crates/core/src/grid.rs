//! Toroidal grid topology.
//!
//! Every coordinate is wrapped into `[0, len_x) x [0, len_y)` before it is
//! turned into a linear row-major index, so opposite edges of the grid are
//! adjacent and there is no boundary condition to special-case.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Wraps a possibly out-of-range `(x, y)` pair into a linear row-major index.
///
/// Returns `((y mod len_y) * len_x) + (x mod len_x)` where `mod` always yields
/// a non-negative result, so negative coordinates wrap from the far edge.
///
/// # Panics
///
/// Panics if either length is zero.
pub fn wrap_index(x: i64, y: i64, len_x: usize, len_y: usize) -> usize {
    let xi = x.rem_euclid(len_x as i64) as usize;
    let yi = y.rem_euclid(len_y as i64) as usize;
    yi * len_x + xi
}

/// Dimensions of a toroidal grid plus the neighbour lookups derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTopology {
    len_x: usize,
    len_y: usize,
}

impl GridTopology {
    /// Creates a topology of `len_x` by `len_y` cells.
    ///
    /// Callers validate dimensions before constructing; see [`crate::Field::new`].
    pub fn new(len_x: usize, len_y: usize) -> Self {
        debug_assert!(len_x > 0 && len_y > 0, "grid dimensions must be non-zero");
        Self { len_x, len_y }
    }

    /// Square topology with `size` cells per side.
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn len_x(&self) -> usize {
        self.len_x
    }

    pub fn len_y(&self) -> usize {
        self.len_y
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.len_x * self.len_y
    }

    /// Linear index of `(x, y)` with toroidal wrapping.
    pub fn index(&self, x: i64, y: i64) -> usize {
        wrap_index(x, y, self.len_x, self.len_y)
    }

    /// Inverse of [`GridTopology::index`] for an in-range index.
    pub fn coord(&self, index: usize) -> (usize, usize) {
        debug_assert!(index < self.cell_count(), "index {index} out of range");
        (index % self.len_x, index / self.len_x)
    }

    /// 4-connected neighbours of `index` as `[left, right, bottom, top]`.
    ///
    /// "Bottom" is `y - 1` and "top" is `y + 1`.
    pub fn neighbors(&self, index: usize) -> [usize; 4] {
        let (x, y) = self.coord(index);
        let (x, y) = (x as i64, y as i64);
        [
            self.index(x - 1, y),
            self.index(x + 1, y),
            self.index(x, y - 1),
            self.index(x, y + 1),
        ]
    }

    /// Wraps a fractional grid-space position into `[0, len_x) x [0, len_y)`.
    pub fn wrap_point(&self, p: DVec2) -> DVec2 {
        let w = p.x.rem_euclid(self.len_x as f64);
        let h = p.y.rem_euclid(self.len_y as f64);
        // rem_euclid can round up to exactly the modulus for tiny negative inputs
        DVec2::new(
            if w >= self.len_x as f64 { 0.0 } else { w },
            if h >= self.len_y as f64 { 0.0 } else { h },
        )
    }
}
