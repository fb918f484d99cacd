//! Two-dimensional signed height field with toroidal wrapping.
//!
//! A `Field` stores `width * height` f64 heights in row-major (y-major)
//! layout. Unlike a normalized image buffer, heights are signed and never
//! clamped: the seeded surface starts with as much negative as positive
//! displacement. Coordinate access wraps toroidally, so negative and
//! overflowing indices are valid.

use crate::error::FieldError;
use crate::grid::GridTopology;
use glam::DVec2;

/// A 2D signed scalar field with toroidal coordinate wrapping.
#[derive(Debug, Clone)]
pub struct Field {
    topology: GridTopology,
    data: Vec<f64>,
}

impl Field {
    /// Creates a zero-filled field of the given dimensions.
    ///
    /// Returns `FieldError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            topology: GridTopology::new(width, height),
            data: vec![0.0; len],
        })
    }

    /// Creates a field from a pre-built data vector, validating that
    /// `data.len() == width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, FieldError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(FieldError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            topology: GridTopology::new(width, height),
            data,
        })
    }

    /// Field width in cells.
    pub fn width(&self) -> usize {
        self.topology.len_x()
    }

    /// Field height in cells.
    pub fn height(&self) -> usize {
        self.topology.len_y()
    }

    pub fn topology(&self) -> GridTopology {
        self.topology
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Gets the value at `(x, y)` with toroidal wrapping.
    pub fn get(&self, x: i64, y: i64) -> f64 {
        self.data[self.topology.index(x, y)]
    }

    /// Sets the value at `(x, y)` with toroidal wrapping.
    pub fn set(&mut self, x: i64, y: i64, value: f64) {
        let idx = self.topology.index(x, y);
        self.data[idx] = value;
    }

    /// Sum of all values.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Smallest and largest value in the field.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Copies `scale * value` for every cell into `out` in row-major order.
    ///
    /// Returns `FieldError::DimensionMismatch` if `out` has the wrong length.
    pub fn copy_scaled_into(&self, scale: f64, out: &mut [f64]) -> Result<(), FieldError> {
        if out.len() != self.data.len() {
            return Err(FieldError::DimensionMismatch {
                lhs_w: self.width(),
                lhs_h: self.height(),
                rhs_w: out.len(),
                rhs_h: 1,
            });
        }
        out.iter_mut()
            .zip(self.data.iter())
            .for_each(|(o, &h)| *o = h * scale);
        Ok(())
    }

    /// Iterates over all cells yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let w = self.width();
        self.data.iter().enumerate().map(move |(i, &v)| {
            let x = i % w;
            let y = i / w;
            (x, y, v)
        })
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, FieldError> {
    if width == 0 || height == 0 {
        return Err(FieldError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(FieldError::InvalidDimensions)
}

/// One sample point of the simulated surface.
///
/// `coordinate` and `location` are fixed at construction; only `height`
/// changes as the simulation runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub coordinate: (usize, usize),
    /// Planar world position (x, z), precomputed from `origin + coordinate * step`.
    pub location: DVec2,
    pub height: f64,
}

/// Builds the world-space location of every cell once, in row-major order.
pub fn cell_locations(topology: GridTopology, origin: DVec2, step: f64) -> Vec<DVec2> {
    (0..topology.cell_count())
        .map(|i| {
            let (x, y) = topology.coord(i);
            origin + DVec2::new(x as f64, y as f64) * step
        })
        .collect()
}
