//! Off-grid height queries over a [`Field`].
//!
//! World positions are mapped into fractional grid coordinates through a
//! [`GridFrame`], then the four surrounding cells (wrapped toroidally) are
//! blended bilinearly.

use crate::field::Field;
use glam::DVec2;

/// Relative distance from an integer below which a grid coordinate is
/// treated as lying on it.
pub const SNAP_EPSILON: f64 = 1e-9;

fn snap(g: f64) -> f64 {
    let r = g.round();
    if (g - r).abs() <= SNAP_EPSILON * r.abs().max(1.0) {
        r
    } else {
        g
    }
}

/// Placement of a grid in world space: the position of cell (0, 0) and the
/// spacing between neighbouring cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    pub origin: DVec2,
    pub step: f64,
}

impl GridFrame {
    pub fn new(origin: DVec2, step: f64) -> Self {
        debug_assert!(step > 0.0, "grid step must be positive");
        Self { origin, step }
    }

    /// Fractional grid coordinates of a world-space point.
    ///
    /// Coordinates within a relative [`SNAP_EPSILON`] of an integer are
    /// snapped onto it, so a cell's own world location maps back onto that
    /// cell even when `step` is not exactly representable.
    pub fn to_grid(&self, world: DVec2) -> DVec2 {
        let g = (world - self.origin) / self.step;
        DVec2::new(snap(g.x), snap(g.y))
    }

    /// World-space position of fractional grid coordinates.
    pub fn to_world(&self, grid: DVec2) -> DVec2 {
        self.origin + grid * self.step
    }
}

/// Bilinearly interpolates `field` at fractional grid coordinates `(gx, gy)`.
///
/// Each of the four surrounding cells is weighted by `1 - distance` along each
/// axis and the weights are normalized to sum to one. At integer coordinates
/// this returns the cell value exactly.
pub fn bilinear(field: &Field, gx: f64, gy: f64) -> f64 {
    let x0 = gx.floor();
    let y0 = gy.floor();
    let fx = gx - x0;
    let fy = gy - y0;
    let (xi, yi) = (x0 as i64, y0 as i64);

    let corners = [
        ((1.0 - fx) * (1.0 - fy), field.get(xi, yi)),
        (fx * (1.0 - fy), field.get(xi + 1, yi)),
        ((1.0 - fx) * fy, field.get(xi, yi + 1)),
        (fx * fy, field.get(xi + 1, yi + 1)),
    ];
    let total: f64 = corners.iter().map(|(w, _)| w).sum();
    corners.iter().map(|(w, h)| w * h).sum::<f64>() / total
}

/// Height of `field` at a world-space point, scaled by `height_scale`.
pub fn sample_world(field: &Field, frame: &GridFrame, world: DVec2, height_scale: f64) -> f64 {
    let g = frame.to_grid(world);
    bilinear(field, g.x, g.y) * height_scale
}
