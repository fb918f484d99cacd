//! Neighbourhood selection for impulse injection.
//!
//! An impulse at a world position disturbs every cell whose grid coordinate
//! lies within `radius + 0.5` cells of the (wrapped, fractional) impulse point
//! along both axes. An integer-aligned impulse covers a `(2r+1)^2` block; an
//! impulse exactly between two cells covers both of them symmetrically.

use crate::grid::GridTopology;
use crate::sampling::GridFrame;
use glam::DVec2;

/// A cell touched by an impulse, with its offset (in cells) from the impulse point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseCell {
    pub index: usize,
    pub offset: DVec2,
}

/// Cells disturbed by an impulse at `world`. No cell appears twice, even when
/// the block is wider than the grid.
pub fn impulse_cells(
    topology: GridTopology,
    frame: &GridFrame,
    world: DVec2,
    radius: usize,
) -> Vec<ImpulseCell> {
    let center = topology.wrap_point(frame.to_grid(world));
    let extent = radius as f64 + 0.5;
    let (x_lo, x_hi) = axis_span(center.x, extent, topology.len_x());
    let (y_lo, y_hi) = axis_span(center.y, extent, topology.len_y());

    let mut cells = Vec::with_capacity(((x_hi - x_lo + 1) * (y_hi - y_lo + 1)).max(0) as usize);
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            cells.push(ImpulseCell {
                index: topology.index(x, y),
                offset: DVec2::new(x as f64 - center.x, y as f64 - center.y),
            });
        }
    }
    cells
}

/// Inclusive integer range within `extent` of `center`, capped at `len` cells.
fn axis_span(center: f64, extent: f64, len: usize) -> (i64, i64) {
    let lo = (center - extent).ceil() as i64;
    let hi = (center + extent).floor() as i64;
    (lo, hi.min(lo + len as i64 - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn frame() -> GridFrame {
        GridFrame::new(DVec2::ZERO, 1.0)
    }

    fn coords(topo: GridTopology, cells: &[ImpulseCell]) -> HashSet<(usize, usize)> {
        cells.iter().map(|c| topo.coord(c.index)).collect()
    }

    #[test]
    fn integer_point_covers_square_block() {
        let topo = GridTopology::square(32);
        let cells = impulse_cells(topo, &frame(), DVec2::new(10.0, 10.0), 5);
        assert_eq!(cells.len(), 11 * 11);
        let set = coords(topo, &cells);
        assert!(set.contains(&(5, 5)) && set.contains(&(15, 15)));
        assert!(!set.contains(&(4, 10)) && !set.contains(&(16, 10)));
    }

    #[test]
    fn radius_zero_hits_only_the_nearest_cell() {
        let topo = GridTopology::square(8);
        let cells = impulse_cells(topo, &frame(), DVec2::new(3.0, 4.0), 0);
        assert_eq!(cells.len(), 1);
        assert_eq!(topo.coord(cells[0].index), (3, 4));
        assert_eq!(cells[0].offset, DVec2::ZERO);
    }

    #[test]
    fn point_between_two_cells_covers_both_symmetrically() {
        let topo = GridTopology::square(16);
        let cells = impulse_cells(topo, &frame(), DVec2::new(4.5, 8.0), 0);
        let set = coords(topo, &cells);
        assert_eq!(set, HashSet::from([(4, 8), (5, 8)]));
    }

    #[test]
    fn block_wraps_across_edges() {
        let topo = GridTopology::square(8);
        let cells = impulse_cells(topo, &frame(), DVec2::new(0.0, 0.0), 1);
        let set = coords(topo, &cells);
        assert_eq!(set.len(), 9);
        assert!(set.contains(&(7, 7)));
        assert!(set.contains(&(1, 1)));
        assert!(set.contains(&(7, 1)));
    }

    #[test]
    fn location_outside_grid_is_wrapped() {
        let topo = GridTopology::square(8);
        let inside = coords(topo, &impulse_cells(topo, &frame(), DVec2::new(2.0, 3.0), 1));
        let outside = coords(topo, &impulse_cells(topo, &frame(), DVec2::new(-6.0, 19.0), 1));
        assert_eq!(inside, outside);
    }

    #[test]
    fn block_wider_than_grid_has_no_duplicates() {
        let topo = GridTopology::square(4);
        let cells = impulse_cells(topo, &frame(), DVec2::new(1.0, 1.0), 10);
        assert_eq!(cells.len(), 16);
        assert_eq!(coords(topo, &cells).len(), 16);
    }

    #[test]
    fn frame_scales_world_to_cells() {
        let topo = GridTopology::square(16);
        let frame = GridFrame::new(DVec2::new(-8.0, -8.0), 0.5);
        // world (-6, -6) is grid (4, 4)
        let cells = impulse_cells(topo, &frame, DVec2::new(-6.0, -6.0), 0);
        assert_eq!(topo.coord(cells[0].index), (4, 4));
    }
}
