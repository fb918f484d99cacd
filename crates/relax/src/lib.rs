#![deny(unsafe_code)]
//! Thresholded height-relaxation water surface.
//!
//! Each cell compares its height with the average of its four wrapped
//! neighbours. A cell more than [`RELAX_THRESHOLD`] below the average is
//! nudged up by `dt * spread_rate`; one more than the threshold above is
//! nudged down by the same amount; anything in between is left alone. The
//! relaxation converges more slowly than true diffusion but never overshoots
//! on small perturbations.
//!
//! A tick runs as two parallel passes with a barrier between them: every
//! influence is computed from the settled heights first, then all influences
//! are applied. Fusing the passes would let cells late in iteration order see
//! already-updated neighbours.

use log::{debug, trace};
use rayon::prelude::*;
use serde_json::{json, Value};
use wavefield_core::error::FieldError;
use wavefield_core::field::{Field, GridCell};
use wavefield_core::grid::GridTopology;
use wavefield_core::impulse::impulse_cells;
use wavefield_core::sampling::{sample_world, GridFrame};
use wavefield_core::seeding::zero_sum_heights;
use wavefield_core::surface::{validate_dt, Simulation, Surface};
use wavefield_core::{DVec2, SurfaceConfig, Xorshift64};

/// Height difference from the neighbour average that triggers relaxation.
pub const RELAX_THRESHOLD: f64 = 1.0;

/// Height-relaxation simulation over a toroidal grid.
pub struct HeightRelaxation {
    config: SurfaceConfig,
    frame: GridFrame,
    heights: Field,
    locations: Vec<DVec2>,
    influence: Vec<f64>,
    time: f64,
}

impl HeightRelaxation {
    /// Creates a surface seeded with zero-sum random heights.
    ///
    /// `config` is sanitized first, so out-of-range values are clamped.
    pub fn new(config: SurfaceConfig, seed: u64) -> Result<Self, FieldError> {
        let config = config.sanitized();
        let mut rng = Xorshift64::new(seed);
        let heights = zero_sum_heights(
            config.size * config.size,
            config.noise_intensity,
            config.shuffle,
            &mut rng,
        );
        debug!(
            "relax surface: {}x{} cells, step {}, seed {seed}",
            config.size, config.size, config.step
        );
        Self::with_heights(config, heights)
    }

    /// Creates a surface from a JSON params object, falling back to defaults.
    pub fn from_json(seed: u64, params: &Value) -> Result<Self, FieldError> {
        Self::new(SurfaceConfig::from_json(params), seed)
    }

    /// Creates a surface with explicit row-major starting heights.
    ///
    /// Returns `FieldError::DimensionMismatch` unless `heights.len()` is
    /// `size * size`, and `FieldError::NonFiniteValue` for a NaN or infinite
    /// height.
    pub fn with_heights(config: SurfaceConfig, heights: Vec<f64>) -> Result<Self, FieldError> {
        if let Some(index) = heights.iter().position(|h| !h.is_finite()) {
            return Err(FieldError::NonFiniteValue { index });
        }
        let config = config.sanitized();
        let heights = Field::from_data(config.size, config.size, heights)?;
        let frame = GridFrame::new(config.origin(), config.step);
        let locations =
            wavefield_core::field::cell_locations(heights.topology(), frame.origin, frame.step);
        let influence = vec![0.0; heights.data().len()];
        Ok(Self {
            config,
            frame,
            heights,
            locations,
            influence,
            time: 0.0,
        })
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// The cell at `(x, y)`, wrapped toroidally.
    pub fn cell(&self, x: i64, y: i64) -> GridCell {
        let topo = self.heights.topology();
        let index = topo.index(x, y);
        GridCell {
            coordinate: topo.coord(index),
            location: self.locations[index],
            height: self.heights.data()[index],
        }
    }
}

impl Surface for HeightRelaxation {
    fn elevation(&self, x: f64, z: f64) -> f64 {
        sample_world(
            &self.heights,
            &self.frame,
            DVec2::new(x, z),
            self.config.height_scale,
        )
    }
}

impl Simulation for HeightRelaxation {
    fn step(&mut self, dt: f64) -> Result<(), FieldError> {
        validate_dt(dt)?;
        let rate = dt * self.config.spread_rate;
        let topo = self.heights.topology();

        // Pass 1: read-only over settled heights.
        let data = self.heights.data();
        self.influence
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, inf)| *inf = relax_influence(data, topo, i, rate));

        // Pass 2: apply.
        self.heights
            .data_mut()
            .par_iter_mut()
            .zip(self.influence.par_iter())
            .for_each(|(h, &inf)| *h += inf);

        self.time += dt;
        trace!("relax step dt={dt} t={}", self.time);
        Ok(())
    }

    fn heights(&self) -> &Field {
        &self.heights
    }

    fn write_vertices(&self, out: &mut [f64]) -> Result<(), FieldError> {
        self.heights.copy_scaled_into(self.config.height_scale, out)
    }

    /// Sets every cell in the impulse block to `magnitude`.
    fn apply_impulse(&mut self, x: f64, z: f64, magnitude: f64) {
        let cells = impulse_cells(
            self.heights.topology(),
            &self.frame,
            DVec2::new(x, z),
            self.config.impulse_radius,
        );
        let data = self.heights.data_mut();
        for cell in &cells {
            data[cell.index] = magnitude;
        }
        debug!("impulse at ({x}, {z}) set {} cells to {magnitude}", cells.len());
    }

    fn elapsed(&self) -> f64 {
        self.time
    }

    fn params(&self) -> Value {
        self.config.to_json()
    }

    fn param_schema(&self) -> Value {
        let mut schema = SurfaceConfig::schema();
        if let Some(obj) = schema.as_object_mut() {
            obj.insert(
                "relax_threshold".into(),
                json!({
                    "type": "number",
                    "default": RELAX_THRESHOLD,
                    "fixed": true,
                    "description": "Height difference from the neighbour average that triggers relaxation"
                }),
            );
        }
        schema
    }
}

/// Influence recorded for cell `index`: `+rate` if it sits more than
/// [`RELAX_THRESHOLD`] below its neighbour average, `-rate` if more than the
/// threshold above, zero otherwise.
fn relax_influence(data: &[f64], topo: GridTopology, index: usize, rate: f64) -> f64 {
    let [left, right, bottom, top] = topo.neighbors(index);
    let average = (data[left] + data[right] + data[bottom] + data[top]) / 4.0;
    let h = data[index];
    if h < average - RELAX_THRESHOLD {
        rate
    } else if h > average + RELAX_THRESHOLD {
        -rate
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: usize) -> SurfaceConfig {
        SurfaceConfig {
            size,
            ..SurfaceConfig::default()
        }
    }

    /// 4x4 grid, step 1, all zero except (2, 2) = 10.
    fn spike() -> HeightRelaxation {
        let mut heights = vec![0.0; 16];
        heights[2 * 4 + 2] = 10.0;
        let cfg = SurfaceConfig {
            size: 4,
            step: 1.0,
            spread_rate: 1.0,
            impulse_radius: 0,
            ..SurfaceConfig::default()
        };
        HeightRelaxation::with_heights(cfg, heights).unwrap()
    }

    // ---- Construction ----

    #[test]
    fn new_creates_square_grid() {
        let sim = HeightRelaxation::new(config(16), 42).unwrap();
        assert_eq!(sim.heights().width(), 16);
        assert_eq!(sim.heights().height(), 16);
    }

    #[test]
    fn new_clamps_tiny_grid() {
        let sim = HeightRelaxation::new(config(0), 42).unwrap();
        assert_eq!(sim.heights().width(), 2);
    }

    #[test]
    fn initial_heights_sum_to_zero() {
        let sim = HeightRelaxation::new(config(32), 7).unwrap();
        assert!(sim.heights().sum().abs() < 1e-9, "sum {}", sim.heights().sum());
    }

    #[test]
    fn initial_heights_are_not_flat() {
        let sim = HeightRelaxation::new(config(16), 7).unwrap();
        let (lo, hi) = sim.heights().min_max();
        assert!(lo < 0.0 && hi > 0.0);
    }

    #[test]
    fn with_heights_rejects_wrong_length() {
        let result = HeightRelaxation::with_heights(config(4), vec![0.0; 15]);
        assert!(matches!(result, Err(FieldError::DimensionMismatch { .. })));
    }

    #[test]
    fn with_heights_rejects_nan_and_infinity() {
        let mut heights = vec![0.0; 16];
        heights[9] = f64::NAN;
        let result = HeightRelaxation::with_heights(config(4), heights.clone());
        assert!(matches!(result, Err(FieldError::NonFiniteValue { index: 9 })));
        heights[9] = 0.0;
        heights[3] = f64::NEG_INFINITY;
        let result = HeightRelaxation::with_heights(config(4), heights);
        assert!(matches!(result, Err(FieldError::NonFiniteValue { index: 3 })));
    }

    #[test]
    fn from_json_reads_params() {
        let sim = HeightRelaxation::from_json(1, &json!({"size": 8, "spread_rate": 0.25})).unwrap();
        assert_eq!(sim.config().size, 8);
        assert_eq!(sim.params()["spread_rate"], 0.25);
    }

    #[test]
    fn cell_reports_precomputed_location() {
        let cfg = SurfaceConfig {
            size: 4,
            step: 2.0,
            origin_x: -4.0,
            origin_z: 1.0,
            ..SurfaceConfig::default()
        };
        let sim = HeightRelaxation::new(cfg, 3).unwrap();
        let cell = sim.cell(1, 2);
        assert_eq!(cell.coordinate, (1, 2));
        assert_eq!(cell.location, DVec2::new(-2.0, 5.0));
        assert_eq!(sim.cell(5, -2), cell);
    }

    // ---- Step ----

    #[test]
    fn spike_relaxes_into_neighbours() {
        let mut sim = spike();
        sim.step(1.0).unwrap();
        let h = sim.heights();
        // centre: neighbour average 0, 10 > 0 + 1 -> -1
        assert_eq!(h.get(2, 2), 9.0);
        // each neighbour: average 2.5, 0 < 2.5 - 1 -> +1
        assert_eq!(h.get(1, 2), 1.0);
        assert_eq!(h.get(3, 2), 1.0);
        assert_eq!(h.get(2, 1), 1.0);
        assert_eq!(h.get(2, 3), 1.0);
        // every other cell untouched
        let touched = [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)];
        for (x, y, v) in h.iter() {
            if !touched.contains(&(x, y)) {
                assert_eq!(v, 0.0, "cell ({x}, {y}) changed to {v}");
            }
        }
    }

    #[test]
    fn zero_spread_rate_changes_nothing() {
        let cfg = SurfaceConfig {
            spread_rate: 0.0,
            ..config(16)
        };
        let mut sim = HeightRelaxation::new(cfg, 42).unwrap();
        let before = sim.heights().data().to_vec();
        sim.step(1.0).unwrap();
        assert_eq!(sim.heights().data(), &before[..]);
    }

    #[test]
    fn small_perturbation_is_below_threshold() {
        let mut heights = vec![0.0; 16];
        heights[5] = 0.9;
        let mut sim = HeightRelaxation::with_heights(config(4), heights.clone()).unwrap();
        sim.step(1.0).unwrap();
        assert_eq!(sim.heights().data(), &heights[..]);
    }

    #[test]
    fn relaxation_wraps_across_edges() {
        let mut heights = vec![0.0; 16];
        heights[0] = 10.0; // (0, 0)
        let mut sim = HeightRelaxation::with_heights(config(4), heights).unwrap();
        sim.step(0.5).unwrap();
        let h = sim.heights();
        // spread 1, dt 0.5 -> rate 0.5
        assert_eq!(h.get(0, 0), 9.5);
        assert_eq!(h.get(3, 0), 0.5);
        assert_eq!(h.get(0, 3), 0.5);
    }

    #[test]
    fn step_advances_time() {
        let mut sim = spike();
        sim.step(0.25).unwrap();
        sim.step(0.25).unwrap();
        assert_eq!(sim.elapsed(), 0.5);
    }

    #[test]
    fn step_rejects_negative_dt_without_mutating() {
        let mut sim = spike();
        let before = sim.heights().data().to_vec();
        assert!(matches!(sim.step(-1.0), Err(FieldError::InvalidTimeStep(_))));
        assert_eq!(sim.heights().data(), &before[..]);
        assert_eq!(sim.elapsed(), 0.0);
    }

    #[test]
    fn same_seed_identical_after_steps() {
        let mut a = HeightRelaxation::new(config(24), 99).unwrap();
        let mut b = HeightRelaxation::new(config(24), 99).unwrap();
        for _ in 0..20 {
            a.step(0.1).unwrap();
            b.step(0.1).unwrap();
        }
        assert!(a
            .heights()
            .data()
            .iter()
            .zip(b.heights().data())
            .all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    // ---- Query ----

    #[test]
    fn elevation_at_grid_point_is_scaled_cell_height() {
        let cfg = SurfaceConfig {
            height_scale: 2.0,
            step: 0.5,
            origin_x: 1.0,
            origin_z: -1.0,
            ..config(8)
        };
        let sim = HeightRelaxation::new(cfg, 11).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                let cell = sim.cell(x, y);
                let e = sim.elevation(cell.location.x, cell.location.y);
                assert_eq!(e, cell.height * 2.0, "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn elevation_at_grid_point_exact_with_fractional_step() {
        let cfg = SurfaceConfig {
            step: 0.1,
            origin_x: 0.3,
            origin_z: -0.7,
            ..config(16)
        };
        let sim = HeightRelaxation::new(cfg, 42).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                let cell = sim.cell(x, y);
                let e = sim.elevation(cell.location.x, cell.location.y);
                assert_eq!(e, cell.height, "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn elevation_between_cells_interpolates() {
        let sim = spike();
        // halfway between (1, 2) = 0 and (2, 2) = 10
        assert!((sim.elevation(1.5, 2.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn elevation_is_idempotent() {
        let sim = HeightRelaxation::new(config(16), 5).unwrap();
        let a = sim.elevation(3.3, 7.7);
        let b = sim.elevation(3.3, 7.7);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn write_vertices_matches_scaled_heights() {
        let cfg = SurfaceConfig {
            height_scale: 0.5,
            ..config(4)
        };
        let sim = HeightRelaxation::new(cfg, 2).unwrap();
        let mut buf = vec![0.0; 16];
        sim.write_vertices(&mut buf).unwrap();
        for (v, h) in buf.iter().zip(sim.heights().data()) {
            assert_eq!(*v, h * 0.5);
        }
        let mut short = vec![0.0; 3];
        assert!(sim.write_vertices(&mut short).is_err());
    }

    // ---- Impulse ----

    #[test]
    fn impulse_sets_eleven_by_eleven_block() {
        let cfg = SurfaceConfig {
            noise_intensity: 0.0,
            ..config(32)
        };
        let mut sim = HeightRelaxation::new(cfg, 1).unwrap();
        sim.apply_impulse(16.0, 16.0, 4.0);
        let raised = sim.heights().data().iter().filter(|&&h| h == 4.0).count();
        assert_eq!(raised, 121);
        assert_eq!(sim.heights().get(11, 11), 4.0);
        assert_eq!(sim.heights().get(21, 21), 4.0);
        assert_eq!(sim.heights().get(10, 16), 0.0);
        assert_eq!(sim.heights().get(22, 16), 0.0);
    }

    #[test]
    fn impulse_between_two_cells_touches_both_and_nothing_else() {
        let mut sim = spike();
        sim.heights.data_mut().fill(0.0);
        sim.apply_impulse(1.5, 2.0, 3.0);
        for (x, y, v) in sim.heights().iter() {
            if (x, y) == (1, 2) || (x, y) == (2, 2) {
                assert_eq!(v, 3.0);
            } else {
                assert_eq!(v, 0.0, "cell ({x}, {y}) perturbed");
            }
        }
    }

    #[test]
    fn impulse_then_step_spreads_disturbance() {
        let cfg = SurfaceConfig {
            noise_intensity: 0.0,
            impulse_radius: 1,
            ..config(16)
        };
        let mut sim = HeightRelaxation::new(cfg, 1).unwrap();
        sim.apply_impulse(8.0, 8.0, 10.0);
        sim.step(1.0).unwrap();
        // the ring just outside the 3x3 block rises
        assert!(sim.heights().get(10, 8) > 0.0);
        assert!(sim.heights().get(8, 8) <= 10.0);
    }

    // ---- Trait plumbing ----

    #[test]
    fn simulation_is_object_safe() {
        let sim = HeightRelaxation::new(config(8), 1).unwrap();
        let boxed: Box<dyn Simulation> = Box::new(sim);
        assert_eq!(boxed.heights().width(), 8);
    }

    #[test]
    fn param_schema_has_every_param() {
        let sim = HeightRelaxation::new(config(8), 1).unwrap();
        let schema = sim.param_schema();
        for key in sim.params().as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
        }
        assert!(schema.get("relax_threshold").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn zero_sum_for_any_seed(size in 2_usize..=32, seed: u64) {
                let sim = HeightRelaxation::new(config(size), seed).unwrap();
                prop_assert!(sim.heights().sum().abs() < 1e-9);
            }

            #[test]
            fn no_nans_after_steps(size in 2_usize..=24, seed: u64, dt in 0.0_f64..2.0) {
                let mut sim = HeightRelaxation::new(config(size), seed).unwrap();
                for _ in 0..10 {
                    sim.step(dt).unwrap();
                }
                prop_assert!(sim.heights().data().iter().all(|h| h.is_finite()));
            }

            #[test]
            fn query_is_idempotent(x in -100.0_f64..100.0, z in -100.0_f64..100.0) {
                let sim = HeightRelaxation::new(config(8), 3).unwrap();
                prop_assert_eq!(sim.elevation(x, z).to_bits(), sim.elevation(x, z).to_bits());
            }

            #[test]
            fn per_cell_change_bounded_by_rate(seed: u64, dt in 0.0_f64..1.0) {
                let mut sim = HeightRelaxation::new(config(12), seed).unwrap();
                let before = sim.heights().data().to_vec();
                sim.step(dt).unwrap();
                let rate = dt * sim.config().spread_rate;
                for (a, b) in before.iter().zip(sim.heights().data()) {
                    prop_assert!((a - b).abs() <= rate + 1e-12);
                }
            }
        }
    }
}
