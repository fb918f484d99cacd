#![deny(unsafe_code)]
//! Flow-vector water surface.
//!
//! Every cell carries a horizontal flow vector plus a small random-walk
//! "entropy" generator. Each tick the sum of the neighbours' flow (and the
//! cell's own entropy vector) is folded into the flow, flow decays toward
//! zero, and the rendered height is derived from the local divergence of the
//! neighbouring flow. Height is a projection of the flow field here, not an
//! independently integrated quantity.
//!
//! A tick is four parallel passes, each finishing before the next begins:
//! entropy walk, neighbour influence, apply + decay, height derivation.
//! When `dt * spread_rate` is zero only the entropy walk runs, so flow and
//! height hold still.

use log::{debug, trace};
use rayon::prelude::*;
use serde_json::{json, Value};
use wavefield_core::error::FieldError;
use wavefield_core::field::{cell_locations, Field, GridCell};
use wavefield_core::grid::GridTopology;
use wavefield_core::impulse::impulse_cells;
use wavefield_core::sampling::{sample_world, GridFrame};
use wavefield_core::seeding::zero_sum_vectors;
use wavefield_core::surface::{validate_dt, Simulation, Surface};
use wavefield_core::{DVec2, SurfaceConfig, Xorshift64};

/// Flow magnitude ceiling applied after decay.
pub const MAX_FLOW_SPEED: f64 = 100.0;

/// Per-cell state of the flow simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowCell {
    /// Cumulative horizontal flow.
    pub flow: DVec2,
    pub entropy_angle: f64,
    pub entropy_magnitude: f64,
    rng: Xorshift64,
}

impl FlowCell {
    fn new(flow: DVec2, seed: u64, index: usize, entropy_max: f64) -> Self {
        let mut rng = Xorshift64::for_cell(seed, index);
        let entropy_angle = rng.next_range(0.0, std::f64::consts::TAU);
        let entropy_magnitude = rng.next_range(0.0, 1.0) * entropy_max;
        Self {
            flow,
            entropy_angle,
            entropy_magnitude,
            rng,
        }
    }

    /// The entropy generator's current output vector.
    pub fn entropy(&self) -> DVec2 {
        DVec2::from_angle(self.entropy_angle) * self.entropy_magnitude
    }

    /// One random-walk step of angle and magnitude; magnitude stays in `[0, max]`.
    fn walk_entropy(&mut self, jitter: f64, max: f64) {
        self.entropy_angle = (self.entropy_angle + self.rng.next_range(-jitter, jitter))
            .rem_euclid(std::f64::consts::TAU);
        self.entropy_magnitude =
            (self.entropy_magnitude + self.rng.next_range(-jitter, jitter)).clamp(0.0, max);
    }
}

/// Flow-vector simulation over a toroidal grid.
pub struct FlowField {
    config: SurfaceConfig,
    frame: GridFrame,
    cells: Vec<FlowCell>,
    influence: Vec<DVec2>,
    heights: Field,
    locations: Vec<DVec2>,
    time: f64,
}

impl FlowField {
    /// Creates a field whose initial flow vectors come in zero-sum pairs.
    pub fn new(config: SurfaceConfig, seed: u64) -> Result<Self, FieldError> {
        let config = config.sanitized();
        let mut rng = Xorshift64::new(seed);
        let flows = zero_sum_vectors(
            config.size * config.size,
            config.noise_intensity,
            config.shuffle,
            &mut rng,
        );
        debug!(
            "flow surface: {}x{} cells, step {}, seed {seed}",
            config.size, config.size, config.step
        );
        Self::with_flows(config, flows, seed)
    }

    /// Creates a field from a JSON params object, falling back to defaults.
    pub fn from_json(seed: u64, params: &Value) -> Result<Self, FieldError> {
        Self::new(SurfaceConfig::from_json(params), seed)
    }

    /// Creates a field with explicit row-major starting flows.
    ///
    /// `seed` still drives the per-cell entropy generators. Returns
    /// `FieldError::NonFiniteValue` if any flow component is NaN or infinite.
    pub fn with_flows(
        config: SurfaceConfig,
        flows: Vec<DVec2>,
        seed: u64,
    ) -> Result<Self, FieldError> {
        if let Some(index) = flows.iter().position(|f| !f.is_finite()) {
            return Err(FieldError::NonFiniteValue { index });
        }
        let config = config.sanitized();
        let mut heights = Field::new(config.size, config.size)?;
        if flows.len() != heights.data().len() {
            return Err(FieldError::DimensionMismatch {
                lhs_w: config.size,
                lhs_h: config.size,
                rhs_w: flows.len(),
                rhs_h: 1,
            });
        }
        let cells: Vec<FlowCell> = flows
            .into_iter()
            .enumerate()
            .map(|(i, flow)| FlowCell::new(flow, seed, i, config.entropy_max))
            .collect();
        let topo = heights.topology();
        derive_heights(&cells, topo, config.flow_height_coefficient, heights.data_mut());

        let frame = GridFrame::new(config.origin(), config.step);
        let locations = cell_locations(topo, frame.origin, frame.step);
        let influence = vec![DVec2::ZERO; cells.len()];
        Ok(Self {
            config,
            frame,
            cells,
            influence,
            heights,
            locations,
            time: 0.0,
        })
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Per-cell flow state in row-major order.
    pub fn cells(&self) -> &[FlowCell] {
        &self.cells
    }

    /// Flow vector at `(x, y)`, wrapped toroidally.
    pub fn flow_at(&self, x: i64, y: i64) -> DVec2 {
        self.cells[self.heights.topology().index(x, y)].flow
    }

    /// The cell at `(x, y)` with its derived height.
    pub fn cell(&self, x: i64, y: i64) -> GridCell {
        let topo = self.heights.topology();
        let index = topo.index(x, y);
        GridCell {
            coordinate: topo.coord(index),
            location: self.locations[index],
            height: self.heights.data()[index],
        }
    }

    /// Sum of every cell's flow.
    pub fn net_flow(&self) -> DVec2 {
        self.cells.iter().map(|c| c.flow).sum()
    }

    fn rederive_heights(&mut self) {
        let topo = self.heights.topology();
        derive_heights(
            &self.cells,
            topo,
            self.config.flow_height_coefficient,
            self.heights.data_mut(),
        );
    }
}

impl Surface for FlowField {
    fn elevation(&self, x: f64, z: f64) -> f64 {
        sample_world(
            &self.heights,
            &self.frame,
            DVec2::new(x, z),
            self.config.height_scale,
        )
    }
}

impl Simulation for FlowField {
    fn step(&mut self, dt: f64) -> Result<(), FieldError> {
        validate_dt(dt)?;
        let rate = dt * self.config.spread_rate;
        let noise = self.config.noise_intensity;
        let decay = self.config.decay_rate * dt;
        let jitter = self.config.entropy_jitter;
        let entropy_max = self.config.entropy_max;
        let topo = self.heights.topology();

        // Pass 1: each cell walks its own entropy generator.
        self.cells
            .par_iter_mut()
            .for_each(|c| c.walk_entropy(jitter, entropy_max));

        // A zero spread rate freezes flow and height; decay included.
        if rate > 0.0 {
            // Pass 2: neighbour influence from settled flow.
            let cells = &self.cells;
            self.influence
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, inf)| *inf = flow_influence(cells, topo, i, rate, noise));

            // Pass 3: apply influence, then decay toward zero.
            self.cells
                .par_iter_mut()
                .zip(self.influence.par_iter())
                .for_each(|(c, &inf)| c.flow = decay_flow(c.flow + inf, decay));

            // Pass 4: heights from the settled flow.
            self.rederive_heights();
        }

        self.time += dt;
        trace!("flow step dt={dt} t={}", self.time);
        Ok(())
    }

    fn heights(&self) -> &Field {
        &self.heights
    }

    fn write_vertices(&self, out: &mut [f64]) -> Result<(), FieldError> {
        self.heights.copy_scaled_into(self.config.height_scale, out)
    }

    /// Pushes `magnitude` of outward radial flow into every cell of the
    /// impulse block. The cell exactly under the impulse point gets none.
    fn apply_impulse(&mut self, x: f64, z: f64, magnitude: f64) {
        let cells = impulse_cells(
            self.heights.topology(),
            &self.frame,
            DVec2::new(x, z),
            self.config.impulse_radius,
        );
        for cell in &cells {
            self.cells[cell.index].flow += cell.offset.normalize_or_zero() * magnitude;
        }
        self.rederive_heights();
        debug!("impulse at ({x}, {z}) pushed flow into {} cells", cells.len());
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
                "max_flow_speed".into(),
                json!({
                    "type": "number",
                    "default": MAX_FLOW_SPEED,
                    "fixed": true,
                    "description": "Flow magnitude ceiling applied after decay"
                }),
            );
        }
        schema
    }
}

/// `(sum of neighbour flow + own entropy * noise) * rate`.
fn flow_influence(
    cells: &[FlowCell],
    topo: GridTopology,
    index: usize,
    rate: f64,
    noise: f64,
) -> DVec2 {
    let neighbour_flow: DVec2 = topo.neighbors(index).iter().map(|&n| cells[n].flow).sum();
    (neighbour_flow + cells[index].entropy() * noise) * rate
}

/// Shrinks `flow` by `amount` without changing its direction, flooring at
/// zero, then caps it at [`MAX_FLOW_SPEED`].
fn decay_flow(flow: DVec2, amount: f64) -> DVec2 {
    let len = flow.length();
    if len == 0.0 || (amount == 0.0 && len <= MAX_FLOW_SPEED) {
        return flow;
    }
    let new_len = (len - amount).max(0.0).min(MAX_FLOW_SPEED);
    flow * (new_len / len)
}

/// Writes `coefficient * (left.x - right.x + bottom.y - top.y)` for every cell.
fn derive_heights(cells: &[FlowCell], topo: GridTopology, coefficient: f64, out: &mut [f64]) {
    out.par_iter_mut().enumerate().for_each(|(i, h)| {
        let [left, right, bottom, top] = topo.neighbors(i);
        let divergence =
            cells[left].flow.x - cells[right].flow.x + cells[bottom].flow.y - cells[top].flow.y;
        *h = coefficient * divergence;
    });
}
