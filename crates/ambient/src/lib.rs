#![deny(unsafe_code)]
//! Ambient water surface: drifting simplex noise, optionally composited with
//! expanding [`WaveForce`] rings.
//!
//! There is no per-cell simulation state. Every tick the grid is resampled
//! from the continuous height function at the new time, and point queries
//! evaluate the same function directly, so a query at a grid point always
//! matches the mesh.

use log::{debug, trace};
use rayon::prelude::*;
use serde_json::{json, Value};
use wavefield_core::error::FieldError;
use wavefield_core::field::{cell_locations, Field, GridCell};
use wavefield_core::surface::{validate_dt, Simulation, Surface};
use wavefield_core::{AmbientWaveField, DVec2, SurfaceConfig, WaveForce, WaveForces};

/// Strength lost per unit time by a ring started through `apply_impulse`.
pub const DEFAULT_FALL_OFF: f64 = 2.0;

/// Which layers contribute to the surface height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientMode {
    /// Noise only; impulses are ignored.
    Noise,
    /// Noise plus active wave forces.
    Composite,
}

pub struct AmbientSurface {
    config: SurfaceConfig,
    mode: AmbientMode,
    waves: AmbientWaveField,
    forces: WaveForces,
    heights: Field,
    locations: Vec<DVec2>,
    time: f64,
}

impl AmbientSurface {
    pub fn new(config: SurfaceConfig, seed: u64, mode: AmbientMode) -> Result<Self, FieldError> {
        let config = config.sanitized();
        let heights = Field::new(config.size, config.size)?;
        let locations = cell_locations(heights.topology(), config.origin(), config.step);
        let waves = AmbientWaveField::new(
            config.ambient_speed(),
            config.ambient_spread,
            config.ambient_amplitude,
            fold_seed(seed),
        );
        debug!(
            "ambient surface ({mode:?}): {}x{} cells, step {}, seed {seed}",
            config.size, config.size, config.step
        );
        let mut surface = Self {
            config,
            mode,
            waves,
            forces: WaveForces::new(),
            heights,
            locations,
            time: 0.0,
        };
        surface.resample()?;
        Ok(surface)
    }

    /// Noise-only surface.
    pub fn noise(config: SurfaceConfig, seed: u64) -> Result<Self, FieldError> {
        Self::new(config, seed, AmbientMode::Noise)
    }

    /// Noise plus wave forces.
    pub fn composite(config: SurfaceConfig, seed: u64) -> Result<Self, FieldError> {
        Self::new(config, seed, AmbientMode::Composite)
    }

    pub fn from_json(seed: u64, params: &Value, mode: AmbientMode) -> Result<Self, FieldError> {
        Self::new(SurfaceConfig::from_json(params), seed, mode)
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn mode(&self) -> AmbientMode {
        self.mode
    }

    /// Currently active wave forces.
    pub fn forces(&self) -> &WaveForces {
        &self.forces
    }

    /// Queues a wave force. It is sampled from the next tick on and dropped
    /// once its magnitude reaches zero. Ignored in [`AmbientMode::Noise`].
    ///
    /// Forces with a non-finite field are dropped and a `fall_off` below
    /// `MIN_FALL_OFF` is raised to it; see [`WaveForce::sanitized`].
    pub fn add_wave_force(&mut self, force: WaveForce) {
        if self.mode == AmbientMode::Noise {
            debug!("noise surface ignores wave force at {:?}", force.origin);
            return;
        }
        self.forces.push(force);
    }

    pub fn cell(&self, x: i64, y: i64) -> GridCell {
        let topo = self.heights.topology();
        let index = topo.index(x, y);
        GridCell {
            coordinate: topo.coord(index),
            location: self.locations[index],
            height: self.heights.data()[index],
        }
    }

    /// Unscaled height at `point`: ambient noise plus every active force.
    fn raw_height(&self, point: DVec2) -> f64 {
        self.waves.height(point, self.time) + self.forces.contribution(point, self.time)
    }

    /// Refills the grid from the height function at the current time.
    fn resample(&mut self) -> Result<(), FieldError> {
        self.waves
            .sample_into(&self.locations, self.time, self.heights.data_mut())?;
        if self.forces.is_empty() {
            return Ok(());
        }
        let (forces, time) = (&self.forces, self.time);
        self.heights
            .data_mut()
            .par_iter_mut()
            .zip(self.locations.par_iter())
            .for_each(|(h, &p)| *h += forces.contribution(p, time));
        Ok(())
    }
}

/// Folds a 64-bit seed into the 32-bit seed the noise generator takes.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

impl Surface for AmbientSurface {
    fn elevation(&self, x: f64, z: f64) -> f64 {
        self.raw_height(DVec2::new(x, z)) * self.config.height_scale
    }
}

impl Simulation for AmbientSurface {
    fn step(&mut self, dt: f64) -> Result<(), FieldError> {
        validate_dt(dt)?;
        self.time += dt;
        self.forces.collect_expired(self.time);
        self.resample()?;
        trace!(
            "ambient step dt={dt} t={} forces={}",
            self.time,
            self.forces.len()
        );
        Ok(())
    }

    fn heights(&self) -> &Field {
        &self.heights
    }

    fn write_vertices(&self, out: &mut [f64]) -> Result<(), FieldError> {
        self.heights.copy_scaled_into(self.config.height_scale, out)
    }

    /// Starts an expanding ring at `(x, z)` at the current time.
    fn apply_impulse(&mut self, x: f64, z: f64, magnitude: f64) {
        self.add_wave_force(WaveForce::new(
            DVec2::new(x, z),
            self.time,
            magnitude,
            DEFAULT_FALL_OFF,
        ));
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
                "impulse_fall_off".into(),
                json!({
                    "type": "number",
                    "default": DEFAULT_FALL_OFF,
                    "fixed": true,
                    "description": "Strength lost per unit time by an impulse ring"
                }),
            );
        }
        schema
    }
}
