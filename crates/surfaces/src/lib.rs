#![deny(unsafe_code)]
//! Surface registry: maps surface names to implementations and provides
//! CPU-side heightmap snapshots.
//!
//! This crate sits between `wavefield-core` (which defines the `Surface` and
//! `Simulation` traits) and the variant crates (`wavefield-relax`,
//! `wavefield-flow`, `wavefield-ambient`), so front ends share one dispatch.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use log::debug;
use serde_json::Value;
use wavefield_ambient::{AmbientMode, AmbientSurface};
use wavefield_core::error::FieldError;
use wavefield_core::field::Field;
use wavefield_core::params::check_param_types;
use wavefield_core::{RunSpec, Simulation, Surface, SurfaceConfig};
use wavefield_flow::FlowField;
use wavefield_relax::HeightRelaxation;

/// All available surface names.
const SURFACE_NAMES: &[&str] = &["relax", "flow", "noise", "ambient"];

/// Every water-surface variant behind one type.
///
/// Use [`SurfaceKind::from_name`] for string-based construction.
pub enum SurfaceKind {
    /// Thresholded height relaxation.
    Relax(HeightRelaxation),
    /// Flow vectors with per-cell entropy; height from divergence.
    Flow(FlowField),
    /// Simplex noise, alone (`noise`) or with wave forces (`ambient`).
    Ambient(AmbientSurface),
}

impl SurfaceKind {
    /// Constructs a surface by name.
    ///
    /// `params` keys are type-checked against the config schema first, so
    /// `{"size": "big"}` is a `FieldError::ParamTypeMismatch` rather than a
    /// silent fallback. Returns `FieldError::UnknownSurface` for an
    /// unrecognised name.
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, FieldError> {
        check_param_types(params, &SurfaceConfig::schema())?;
        let config = SurfaceConfig::from_json(params);
        let surface = match name {
            "relax" => SurfaceKind::Relax(HeightRelaxation::new(config, seed)?),
            "flow" => SurfaceKind::Flow(FlowField::new(config, seed)?),
            "noise" => SurfaceKind::Ambient(AmbientSurface::new(config, seed, AmbientMode::Noise)?),
            "ambient" => {
                SurfaceKind::Ambient(AmbientSurface::new(config, seed, AmbientMode::Composite)?)
            }
            _ => return Err(FieldError::UnknownSurface(name.to_string())),
        };
        debug!("initialised {name} surface ({0}x{0}, seed {seed})", config.size);
        Ok(surface)
    }

    /// Builds the surface a [`RunSpec`] describes, applies its impulses and
    /// runs its steps.
    pub fn from_spec(spec: &RunSpec) -> Result<Self, FieldError> {
        spec.validate()?;
        let mut surface = Self::from_name(&spec.surface, spec.seed, &spec.config_params())?;
        for imp in &spec.impulses {
            surface.apply_impulse(imp.x, imp.z, imp.magnitude);
        }
        (0..spec.steps).try_for_each(|_| surface.step(spec.dt))?;
        Ok(surface)
    }

    /// Returns a slice of all recognised surface names.
    pub fn list_surfaces() -> &'static [&'static str] {
        SURFACE_NAMES
    }
}

impl Surface for SurfaceKind {
    fn elevation(&self, x: f64, z: f64) -> f64 {
        match self {
            SurfaceKind::Relax(s) => s.elevation(x, z),
            SurfaceKind::Flow(s) => s.elevation(x, z),
            SurfaceKind::Ambient(s) => s.elevation(x, z),
        }
    }
}

impl Simulation for SurfaceKind {
    fn step(&mut self, dt: f64) -> Result<(), FieldError> {
        match self {
            SurfaceKind::Relax(s) => s.step(dt),
            SurfaceKind::Flow(s) => s.step(dt),
            SurfaceKind::Ambient(s) => s.step(dt),
        }
    }

    fn heights(&self) -> &Field {
        match self {
            SurfaceKind::Relax(s) => s.heights(),
            SurfaceKind::Flow(s) => s.heights(),
            SurfaceKind::Ambient(s) => s.heights(),
        }
    }

    fn write_vertices(&self, out: &mut [f64]) -> Result<(), FieldError> {
        match self {
            SurfaceKind::Relax(s) => s.write_vertices(out),
            SurfaceKind::Flow(s) => s.write_vertices(out),
            SurfaceKind::Ambient(s) => s.write_vertices(out),
        }
    }

    fn apply_impulse(&mut self, x: f64, z: f64, magnitude: f64) {
        match self {
            SurfaceKind::Relax(s) => s.apply_impulse(x, z, magnitude),
            SurfaceKind::Flow(s) => s.apply_impulse(x, z, magnitude),
            SurfaceKind::Ambient(s) => s.apply_impulse(x, z, magnitude),
        }
    }

    fn elapsed(&self) -> f64 {
        match self {
            SurfaceKind::Relax(s) => s.elapsed(),
            SurfaceKind::Flow(s) => s.elapsed(),
            SurfaceKind::Ambient(s) => s.elapsed(),
        }
    }

    fn params(&self) -> Value {
        match self {
            SurfaceKind::Relax(s) => s.params(),
            SurfaceKind::Flow(s) => s.params(),
            SurfaceKind::Ambient(s) => s.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            SurfaceKind::Relax(s) => s.param_schema(),
            SurfaceKind::Flow(s) => s.param_schema(),
            SurfaceKind::Ambient(s) => s.param_schema(),
        }
    }
}
