//! The `Surface` and `Simulation` traits every water-surface variant implements.
//!
//! Both traits are object-safe so variants can be switched at runtime behind
//! `Box<dyn Simulation>`.

use crate::error::FieldError;
use crate::field::Field;
use serde_json::Value;

/// Anything that can answer "what is the height at this point".
///
/// Consumed by buoyancy, vehicle physics and creature depth logic.
/// `elevation` never mutates state: it is reentrant and safe to call from
/// many threads at once.
pub trait Surface: Send + Sync {
    /// Height of the surface at planar world position `(x, z)`.
    fn elevation(&self, x: f64, z: f64) -> f64;
}

/// A time-stepped surface driven by an external loop.
///
/// `step` runs every pass of a tick to completion before returning; the
/// caller then copies results into its own vertex buffer with
/// [`Simulation::write_vertices`]. Impulses must be applied between steps.
pub trait Simulation: Surface {
    /// Advance the simulation by `dt` seconds.
    ///
    /// Returns `FieldError::InvalidTimeStep` (and leaves state untouched) if
    /// `dt` is negative or not finite.
    fn step(&mut self, dt: f64) -> Result<(), FieldError>;

    /// Raw per-cell heights in mesh vertex order (row-major).
    fn heights(&self) -> &Field;

    /// Copies height-scale-adjusted heights into a caller-owned vertex buffer.
    fn write_vertices(&self, out: &mut [f64]) -> Result<(), FieldError>;

    /// Injects a localized disturbance at world position `(x, z)`.
    fn apply_impulse(&mut self, x: f64, z: f64, magnitude: f64);

    /// Simulated time since construction.
    fn elapsed(&self) -> f64;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}

/// Rejects negative or non-finite time deltas.
pub fn validate_dt(dt: f64) -> Result<(), FieldError> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidTimeStep(dt))
    }
}
