//! Ambient wave layer: a continuous simplex-noise height function.
//!
//! The field has no per-cell state. Height is a pure function of planar
//! position and time, so it can be evaluated from any number of threads.
//! The batched path used for mesh updates calls the same single-point
//! function as external queries, so the rendered surface and query results
//! never diverge.

use crate::error::FieldError;
use glam::DVec2;
use noise::{NoiseFn, Simplex};
use rayon::prelude::*;
use std::fmt;

/// Drifting simplex-noise height field.
#[derive(Clone)]
pub struct AmbientWaveField {
    noise: Simplex,
    /// Noise-space drift per unit time.
    pub speed: DVec2,
    /// Noise frequency per world unit.
    pub spread: f64,
    /// Peak height.
    pub amplitude: f64,
}

impl AmbientWaveField {
    pub fn new(speed: DVec2, spread: f64, amplitude: f64, seed: u32) -> Self {
        Self {
            noise: Simplex::new(seed),
            speed,
            spread,
            amplitude,
        }
    }

    /// Height at planar `position` and `time`:
    /// `amplitude * simplex(position * spread + time * speed)`.
    pub fn height(&self, position: DVec2, time: f64) -> f64 {
        let p = position * self.spread + self.speed * time;
        self.amplitude * self.noise.get([p.x, p.y])
    }

    /// Evaluates [`AmbientWaveField::height`] for every point in parallel,
    /// writing into `out`.
    ///
    /// Returns `FieldError::DimensionMismatch` if the slices differ in length.
    pub fn sample_into(
        &self,
        points: &[DVec2],
        time: f64,
        out: &mut [f64],
    ) -> Result<(), FieldError> {
        if points.len() != out.len() {
            return Err(FieldError::DimensionMismatch {
                lhs_w: points.len(),
                lhs_h: 1,
                rhs_w: out.len(),
                rhs_h: 1,
            });
        }
        out.par_iter_mut()
            .zip(points.par_iter())
            .for_each(|(h, &p)| *h = self.height(p, time));
        Ok(())
    }
}

impl fmt::Debug for AmbientWaveField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientWaveField")
            .field("speed", &self.speed)
            .field("spread", &self.spread)
            .field("amplitude", &self.amplitude)
            .finish()
    }
}
