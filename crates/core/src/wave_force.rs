//! Transient wave forces: expanding annular pulses added on top of a surface.
//!
//! A force starts at `origin` at `start_time` and spreads as a ring whose
//! radius equals the elapsed time. Its strength falls linearly from
//! `base_magnitude` at rate `fall_off` and the force expires once that
//! reaches zero. `fall_off` is held at or above [`MIN_FALL_OFF`] so every
//! force eventually expires.

use glam::DVec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Ring half-width as a fraction of the elapsed time.
pub const RING_WIDTH_RATIO: f64 = 0.5;

/// Smallest accepted fall-off rate. A force of magnitude `m` lives at most
/// `m / MIN_FALL_OFF` time units.
pub const MIN_FALL_OFF: f64 = 0.01;

/// One expanding ring disturbance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveForce {
    pub origin: DVec2,
    pub start_time: f64,
    pub base_magnitude: f64,
    pub fall_off: f64,
}

impl WaveForce {
    pub fn new(origin: DVec2, start_time: f64, base_magnitude: f64, fall_off: f64) -> Self {
        Self {
            origin,
            start_time,
            base_magnitude,
            fall_off,
        }
    }

    /// Checks the force before it joins a [`WaveForces`] set.
    ///
    /// Returns `None` (logged at `warn`) if any field is NaN or infinite.
    /// A `fall_off` below [`MIN_FALL_OFF`], including zero and negative
    /// rates, is raised to it.
    pub fn sanitized(self) -> Option<Self> {
        let finite = self.origin.is_finite()
            && self.start_time.is_finite()
            && self.base_magnitude.is_finite()
            && self.fall_off.is_finite();
        if !finite {
            warn!("dropping wave force with non-finite field: {self:?}");
            return None;
        }
        if self.fall_off < MIN_FALL_OFF {
            warn!("wave force fall_off {} raised to {MIN_FALL_OFF}", self.fall_off);
            return Some(Self {
                fall_off: MIN_FALL_OFF,
                ..self
            });
        }
        Some(self)
    }

    /// Remaining strength at `now`: `base_magnitude - (now - start_time) * fall_off`.
    pub fn magnitude_at(&self, now: f64) -> f64 {
        self.base_magnitude - (now - self.start_time) * self.fall_off
    }

    pub fn is_active(&self, now: f64) -> bool {
        self.magnitude_at(now) > 0.0
    }

    /// Height contributed at `point` at time `now`.
    ///
    /// Zero before the force starts, after it expires, and outside the ring.
    /// Inside the ring the profile is a half-sine peaking on the ring radius.
    pub fn contribution(&self, point: DVec2, now: f64) -> f64 {
        let elapsed = now - self.start_time;
        let magnitude = self.magnitude_at(now);
        if elapsed <= 0.0 || magnitude <= 0.0 {
            return 0.0;
        }
        let half_width = elapsed * RING_WIDTH_RATIO;
        let offset = point.distance(self.origin) - elapsed;
        if offset.abs() >= half_width {
            return 0.0;
        }
        magnitude * (PI * (offset / half_width + 1.0) / 2.0).sin()
    }
}

/// The set of currently active wave forces.
///
/// Mutated only by the driving thread between steps; sampling borrows it
/// immutably.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveForces {
    forces: Vec<WaveForce>,
}

impl WaveForces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `force` after [`WaveForce::sanitized`]; returns `false` if it
    /// was rejected.
    pub fn push(&mut self, force: WaveForce) -> bool {
        match force.sanitized() {
            Some(f) => {
                self.forces.push(f);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaveForce> {
        self.forces.iter()
    }

    /// Drops every force that has expired by `now`; returns how many were dropped.
    pub fn collect_expired(&mut self, now: f64) -> usize {
        let before = self.forces.len();
        self.forces.retain(|f| f.is_active(now));
        let dropped = before - self.forces.len();
        if dropped > 0 {
            debug!("collected {dropped} expired wave forces, {} active", self.forces.len());
        }
        dropped
    }

    /// Sum of every force's contribution at `point`.
    pub fn contribution(&self, point: DVec2, now: f64) -> f64 {
        self.forces.iter().map(|f| f.contribution(point, now)).sum()
    }
}
