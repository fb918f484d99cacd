//! Surface configuration shared by every simulation variant.
//!
//! Out-of-range values are clamped into their valid bounds rather than
//! rejected; each clamp is logged at `warn` level so a bad config is visible
//! without stopping the simulation.

use crate::params::{param_bool, param_f64, param_usize};
use glam::DVec2;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_SIZE: usize = 64;
pub const MIN_SIZE: usize = 2;
pub const MAX_SIZE: usize = 4096;
pub const DEFAULT_STEP: f64 = 1.0;
/// Smallest allowed spacing between neighbouring cells in world units.
pub const MIN_STEP: f64 = 0.001;
pub const DEFAULT_SPREAD_RATE: f64 = 1.0;
pub const DEFAULT_DECAY_RATE: f64 = 0.5;
pub const DEFAULT_NOISE_INTENSITY: f64 = 1.0;
pub const DEFAULT_HEIGHT_SCALE: f64 = 1.0;
/// Half-width of the impulse block in cells; 5 gives an 11x11 block.
pub const DEFAULT_IMPULSE_RADIUS: usize = 5;
pub const DEFAULT_FLOW_HEIGHT_COEFFICIENT: f64 = 0.25;
pub const DEFAULT_ENTROPY_JITTER: f64 = 0.1;
pub const DEFAULT_ENTROPY_MAX: f64 = 1.0;
pub const DEFAULT_AMBIENT_SPEED: DVec2 = DVec2::new(0.3, 0.2);
pub const DEFAULT_AMBIENT_SPREAD: f64 = 0.05;
pub const DEFAULT_AMBIENT_AMPLITUDE: f64 = 1.0;

/// Tunables for a simulated water surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Cells per side.
    pub size: usize,
    /// World-space spacing between neighbouring cells.
    pub step: f64,
    /// World position of cell (0, 0).
    pub origin_x: f64,
    pub origin_z: f64,
    /// How fast height/flow differences propagate between neighbours.
    pub spread_rate: f64,
    /// Per-second reduction of flow magnitude.
    pub decay_rate: f64,
    /// Scale of the seeded initial heights and of the entropy term.
    pub noise_intensity: f64,
    /// Multiplier applied to raw heights when sampled or exported.
    pub height_scale: f64,
    /// Shuffle the zero-sum seed pairs across the grid.
    pub shuffle: bool,
    pub impulse_radius: usize,
    pub flow_height_coefficient: f64,
    /// Largest per-tick change of the entropy angle (radians) and magnitude.
    pub entropy_jitter: f64,
    pub entropy_max: f64,
    pub ambient_speed_x: f64,
    pub ambient_speed_z: f64,
    pub ambient_spread: f64,
    pub ambient_amplitude: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            step: DEFAULT_STEP,
            origin_x: 0.0,
            origin_z: 0.0,
            spread_rate: DEFAULT_SPREAD_RATE,
            decay_rate: DEFAULT_DECAY_RATE,
            noise_intensity: DEFAULT_NOISE_INTENSITY,
            height_scale: DEFAULT_HEIGHT_SCALE,
            shuffle: true,
            impulse_radius: DEFAULT_IMPULSE_RADIUS,
            flow_height_coefficient: DEFAULT_FLOW_HEIGHT_COEFFICIENT,
            entropy_jitter: DEFAULT_ENTROPY_JITTER,
            entropy_max: DEFAULT_ENTROPY_MAX,
            ambient_speed_x: DEFAULT_AMBIENT_SPEED.x,
            ambient_speed_z: DEFAULT_AMBIENT_SPEED.y,
            ambient_spread: DEFAULT_AMBIENT_SPREAD,
            ambient_amplitude: DEFAULT_AMBIENT_AMPLITUDE,
        }
    }
}

impl SurfaceConfig {
    /// Reads a config from a JSON params object, falling back to defaults for
    /// missing or mistyped keys, then clamps it.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            size: param_usize(params, "size", d.size),
            step: param_f64(params, "step", d.step),
            origin_x: param_f64(params, "origin_x", d.origin_x),
            origin_z: param_f64(params, "origin_z", d.origin_z),
            spread_rate: param_f64(params, "spread_rate", d.spread_rate),
            decay_rate: param_f64(params, "decay_rate", d.decay_rate),
            noise_intensity: param_f64(params, "noise_intensity", d.noise_intensity),
            height_scale: param_f64(params, "height_scale", d.height_scale),
            shuffle: param_bool(params, "shuffle", d.shuffle),
            impulse_radius: param_usize(params, "impulse_radius", d.impulse_radius),
            flow_height_coefficient: param_f64(
                params,
                "flow_height_coefficient",
                d.flow_height_coefficient,
            ),
            entropy_jitter: param_f64(params, "entropy_jitter", d.entropy_jitter),
            entropy_max: param_f64(params, "entropy_max", d.entropy_max),
            ambient_speed_x: param_f64(params, "ambient_speed_x", d.ambient_speed_x),
            ambient_speed_z: param_f64(params, "ambient_speed_z", d.ambient_speed_z),
            ambient_spread: param_f64(params, "ambient_spread", d.ambient_spread),
            ambient_amplitude: param_f64(params, "ambient_amplitude", d.ambient_amplitude),
        }
        .sanitized()
    }

    /// Returns a copy with every value clamped into its valid range.
    ///
    /// Non-finite floats fall back to their default.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let size = if self.size < MIN_SIZE || self.size > MAX_SIZE {
            let clamped = self.size.clamp(MIN_SIZE, MAX_SIZE);
            warn!("config: size {} clamped to {clamped}", self.size);
            clamped
        } else {
            self.size
        };
        let max_radius = size / 2;
        let impulse_radius = if self.impulse_radius > max_radius {
            warn!(
                "config: impulse_radius {} clamped to {max_radius}",
                self.impulse_radius
            );
            max_radius
        } else {
            self.impulse_radius
        };
        Self {
            size,
            step: at_least("step", self.step, MIN_STEP, d.step),
            origin_x: finite("origin_x", self.origin_x, d.origin_x),
            origin_z: finite("origin_z", self.origin_z, d.origin_z),
            spread_rate: at_least("spread_rate", self.spread_rate, 0.0, d.spread_rate),
            decay_rate: at_least("decay_rate", self.decay_rate, 0.0, d.decay_rate),
            noise_intensity: at_least(
                "noise_intensity",
                self.noise_intensity,
                0.0,
                d.noise_intensity,
            ),
            height_scale: finite("height_scale", self.height_scale, d.height_scale),
            shuffle: self.shuffle,
            impulse_radius,
            flow_height_coefficient: finite(
                "flow_height_coefficient",
                self.flow_height_coefficient,
                d.flow_height_coefficient,
            ),
            entropy_jitter: at_least("entropy_jitter", self.entropy_jitter, 0.0, d.entropy_jitter),
            entropy_max: at_least("entropy_max", self.entropy_max, 0.0, d.entropy_max),
            ambient_speed_x: finite("ambient_speed_x", self.ambient_speed_x, d.ambient_speed_x),
            ambient_speed_z: finite("ambient_speed_z", self.ambient_speed_z, d.ambient_speed_z),
            ambient_spread: at_least("ambient_spread", self.ambient_spread, 0.0, d.ambient_spread),
            ambient_amplitude: finite(
                "ambient_amplitude",
                self.ambient_amplitude,
                d.ambient_amplitude,
            ),
        }
    }

    /// World position of cell (0, 0).
    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.origin_x, self.origin_z)
    }

    pub fn ambient_speed(&self) -> DVec2 {
        DVec2::new(self.ambient_speed_x, self.ambient_speed_z)
    }

    /// Current values as a JSON object, keyed like [`SurfaceConfig::from_json`].
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }

    /// Schema describing every tunable: type, default, range, description.
    pub fn schema() -> Value {
        json!({
            "size": {
                "type": "integer", "default": DEFAULT_SIZE, "min": MIN_SIZE, "max": MAX_SIZE,
                "description": "Cells per side of the toroidal grid"
            },
            "step": {
                "type": "number", "default": DEFAULT_STEP, "min": MIN_STEP,
                "description": "World-space spacing between neighbouring cells"
            },
            "origin_x": {
                "type": "number", "default": 0.0,
                "description": "World x of cell (0, 0)"
            },
            "origin_z": {
                "type": "number", "default": 0.0,
                "description": "World z of cell (0, 0)"
            },
            "spread_rate": {
                "type": "number", "default": DEFAULT_SPREAD_RATE, "min": 0.0,
                "description": "How fast height/flow differences propagate between neighbours"
            },
            "decay_rate": {
                "type": "number", "default": DEFAULT_DECAY_RATE, "min": 0.0,
                "description": "Per-second reduction of flow magnitude"
            },
            "noise_intensity": {
                "type": "number", "default": DEFAULT_NOISE_INTENSITY, "min": 0.0,
                "description": "Scale of seeded initial heights and of the entropy term"
            },
            "height_scale": {
                "type": "number", "default": DEFAULT_HEIGHT_SCALE,
                "description": "Multiplier applied to heights when sampled or exported"
            },
            "shuffle": {
                "type": "boolean", "default": true,
                "description": "Shuffle zero-sum seed pairs across the grid"
            },
            "impulse_radius": {
                "type": "integer", "default": DEFAULT_IMPULSE_RADIUS, "min": 0,
                "description": "Half-width in cells of the block an impulse disturbs"
            },
            "flow_height_coefficient": {
                "type": "number", "default": DEFAULT_FLOW_HEIGHT_COEFFICIENT,
                "description": "Scale from flow divergence to rendered height (flow variant)"
            },
            "entropy_jitter": {
                "type": "number", "default": DEFAULT_ENTROPY_JITTER, "min": 0.0,
                "description": "Largest per-tick change of the entropy walk (flow variant)"
            },
            "entropy_max": {
                "type": "number", "default": DEFAULT_ENTROPY_MAX, "min": 0.0,
                "description": "Upper bound of the entropy magnitude (flow variant)"
            },
            "ambient_speed_x": {
                "type": "number", "default": DEFAULT_AMBIENT_SPEED.x,
                "description": "Noise-space drift per second along x (ambient variant)"
            },
            "ambient_speed_z": {
                "type": "number", "default": DEFAULT_AMBIENT_SPEED.y,
                "description": "Noise-space drift per second along z (ambient variant)"
            },
            "ambient_spread": {
                "type": "number", "default": DEFAULT_AMBIENT_SPREAD, "min": 0.0,
                "description": "Noise frequency per world unit (ambient variant)"
            },
            "ambient_amplitude": {
                "type": "number", "default": DEFAULT_AMBIENT_AMPLITUDE,
                "description": "Peak ambient wave height (ambient variant)"
            }
        })
    }
}

fn finite(name: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!("config: {name} {value} is not finite, using default {default}");
        default
    }
}

fn at_least(name: &str, value: f64, min: f64, default: f64) -> f64 {
    let value = finite(name, value, default);
    if value < min {
        warn!("config: {name} {value} clamped to {min}");
        min
    } else {
        value
    }
}
