//! Reproducible description of a simulation run.
//!
//! A [`RunSpec`] captures everything needed to replay a run bit-for-bit:
//! surface variant, grid size, tunables, PRNG seed, tick count, tick length,
//! and the impulses applied before the first tick.

use crate::config::{MAX_SIZE, MIN_SIZE};
use crate::error::FieldError;
use crate::surface::validate_dt;
use serde::{Deserialize, Serialize};

/// An impulse queued before the first step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpulseSpec {
    pub x: f64,
    pub z: f64,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    pub surface: String,
    pub size: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub steps: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub impulses: Vec<ImpulseSpec>,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_dt() -> f64 {
    1.0 / 60.0
}

impl RunSpec {
    /// Creates a spec with empty params, zero steps and a 60 Hz tick.
    pub fn new(surface: &str, size: usize, seed: u64) -> Self {
        Self {
            surface: surface.to_string(),
            size,
            params: empty_params(),
            seed,
            steps: 0,
            dt: default_dt(),
            impulses: Vec::new(),
        }
    }

    /// Checks the grid size and tick length.
    ///
    /// Unlike [`crate::SurfaceConfig`], which clamps, a replayable spec must be
    /// exact, so out-of-range values are rejected.
    pub fn validate(&self) -> Result<(), FieldError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            return Err(FieldError::InvalidDimensions);
        }
        validate_dt(self.dt)
    }

    /// Params merged with the grid size, ready for [`crate::SurfaceConfig::from_json`].
    pub fn config_params(&self) -> serde_json::Value {
        let mut params = match &self.params {
            serde_json::Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        params.insert("size".into(), self.size.into());
        serde_json::Value::Object(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_creates_spec_with_defaults() {
        let s = RunSpec::new("relax", 64, 42);
        assert_eq!(s.surface, "relax");
        assert_eq!(s.size, 64);
        assert_eq!(s.seed, 42);
        assert_eq!(s.steps, 0);
        assert_eq!(s.params, json!({}));
        assert!(s.impulses.is_empty());
    }

    #[test]
    fn json_round_trip_with_impulses() {
        let mut s = RunSpec::new("flow", 32, 7);
        s.params = json!({"spread_rate": 0.5, "decay_rate": 0.1});
        s.steps = 120;
        s.impulses.push(ImpulseSpec {
            x: 3.0,
            z: 4.5,
            magnitude: 8.0,
        });
        let text = serde_json::to_string_pretty(&s).unwrap();
        let restored: RunSpec = serde_json::from_str(&text).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn missing_optional_keys_use_defaults() {
        let s: RunSpec =
            serde_json::from_str(r#"{"surface": "ambient", "size": 16, "seed": 1}"#).unwrap();
        assert_eq!(s.steps, 0);
        assert!((s.dt - 1.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(s.params, json!({}));
    }

    #[test]
    fn validate_rejects_bad_size_and_dt() {
        assert!(RunSpec::new("relax", 64, 1).validate().is_ok());
        assert!(RunSpec::new("relax", 1, 1).validate().is_err());
        assert!(RunSpec::new("relax", MAX_SIZE + 1, 1).validate().is_err());
        let mut s = RunSpec::new("relax", 8, 1);
        s.dt = -0.1;
        assert!(matches!(s.validate(), Err(FieldError::InvalidTimeStep(_))));
    }

    #[test]
    fn config_params_overrides_size() {
        let mut s = RunSpec::new("relax", 24, 1);
        s.params = json!({"size": 2, "spread_rate": 3.0});
        let p = s.config_params();
        assert_eq!(p["size"], 24);
        assert_eq!(p["spread_rate"], 3.0);
    }
}
