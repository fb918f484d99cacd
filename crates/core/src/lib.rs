#![deny(unsafe_code)]
//! Core types and traits for the wavefield water-surface simulator.
//!
//! Provides the toroidal `GridTopology`, the signed height `Field`, the
//! `Surface`/`Simulation` traits, `SurfaceConfig`, bilinear sampling, the
//! simplex-noise `AmbientWaveField`, transient `WaveForce`s, zero-sum
//! seeding, the `Xorshift64` PRNG, and `RunSpec`.

pub mod ambient;
pub mod config;
pub mod error;
pub mod field;
pub mod grid;
pub mod impulse;
pub mod params;
pub mod prng;
pub mod run_spec;
pub mod sampling;
pub mod seeding;
pub mod surface;
pub mod wave_force;

pub use ambient::AmbientWaveField;
pub use config::SurfaceConfig;
pub use error::FieldError;
pub use field::{Field, GridCell};
pub use grid::{wrap_index, GridTopology};
pub use prng::Xorshift64;
pub use run_spec::{ImpulseSpec, RunSpec};
pub use sampling::GridFrame;
pub use surface::{Simulation, Surface};
pub use wave_force::{WaveForce, WaveForces};

pub use glam::DVec2;
