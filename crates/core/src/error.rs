//! Error types for the wavefield core.

use thiserror::Error;

/// Errors produced by field construction and simulation operations.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Width or height was zero (or their product overflowed) when creating a grid.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Two buffers had incompatible dimensions, e.g. a vertex buffer of the wrong length.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A step was requested with a negative or non-finite time delta.
    #[error("invalid time step: {0} (must be finite and non-negative)")]
    InvalidTimeStep(f64),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A caller-supplied starting value was NaN or infinite.
    #[error("non-finite starting value at cell {index}")]
    NonFiniteValue { index: usize },

    /// No surface variant is registered under the given name.
    #[error("unknown surface: {0}")]
    UnknownSurface(String),

    /// Snapshot or file I/O failed.
    #[error("i/o error: {0}")]
    Io(String),
}
