//! Failure classes of the `wavefield` binary and the status each exits with.
//!
//! clap exits with 2 on its own before any of this runs. Everything past
//! argument parsing lands in one of four classes, numbered from 10 so the
//! two never collide.

use std::fmt;
use wavefield_core::FieldError;

pub const EXIT_SURFACE: i32 = 10;
pub const EXIT_IO: i32 = 11;
pub const EXIT_INPUT: i32 = 12;
pub const EXIT_SERIALIZE: i32 = 13;

#[derive(Debug)]
pub enum CliError {
    /// The surface refused to build or step.
    Surface(FieldError),
    /// Reading a run spec or writing a snapshot failed.
    Io(String),
    /// Params, a run spec, or starting data the user handed in were unusable.
    Input(String),
    /// Report output could not be encoded as JSON.
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Surface(_) => EXIT_SURFACE,
            CliError::Io(_) => EXIT_IO,
            CliError::Input(_) => EXIT_INPUT,
            CliError::Serialization(_) => EXIT_SERIALIZE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Surface(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                f.write_str(msg)
            }
        }
    }
}

/// File errors keep their own class; mistyped params and bad starting data
/// are the user's input, not a surface fault.
impl From<FieldError> for CliError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::Io(msg) => CliError::Io(msg),
            FieldError::ParamTypeMismatch { .. } | FieldError::NonFiniteValue { .. } => {
                CliError::Input(e.to_string())
            }
            other => CliError::Surface(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
