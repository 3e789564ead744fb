//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: visualization error (unknown field, bad dimensions, bad knob values)
//! - 11: I/O error (PNG write)
//! - 12: input error (malformed JSON, bad color or preset name)
//! - 13: serialization error

use flowvis_core::VisError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    Vis(VisError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Vis(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Vis(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<VisError> for CliError {
    fn from(e: VisError) -> Self {
        match e {
            VisError::Io(msg) => CliError::Io(msg),
            VisError::InvalidColor(_) | VisError::InvalidTransferFunction(_) => {
                CliError::Input(e.to_string())
            }
            other => CliError::Vis(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
