//! Error types for flowvis.

use thiserror::Error;

/// Errors produced by grid construction, parameter validation and I/O.
///
/// Out-of-domain samples and seeds are not errors: the sampler returns a zero
/// sentinel and the integrator returns an empty trajectory.
#[derive(Debug, Error)]
pub enum VisError {
    /// Grid dimensions are unusable for the requested operation.
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        reason: &'static str,
    },

    /// Two grids (or a grid and its backing data) had incompatible sizes.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// An (x, y) index was outside the grid.
    #[error("index ({x}, {y}) out of bounds for grid of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A configuration value was outside its valid range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A field generator name was not recognized.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A transfer function could not be built from the given control points.
    #[error("invalid transfer function: {0}")]
    InvalidTransferFunction(String),

    /// Writing an output artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl VisError {
    /// Shorthand for [`VisError::InvalidParameter`].
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        VisError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
