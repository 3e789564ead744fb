//! Convolution kernels for standard LIC.
//!
//! Weights are evaluated at a sample's index distance from the seed. The
//! convolution divides by the sum of the weights it actually used, so
//! kernels only need the right shape; their absolute scale cancels.

use std::f64::consts::PI;
use std::str::FromStr;

use flowvis_core::VisError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// Normal density with sigma = total / 4, centered on the seed.
    #[default]
    Gaussian,
    /// Equal weight for every sample.
    Box,
    /// Linear falloff from the seed, reaching zero just past half the window.
    Tent,
}

impl Kernel {
    /// Weight of a sample `offset` steps away from the seed in a
    /// streamline of `total` samples.
    pub fn weight(self, offset: usize, total: usize) -> f64 {
        let t = offset as f64;
        let total = total.max(1) as f64;
        match self {
            Kernel::Gaussian => {
                let std = total / 4.0;
                let z = 1.0 / (std * (2.0 * PI).sqrt());
                z * (-(t * t) / (2.0 * std * std)).exp()
            }
            Kernel::Box => 1.0 / total,
            Kernel::Tent => {
                let half = total / 2.0 + 1.0;
                (1.0 - t / half).max(0.0)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kernel::Gaussian => "gaussian",
            Kernel::Box => "box",
            Kernel::Tent => "tent",
        }
    }
}

impl FromStr for Kernel {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self, VisError> {
        match s {
            "gaussian" => Ok(Kernel::Gaussian),
            "box" => Ok(Kernel::Box),
            "tent" => Ok(Kernel::Tent),
            other => Err(VisError::invalid_param(
                "kernel",
                format!("expected 'gaussian', 'box' or 'tent', got '{other}'"),
            )),
        }
    }
}
