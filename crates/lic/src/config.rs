//! LIC render configuration.

use std::fmt;
use std::str::FromStr;

use flowvis_core::params::{param_bool, param_choice, param_f64, param_usize};
use flowvis_core::VisError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::contrast::{ContrastEnhancement, DEFAULT_TARGET_MEAN, DEFAULT_TARGET_STD};
use crate::kernel::Kernel;

pub const DEFAULT_ARC_LENGTH: f64 = 10.0;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// One independent streamline per pixel.
    #[default]
    Standard,
    /// Long streamlines shared between pixels with a sliding box filter.
    Fast,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Standard => "standard",
            Algorithm::Fast => "fast",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self, VisError> {
        match s {
            "standard" => Ok(Algorithm::Standard),
            "fast" => Ok(Algorithm::Fast),
            other => Err(VisError::invalid_param(
                "algorithm",
                format!("expected 'standard' or 'fast', got '{other}'"),
            )),
        }
    }
}

/// Everything [`crate::render`] needs besides the field and the texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LicConfig {
    pub algorithm: Algorithm,
    /// Half-streamline length: field units for Standard LIC, window
    /// samples (`2 * floor(arc_length / 2)`) for Fast LIC.
    pub arc_length: f64,
    /// Ignored by Fast LIC, which always uses a box window.
    pub kernel: Kernel,
    pub contrast: bool,
    pub contrast_mean: f64,
    pub contrast_std: f64,
    /// Per-direction step cap for each streamline.
    pub max_iterations: usize,
}

impl Default for LicConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Standard,
            arc_length: DEFAULT_ARC_LENGTH,
            kernel: Kernel::Gaussian,
            contrast: true,
            contrast_mean: DEFAULT_TARGET_MEAN,
            contrast_std: DEFAULT_TARGET_STD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl LicConfig {
    pub fn from_json(params: &Value) -> Result<Self, VisError> {
        let defaults = Self::default();
        let config = Self {
            algorithm: param_choice(params, "algorithm", defaults.algorithm)?,
            arc_length: param_f64(params, "arc_length", defaults.arc_length),
            kernel: param_choice(params, "kernel", defaults.kernel)?,
            contrast: param_bool(params, "contrast", defaults.contrast),
            contrast_mean: param_f64(params, "contrast_mean", defaults.contrast_mean),
            contrast_std: param_f64(params, "contrast_std", defaults.contrast_std),
            max_iterations: param_usize(params, "max_iterations", defaults.max_iterations),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VisError> {
        if !(self.arc_length.is_finite() && self.arc_length > 0.0) {
            return Err(VisError::invalid_param(
                "arc_length",
                format!("must be positive and finite, got {}", self.arc_length),
            ));
        }
        if self.max_iterations == 0 {
            return Err(VisError::invalid_param("max_iterations", "must be at least 1"));
        }
        if self.contrast {
            self.enhancement()?;
        }
        Ok(())
    }

    /// The contrast targets as a validated [`ContrastEnhancement`].
    pub fn enhancement(&self) -> Result<ContrastEnhancement, VisError> {
        ContrastEnhancement::new(self.contrast_mean, self.contrast_std)
    }

    pub fn param_schema() -> Value {
        json!({
            "algorithm": {
                "type": "string",
                "default": "standard",
                "options": ["standard", "fast"],
                "description": "Per-pixel streamlines or shared streamlines with a sliding box"
            },
            "arc_length": {
                "type": "number",
                "default": DEFAULT_ARC_LENGTH,
                "min": 0.0,
                "description": "Half-streamline length; field units (standard) or samples (fast), exclusive minimum"
            },
            "kernel": {
                "type": "string",
                "default": "gaussian",
                "options": ["gaussian", "box", "tent"],
                "description": "Convolution kernel for standard LIC"
            },
            "contrast": {
                "type": "boolean",
                "default": true,
                "description": "Remap channels to the target mean and standard deviation"
            },
            "contrast_mean": {
                "type": "number",
                "default": DEFAULT_TARGET_MEAN,
                "min": 0.0,
                "max": 255.0,
                "description": "Target channel mean after enhancement"
            },
            "contrast_std": {
                "type": "number",
                "default": DEFAULT_TARGET_STD,
                "min": 0.0,
                "description": "Target channel standard deviation after enhancement (exclusive minimum)"
            },
            "max_iterations": {
                "type": "integer",
                "default": DEFAULT_MAX_ITERATIONS,
                "min": 1,
                "description": "Step cap per streamline direction"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = LicConfig::default();
        assert_eq!(cfg.algorithm, Algorithm::Standard);
        assert_eq!(cfg.arc_length, 10.0);
        assert_eq!(cfg.contrast_mean, 128.0);
        assert_eq!(cfg.contrast_std, 50.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_json_reads_knobs() {
        let cfg = LicConfig::from_json(&json!({
            "algorithm": "fast",
            "arc_length": 20.0,
            "kernel": "tent",
            "contrast": false
        }))
        .unwrap();
        assert_eq!(cfg.algorithm, Algorithm::Fast);
        assert_eq!(cfg.arc_length, 20.0);
        assert_eq!(cfg.kernel, Kernel::Tent);
        assert!(!cfg.contrast);
        assert_eq!(cfg.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn from_json_rejects_bad_values() {
        assert!(LicConfig::from_json(&json!({"algorithm": "slow"})).is_err());
        assert!(LicConfig::from_json(&json!({"arc_length": 0.0})).is_err());
        assert!(LicConfig::from_json(&json!({"max_iterations": 0})).is_err());
        assert!(LicConfig::from_json(&json!({"contrast_mean": 400.0})).is_err());
    }

    #[test]
    fn contrast_targets_ignored_when_disabled() {
        let cfg = LicConfig::from_json(&json!({"contrast": false, "contrast_std": -3.0})).unwrap();
        assert!(!cfg.contrast);
    }

    #[test]
    fn param_schema_describes_every_knob() {
        let schema = LicConfig::param_schema();
        for key in [
            "algorithm",
            "arc_length",
            "kernel",
            "contrast",
            "contrast_mean",
            "contrast_std",
            "max_iterations",
        ] {
            assert!(schema[key].get("default").is_some(), "{key} missing default");
            assert!(schema[key].get("description").is_some(), "{key} missing description");
        }
    }

    #[test]
    fn algorithm_round_trips_through_name() {
        for a in [Algorithm::Standard, Algorithm::Fast] {
            assert_eq!(a.to_string().parse::<Algorithm>().unwrap(), a);
        }
    }
}
