//! Contour configuration knobs.

use flowvis_core::params::{param_bool, param_choice, param_f64, param_string, param_usize};
use flowvis_core::{parse_hex, ScalarField, TransferFunction, VisError};
use serde_json::{json, Value};

use crate::cell::Decider;
use crate::levels::{contour, contour_both_deciders, IsoLevels, Isoline, MAX_CONTOURS};

pub const DEFAULT_ISO_VALUE: f64 = 0.5;
pub const DEFAULT_ISO_COLOR: &str = "#0000ff";
pub const DEFAULT_TRANSFER: &str = "cool_warm";
pub const DEFAULT_OTHER_COLOR: &str = "#ff0000";

#[derive(Debug, Clone, PartialEq)]
pub struct ContourConfig {
    pub decider: Decider,
    /// Used when `contours` is zero.
    pub iso_value: f64,
    /// Number of evenly spaced levels; zero selects the single `iso_value`.
    pub contours: usize,
    /// Hex color of the single isoline.
    pub color: String,
    /// Transfer-function preset for evenly spaced levels.
    pub transfer: String,
    /// Also emit the cell grid.
    pub show_grid: bool,
    /// Extract every level with both deciders, ignoring `decider`.
    pub both_deciders: bool,
    /// Hex color of the asymptotic isolines when `both_deciders` is set.
    pub other_color: String,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            decider: Decider::Midpoint,
            iso_value: DEFAULT_ISO_VALUE,
            contours: 0,
            color: DEFAULT_ISO_COLOR.to_string(),
            transfer: DEFAULT_TRANSFER.to_string(),
            show_grid: false,
            both_deciders: false,
            other_color: DEFAULT_OTHER_COLOR.to_string(),
        }
    }
}

impl ContourConfig {
    pub fn from_json(params: &Value) -> Result<Self, VisError> {
        let defaults = Self::default();
        let config = Self {
            decider: param_choice(params, "decider", defaults.decider)?,
            iso_value: param_f64(params, "iso_value", defaults.iso_value),
            contours: param_usize(params, "contours", defaults.contours),
            color: param_string(params, "color", &defaults.color),
            transfer: param_string(params, "transfer", &defaults.transfer),
            show_grid: param_bool(params, "show_grid", defaults.show_grid),
            both_deciders: param_bool(params, "both_deciders", defaults.both_deciders),
            other_color: param_string(params, "other_color", &defaults.other_color),
        };
        config.levels()?;
        parse_hex(&config.other_color)?;
        Ok(config)
    }

    /// Extracts the isolines these knobs describe from `field`.
    pub fn isolines(&self, field: &ScalarField) -> Result<Vec<Isoline>, VisError> {
        let levels = self.levels()?;
        if self.both_deciders {
            contour_both_deciders(field, &levels, parse_hex(&self.other_color)?)
        } else {
            contour(field, &levels, self.decider)
        }
    }

    /// Decider name for reports: `"both"` when both are drawn.
    pub fn decider_label(&self) -> &'static str {
        if self.both_deciders {
            "both"
        } else {
            self.decider.as_str()
        }
    }

    /// The [`IsoLevels`] these knobs describe.
    pub fn levels(&self) -> Result<IsoLevels, VisError> {
        if self.contours > MAX_CONTOURS {
            return Err(VisError::invalid_param(
                "contours",
                format!("must be at most {MAX_CONTOURS}, got {}", self.contours),
            ));
        }
        if self.contours > 0 {
            return Ok(IsoLevels::uniform(
                self.contours,
                TransferFunction::preset(&self.transfer)?,
            ));
        }
        if !self.iso_value.is_finite() {
            return Err(VisError::invalid_param(
                "iso_value",
                format!("must be finite, got {}", self.iso_value),
            ));
        }
        Ok(IsoLevels::Single {
            value: self.iso_value,
            color: parse_hex(&self.color)?,
        })
    }

    pub fn param_schema() -> Value {
        json!({
            "decider": {
                "type": "string",
                "default": "midpoint",
                "options": ["midpoint", "asymptotic"],
                "description": "Saddle-cell disambiguation rule"
            },
            "iso_value": {
                "type": "number",
                "default": DEFAULT_ISO_VALUE,
                "description": "Iso-value when contours is 0"
            },
            "contours": {
                "type": "integer",
                "default": 0,
                "min": 0,
                "max": MAX_CONTOURS,
                "description": "Evenly spaced levels between field min and max (0 = single iso_value)"
            },
            "color": {
                "type": "string",
                "default": DEFAULT_ISO_COLOR,
                "description": "Hex color of the single isoline"
            },
            "transfer": {
                "type": "string",
                "default": DEFAULT_TRANSFER,
                "options": ["grayscale", "cool_warm", "rainbow"],
                "description": "Color preset sampled per level"
            },
            "show_grid": {
                "type": "boolean",
                "default": false,
                "description": "Also output the cell grid lines"
            },
            "both_deciders": {
                "type": "boolean",
                "default": false,
                "description": "Draw midpoint and asymptotic isolines together"
            },
            "other_color": {
                "type": "string",
                "default": DEFAULT_OTHER_COLOR,
                "description": "Hex color of the asymptotic isolines when both deciders are drawn"
            }
        })
    }
}
