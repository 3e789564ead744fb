//! Piecewise-linear transfer functions mapping normalized scalars to RGBA.
//!
//! Colors are `DVec4` with channels in [0, 1]. Stops are kept sorted by
//! position; sampling between two stops interpolates every channel linearly
//! and sampling outside the stop range clamps to the end colors.

use glam::DVec4;

use crate::error::VisError;

/// One control point of a [`TransferFunction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: DVec4,
}

/// A sorted list of color stops, sampled by linear interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    stops: Vec<ColorStop>,
}

impl TransferFunction {
    /// Builds a transfer function from `(position, color)` pairs.
    ///
    /// Requires at least one stop, finite positions in [0, 1], and color
    /// channels in [0, 1]. Stops may be given in any order.
    pub fn new(stops: Vec<ColorStop>) -> Result<Self, VisError> {
        if stops.is_empty() {
            return Err(VisError::InvalidTransferFunction(
                "at least one color stop is required".into(),
            ));
        }
        for stop in &stops {
            if !(0.0..=1.0).contains(&stop.position) {
                return Err(VisError::InvalidTransferFunction(format!(
                    "stop position {} outside [0, 1]",
                    stop.position
                )));
            }
            if !(stop.color.is_finite()
                && stop.color.cmpge(DVec4::ZERO).all()
                && stop.color.cmple(DVec4::ONE).all())
            {
                return Err(VisError::InvalidTransferFunction(format!(
                    "stop color {} has channels outside [0, 1]",
                    stop.color
                )));
            }
        }
        let mut stops = stops;
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(Self { stops })
    }

    /// Evenly spaced stops parsed from hex strings (`#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(hexes: &[&str]) -> Result<Self, VisError> {
        let n = hexes.len();
        let stops = hexes
            .iter()
            .enumerate()
            .map(|(i, hex)| {
                let position = if n <= 1 {
                    0.0
                } else {
                    i as f64 / (n - 1) as f64
                };
                parse_hex(hex).map(|color| ColorStop { position, color })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stops)
    }

    /// Black to white.
    pub fn grayscale() -> Self {
        Self {
            stops: vec![
                ColorStop {
                    position: 0.0,
                    color: DVec4::new(0.0, 0.0, 0.0, 1.0),
                },
                ColorStop {
                    position: 1.0,
                    color: DVec4::ONE,
                },
            ],
        }
    }

    /// Blue through white to red, for signed data.
    pub fn cool_warm() -> Self {
        Self {
            stops: vec![
                ColorStop {
                    position: 0.0,
                    color: DVec4::new(0.23, 0.299, 0.754, 1.0),
                },
                ColorStop {
                    position: 0.5,
                    color: DVec4::new(0.865, 0.865, 0.865, 1.0),
                },
                ColorStop {
                    position: 1.0,
                    color: DVec4::new(0.706, 0.016, 0.15, 1.0),
                },
            ],
        }
    }

    /// Blue, cyan, green, yellow, red.
    pub fn rainbow() -> Self {
        let colors = [
            DVec4::new(0.0, 0.0, 1.0, 1.0),
            DVec4::new(0.0, 1.0, 1.0, 1.0),
            DVec4::new(0.0, 1.0, 0.0, 1.0),
            DVec4::new(1.0, 1.0, 0.0, 1.0),
            DVec4::new(1.0, 0.0, 0.0, 1.0),
        ];
        Self {
            stops: colors
                .iter()
                .enumerate()
                .map(|(i, &color)| ColorStop {
                    position: i as f64 / 4.0,
                    color,
                })
                .collect(),
        }
    }

    /// Looks up a preset by name (`grayscale`, `cool_warm`, `rainbow`).
    pub fn preset(name: &str) -> Result<Self, VisError> {
        match name {
            "grayscale" => Ok(Self::grayscale()),
            "cool_warm" => Ok(Self::cool_warm()),
            "rainbow" => Ok(Self::rainbow()),
            other => Err(VisError::InvalidTransferFunction(format!(
                "unknown preset '{other}'"
            ))),
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at normalized position `t`. NaN samples as 0.
    pub fn sample(&self, t: f64) -> DVec4 {
        let t = if t.is_nan() { 0.0 } else { t };
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }
        // t is strictly inside (first, last), so a bracketing pair exists.
        let upper = self.stops.partition_point(|s| s.position <= t);
        let a = self.stops[upper - 1];
        let b = self.stops[upper];
        let span = b.position - a.position;
        if span <= f64::EPSILON {
            return b.color;
        }
        a.color.lerp(b.color, (t - a.position) / span)
    }
}

impl Default for TransferFunction {
    fn default() -> Self {
        Self::grayscale()
    }
}

/// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional) into channels in [0, 1].
pub fn parse_hex(hex: &str) -> Result<DVec4, VisError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 && digits.len() != 8 {
        return Err(VisError::InvalidColor(format!(
            "expected 6 or 8 hex digits in '{hex}'"
        )));
    }
    let channel = |i: usize| -> Result<f64, VisError> {
        let part = digits
            .get(2 * i..2 * i + 2)
            .ok_or_else(|| VisError::InvalidColor(format!("non-ascii color '{hex}'")))?;
        u8::from_str_radix(part, 16)
            .map(|v| v as f64 / 255.0)
            .map_err(|e| VisError::InvalidColor(format!("'{hex}': {e}")))
    };
    let alpha = if digits.len() == 8 { channel(3)? } else { 1.0 };
    Ok(DVec4::new(channel(0)?, channel(1)?, channel(2)?, alpha))
}
