//! Mapping from grid-index space into a normalized plot square.

use flowvis_core::VisError;
use glam::DVec2;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARGIN: f64 = 0.1;

/// Maps positions in a `width x height` grid to `[margin, 1 - margin]^2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotTransform {
    margin: f64,
    extent: DVec2,
}

impl PlotTransform {
    /// `margin` must lie in `[0, 0.5)`; the grid must be at least 2x2.
    pub fn new(width: usize, height: usize, margin: f64) -> Result<Self, VisError> {
        if !(0.0..0.5).contains(&margin) {
            return Err(VisError::invalid_param(
                "margin",
                format!("must lie in [0, 0.5), got {margin}"),
            ));
        }
        if width < 2 || height < 2 {
            return Err(VisError::InvalidDimensions {
                width,
                height,
                reason: "need at least 2x2 samples",
            });
        }
        Ok(Self {
            margin,
            extent: DVec2::new((width - 1) as f64, (height - 1) as f64),
        })
    }

    /// Transform with the default 0.1 margin.
    pub fn with_default_margin(width: usize, height: usize) -> Result<Self, VisError> {
        Self::new(width, height, DEFAULT_MARGIN)
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn to_plot(&self, p: DVec2) -> DVec2 {
        DVec2::splat(self.margin) + p / self.extent * (1.0 - 2.0 * self.margin)
    }

    pub fn to_grid(&self, q: DVec2) -> DVec2 {
        (q - DVec2::splat(self.margin)) / (1.0 - 2.0 * self.margin) * self.extent
    }

    pub fn map_points(&self, points: &[DVec2]) -> Vec<DVec2> {
        points.iter().map(|&p| self.to_plot(p)).collect()
    }
}
