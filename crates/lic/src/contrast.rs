//! Contrast enhancement for LIC output.
//!
//! LIC averages many texture samples, so its output clusters around the
//! texture mean with little spread. Enhancement shifts and scales each RGB
//! channel so that the populated pixels (RGB not all zero) reach a target
//! mean and standard deviation.

use flowvis_core::params::param_f64;
use flowvis_core::{ColorImage, VisError};
use glam::{DVec3, DVec4, Vec4Swizzles};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_TARGET_MEAN: f64 = 128.0;
pub const DEFAULT_TARGET_STD: f64 = 50.0;

/// Channel spreads at or below this are treated as zero.
const SPREAD_EPS: f64 = 1e-12;

/// Per-channel statistics over populated pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: DVec3,
    /// Sample standard deviation (divides by `count - 1`).
    pub std: DVec3,
    pub count: usize,
}

fn is_populated(c: &DVec4) -> bool {
    c.x != 0.0 || c.y != 0.0 || c.z != 0.0
}

/// RGB mean and sample standard deviation of the populated pixels, or
/// `None` when fewer than two pixels are populated.
pub fn channel_stats(image: &ColorImage) -> Option<ChannelStats> {
    let populated = || image.data().iter().filter(|c| is_populated(c));
    let count = populated().count();
    if count < 2 {
        return None;
    }
    let n = count as f64;
    let mean = populated().fold(DVec3::ZERO, |acc, c| acc + c.xyz()) / n;
    let sq = populated().fold(DVec3::ZERO, |acc, c| {
        let d = c.xyz() - mean;
        acc + d * d
    });
    Some(ChannelStats {
        mean,
        std: (sq / (n - 1.0)).powf(0.5),
        count,
    })
}

/// Target statistics for [`ContrastEnhancement::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastEnhancement {
    pub mean: f64,
    pub std: f64,
}

impl Default for ContrastEnhancement {
    fn default() -> Self {
        Self {
            mean: DEFAULT_TARGET_MEAN,
            std: DEFAULT_TARGET_STD,
        }
    }
}

impl ContrastEnhancement {
    /// Target mean must lie in [0, 255]; target std must be positive and finite.
    pub fn new(mean: f64, std: f64) -> Result<Self, VisError> {
        if !(0.0..=255.0).contains(&mean) {
            return Err(VisError::invalid_param(
                "contrast_mean",
                format!("must lie in [0, 255], got {mean}"),
            ));
        }
        if !(std.is_finite() && std > 0.0) {
            return Err(VisError::invalid_param(
                "contrast_std",
                format!("must be positive and finite, got {std}"),
            ));
        }
        Ok(Self { mean, std })
    }

    /// Reads `contrast_mean` / `contrast_std`, validating the result.
    pub fn from_json(params: &Value) -> Result<Self, VisError> {
        Self::new(
            param_f64(params, "contrast_mean", DEFAULT_TARGET_MEAN),
            param_f64(params, "contrast_std", DEFAULT_TARGET_STD),
        )
    }

    /// Remaps every populated pixel in place:
    /// `(v - mean) * target_std / std + target_mean`, clamped to [0, 255].
    ///
    /// Unpopulated pixels and alpha are left untouched. A channel with no
    /// spread is set to the target mean. With fewer than two populated
    /// pixels the image is unchanged. Returns the statistics the remap used.
    pub fn apply(&self, image: &mut ColorImage) -> Option<ChannelStats> {
        let stats = channel_stats(image)?;
        let target_mean = DVec3::splat(self.mean);
        let flat = stats.std.cmple(DVec3::splat(SPREAD_EPS));
        let gain = DVec3::select(
            flat,
            DVec3::ZERO,
            DVec3::splat(self.std) / stats.std.max(DVec3::splat(SPREAD_EPS)),
        );
        for c in image.data_mut().iter_mut().filter(|c| is_populated(c)) {
            let rgb = ((c.xyz() - stats.mean) * gain + target_mean)
                .clamp(DVec3::ZERO, DVec3::splat(255.0));
            *c = rgb.extend(c.w);
        }
        debug!(
            populated = stats.count,
            mean = %stats.mean,
            std = %stats.std,
            "contrast enhancement"
        );
        Some(stats)
    }
}
