//! Fast LIC: one long streamline colors many pixels.
//!
//! Pixels are visited in raster order. An unvisited pixel seeds a
//! streamline that runs in both directions to the field boundary; a box
//! filter of width `2L` then slides along it, and every pixel the
//! streamline passes through that nobody has colored yet takes the current
//! window mean. Pixels colored this way are never seeds themselves.

use std::collections::VecDeque;

use flowvis_core::{ColorImage, Grid, VectorField, VisError};
use flowvis_streamline::{Integrator, IntegratorConfig, Method, StopKind, Termination};
use glam::DVec4;
use tracing::{debug, info, warn};

use crate::mapping::PixelMapping;

/// Running box-filter sum over the last `2L` samples.
///
/// Each pushed color is scaled by `k = 1 / (2L)` before it enters the
/// window; once more than `2L` samples are held the oldest is evicted and
/// subtracted, so the running sum always equals the sum of what is held.
#[derive(Debug, Clone)]
pub struct SlidingBox {
    capacity: usize,
    weight: f64,
    window: VecDeque<DVec4>,
    sum: DVec4,
}

impl SlidingBox {
    /// Window of `2 * half_length` samples; a zero half length is raised to 1.
    pub fn new(half_length: usize) -> Self {
        let capacity = 2 * half_length.max(1);
        Self {
            capacity,
            weight: 1.0 / capacity as f64,
            window: VecDeque::with_capacity(capacity + 1),
            sum: DVec4::ZERO,
        }
    }

    pub fn push(&mut self, color: DVec4) {
        let weighted = color * self.weight;
        self.window.push_back(weighted);
        self.sum += weighted;
        if self.window.len() > self.capacity {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
            }
        }
    }

    /// Sum of the weighted samples currently held.
    pub fn sum(&self) -> DVec4 {
        self.sum
    }

    /// Mean of the held (unweighted) colors; zero when empty.
    pub fn mean(&self) -> DVec4 {
        if self.window.is_empty() {
            return DVec4::ZERO;
        }
        self.sum * (self.capacity as f64 / self.window.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The held weighted samples, oldest first.
    pub fn held(&self) -> impl Iterator<Item = &DVec4> + '_ {
        self.window.iter()
    }
}

/// Per-pixel visited flags that can only go from unvisited to visited.
#[derive(Debug, Clone)]
pub struct VisitedMask {
    flags: Grid<bool>,
    visited: usize,
}

impl VisitedMask {
    pub fn new(width: usize, height: usize) -> Result<Self, VisError> {
        Ok(Self {
            flags: Grid::new(width, height)?,
            visited: 0,
        })
    }

    /// Marks `(x, y)` visited. Returns `true` only for the call that
    /// performed the transition.
    pub fn claim(&mut self, x: usize, y: usize) -> bool {
        if self.flags.get(x, y) {
            return false;
        }
        self.flags.set(x, y, true);
        self.visited += 1;
        true
    }

    pub fn is_visited(&self, x: usize, y: usize) -> bool {
        self.flags.get(x, y)
    }

    pub fn visited_count(&self) -> usize {
        self.visited
    }
}

/// Counters from one Fast LIC run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FastLicStats {
    /// Streamlines traced, one per seed pixel.
    pub seeds: usize,
    /// Half-streamlines that hit the iteration cap.
    pub capped: usize,
}

/// Runs Fast LIC of `texture` along `field` with a box window of
/// `2 * floor(arc_length / 2)` samples (at least 2).
pub fn fast_lic(
    field: &VectorField,
    texture: &ColorImage,
    arc_length: f64,
    max_iterations: usize,
) -> Result<ColorImage, VisError> {
    fast_lic_with_stats(field, texture, arc_length, max_iterations).map(|(image, _)| image)
}

/// [`fast_lic`], also reporting how many streamlines were traced.
pub fn fast_lic_with_stats(
    field: &VectorField,
    texture: &ColorImage,
    arc_length: f64,
    max_iterations: usize,
) -> Result<(ColorImage, FastLicStats), VisError> {
    let mapping = PixelMapping::new(field, texture);
    let config = IntegratorConfig {
        method: Method::Rk4,
        step_size: mapping.step(),
        constant_speed: true,
        stop: StopKind::Boundary,
        max_iterations,
        ..IntegratorConfig::default()
    };
    let integrator = Integrator::new(field, config)?;
    let half_length = (arc_length / 2.0).floor().max(0.0) as usize;
    debug!(step = mapping.step(), half_length, "fast LIC");

    let (width, height) = texture.dims();
    let mut output = ColorImage::new(width, height)?;
    let mut mask = VisitedMask::new(width, height)?;
    let mut stats = FastLicStats::default();

    for j in 0..height {
        for i in 0..width {
            if !mask.claim(i, j) {
                continue;
            }
            stats.seeds += 1;
            let (back, fwd) = integrator.trace_bidirectional(mapping.seed(i, j));
            stats.capped += usize::from(back.termination() == Termination::IterationLimit)
                + usize::from(fwd.termination() == Termination::IterationLimit);

            // Backward samples farthest first (seed excluded), then forward
            // from the seed. The seed sample is pinned to its own pixel.
            let samples = back
                .points()
                .iter()
                .skip(1)
                .rev()
                .map(|&p| (mapping.pixel(p), false))
                .chain(fwd.points().iter().enumerate().map(|(t, &p)| {
                    if t == 0 {
                        (Some((i, j)), true)
                    } else {
                        (mapping.pixel(p), false)
                    }
                }));

            let mut window = SlidingBox::new(half_length);
            for (pixel, is_seed) in samples {
                let Some((x, y)) = pixel else { continue };
                window.push(texture.get(x, y));
                if is_seed || mask.claim(x, y) {
                    let mut color = window.mean();
                    color.w = 255.0;
                    output.set(x, y, color);
                }
            }
        }
    }

    info!(
        seeds = stats.seeds,
        pixels = mask.visited_count(),
        "fast LIC colored pixels"
    );
    if stats.capped > 0 {
        warn!(
            capped = stats.capped,
            max_iterations, "fast LIC streamlines hit the iteration cap"
        );
    }
    Ok((output, stats))
}
