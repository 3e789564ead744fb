//! Standard line integral convolution.
//!
//! Every output pixel is computed independently: trace a streamline of
//! fixed arc length both ways from the pixel's seed, look up the input
//! texture along it and take a kernel-weighted average. Rows are spread
//! over the rayon pool; each worker writes only its own row, so the
//! output does not depend on scheduling.

use flowvis_core::{ColorImage, VectorField, VisError};
use flowvis_streamline::{Integrator, IntegratorConfig, Method, StopKind, Termination, Trajectory};
use glam::DVec4;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::kernel::Kernel;
use crate::mapping::PixelMapping;

/// Runs standard LIC of `texture` along `field`.
///
/// Each half-streamline covers `arc_length` field units in steps of one
/// output pixel. Samples that map outside the texture are skipped and the
/// weighted sum is divided by the weights actually used. Alpha is 255.
pub fn standard_lic(
    field: &VectorField,
    texture: &ColorImage,
    arc_length: f64,
    kernel: Kernel,
    max_iterations: usize,
) -> Result<ColorImage, VisError> {
    let mapping = PixelMapping::new(field, texture);
    let config = streamline_config(&mapping, arc_length, max_iterations);
    let integrator = Integrator::new(field, config)?;
    debug!(
        step = mapping.step(),
        arc_length,
        kernel = kernel.as_str(),
        "standard LIC"
    );

    let (width, height) = texture.dims();
    let mut output = ColorImage::new(width, height)?;
    let capped: usize = output
        .data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .map(|(j, row)| {
            let mut capped = 0;
            for (i, pixel) in row.iter_mut().enumerate() {
                let (back, fwd) = integrator.trace_bidirectional(mapping.seed(i, j));
                capped += usize::from(back.termination() == Termination::IterationLimit)
                    + usize::from(fwd.termination() == Termination::IterationLimit);
                *pixel = convolve(texture, &mapping, (i, j), &back, &fwd, kernel);
            }
            capped
        })
        .sum();
    if capped > 0 {
        warn!(
            capped,
            max_iterations, "standard LIC streamlines hit the iteration cap"
        );
    }
    Ok(output)
}

fn streamline_config(
    mapping: &PixelMapping,
    arc_length: f64,
    max_iterations: usize,
) -> IntegratorConfig {
    IntegratorConfig {
        method: Method::Rk4,
        step_size: mapping.step(),
        constant_speed: true,
        stop: StopKind::ArcLength,
        arc_length,
        max_iterations,
        ..IntegratorConfig::default()
    }
}

/// Kernel-weighted average of the texture along one bidirectional streamline.
///
/// Samples are visited backward (farthest first, seed excluded) then
/// forward (seed first); each is weighted by its step distance from the
/// seed. The seed always reads its own pixel.
fn convolve(
    texture: &ColorImage,
    mapping: &PixelMapping,
    seed_pixel: (usize, usize),
    back: &Trajectory,
    fwd: &Trajectory,
    kernel: Kernel,
) -> DVec4 {
    let total = back.len() + fwd.len();
    let backward = back
        .points()
        .iter()
        .enumerate()
        .skip(1)
        .rev()
        .map(|(t, &p)| (t, mapping.pixel(p)));
    let forward = fwd
        .points()
        .iter()
        .enumerate()
        .map(|(t, &p)| (t, if t == 0 { Some(seed_pixel) } else { mapping.pixel(p) }));

    let mut acc = DVec4::ZERO;
    let mut weights = 0.0;
    for (t, pixel) in backward.chain(forward) {
        let Some((x, y)) = pixel else { continue };
        let w = kernel.weight(t, total);
        acc += texture.get(x, y) * w;
        weights += w;
    }

    let mut color = if weights > 0.0 {
        acc / weights
    } else {
        texture.get(seed_pixel.0, seed_pixel.1)
    };
    color.w = 255.0;
    color
}
