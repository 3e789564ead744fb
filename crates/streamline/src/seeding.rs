//! Seed placement for tracing many streamlines at once.
//!
//! All strategies return positions in grid-index space inside the requested
//! rectangle, ready to hand to [`Integrator::trace`](crate::Integrator::trace).

use flowvis_core::{sample, VectorField, VisError, Xorshift64};
use glam::DVec2;
use tracing::debug;

use crate::integrator::Bounds;

/// Proposals allowed per requested seed before rejection sampling gives up.
const ATTEMPTS_PER_SEED: usize = 1000;

fn ensure_non_degenerate(bounds: &Bounds) -> Result<(), VisError> {
    if !(bounds.min.is_finite() && bounds.max.is_finite())
        || bounds.min.x > bounds.max.x
        || bounds.min.y > bounds.max.y
    {
        return Err(VisError::invalid_param(
            "bounds",
            format!("min {} must not exceed max {}", bounds.min, bounds.max),
        ));
    }
    Ok(())
}

/// A `nx x ny` lattice of cell centers covering `bounds`, row by row.
pub fn grid_seeds(bounds: Bounds, nx: usize, ny: usize) -> Result<Vec<DVec2>, VisError> {
    ensure_non_degenerate(&bounds)?;
    if nx == 0 || ny == 0 {
        return Err(VisError::invalid_param(
            "seed_grid",
            format!("lattice must be at least 1x1, got {nx}x{ny}"),
        ));
    }
    let cell = (bounds.max - bounds.min) / DVec2::new(nx as f64, ny as f64);
    Ok((0..ny)
        .flat_map(|j| {
            (0..nx).map(move |i| {
                bounds.min + cell * DVec2::new(i as f64 + 0.5, j as f64 + 0.5)
            })
        })
        .collect())
}

/// `count` positions drawn uniformly from `bounds`.
pub fn random_seeds(bounds: Bounds, count: usize, seed: u64) -> Result<Vec<DVec2>, VisError> {
    ensure_non_degenerate(&bounds)?;
    let mut rng = Xorshift64::new(seed);
    Ok((0..count).map(|_| uniform_point(&mut rng, &bounds)).collect())
}

/// Up to `count` positions drawn with density proportional to the local
/// field magnitude (rejection sampling against the grid's maximum).
///
/// A field that vanishes everywhere has no preferred positions and yields
/// no seeds. Rejection stops after a fixed budget of proposals, so very
/// peaked fields may return fewer than `count` seeds.
pub fn magnitude_weighted_seeds(
    field: &VectorField,
    count: usize,
    seed: u64,
) -> Result<Vec<DVec2>, VisError> {
    field.ensure_interpolable()?;
    let bounds = Bounds::of_field(field);
    let peak = field.max_magnitude();
    if peak <= 0.0 {
        return Ok(Vec::new());
    }

    let mut rng = Xorshift64::new(seed);
    let budget = count.saturating_mul(ATTEMPTS_PER_SEED);
    let mut seeds = Vec::with_capacity(count);
    let mut attempts = 0;
    while seeds.len() < count && attempts < budget {
        attempts += 1;
        let p = uniform_point(&mut rng, &bounds);
        if rng.next_f64() * peak < sample(field, p).length() {
            seeds.push(p);
        }
    }
    debug!(
        requested = count,
        accepted = seeds.len(),
        attempts,
        "magnitude-weighted seeding"
    );
    Ok(seeds)
}

fn uniform_point(rng: &mut Xorshift64, bounds: &Bounds) -> DVec2 {
    DVec2::new(
        rng.next_range(bounds.min.x, bounds.max.x),
        rng.next_range(bounds.min.y, bounds.max.y),
    )
}
