//! Side-by-side Euler and RK4 integration from one seed.

use flowvis_core::{VectorField, VisError};
use glam::DVec2;
use serde::Serialize;
use tracing::debug;

use crate::integrator::{euler_step, rk4_step, MAX_STEPS};

/// Euler and RK4 paths of equal length plus their pointwise separation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodComparison {
    pub euler: Vec<DVec2>,
    pub rk4: Vec<DVec2>,
    /// `|euler[i] - rk4[i]|` for every step index.
    pub deviation: Vec<f64>,
}

impl MethodComparison {
    /// Largest separation over the whole run.
    pub fn max_deviation(&self) -> f64 {
        self.deviation.iter().copied().fold(0.0, f64::max)
    }

    pub fn final_deviation(&self) -> f64 {
        self.deviation.last().copied().unwrap_or(0.0)
    }
}

/// Integrates `steps` forward steps of plain (non-normalized) Euler and RK4
/// from `seed`.
///
/// No stopping policy applies: both paths always have `steps + 1` points,
/// and positions that leave the domain simply stop moving because the field
/// samples to zero there.
pub fn compare_methods(
    field: &VectorField,
    seed: DVec2,
    step_size: f64,
    steps: usize,
) -> Result<MethodComparison, VisError> {
    field.ensure_interpolable()?;
    if !(step_size.is_finite() && step_size > 0.0) {
        return Err(VisError::invalid_param(
            "step_size",
            format!("must be finite and positive, got {step_size}"),
        ));
    }
    if steps > MAX_STEPS {
        return Err(VisError::invalid_param(
            "steps",
            format!("must not exceed {MAX_STEPS}, got {steps}"),
        ));
    }
    if !field.contains(seed) {
        return Err(VisError::invalid_param(
            "seed",
            format!("{seed} lies outside the field domain"),
        ));
    }

    let run = |step: fn(&VectorField, DVec2, f64, f64, bool) -> DVec2| {
        std::iter::successors(Some(seed), |&p| Some(step(field, p, step_size, 1.0, false)))
            .take(steps + 1)
            .collect::<Vec<_>>()
    };
    let euler = run(euler_step);
    let rk4 = run(rk4_step);
    let deviation = euler
        .iter()
        .zip(&rk4)
        .map(|(a, b)| a.distance(*b))
        .collect::<Vec<_>>();
    debug!(
        steps,
        step_size,
        final_deviation = deviation.last().copied().unwrap_or(0.0),
        "euler vs rk4"
    );
    Ok(MethodComparison {
        euler,
        rk4,
        deviation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation_grid(n: usize) -> VectorField {
        let c = (n - 1) as f64 / 2.0;
        VectorField::from_fn(n, n, |x, y| DVec2::new(-(y as f64 - c), x as f64 - c)).unwrap()
    }

    #[test]
    fn both_paths_have_steps_plus_one_points() {
        let field = rotation_grid(9);
        let cmp = compare_methods(&field, DVec2::new(6.0, 4.0), 0.1, 30).unwrap();
        assert_eq!(cmp.euler.len(), 31);
        assert_eq!(cmp.rk4.len(), 31);
        assert_eq!(cmp.deviation.len(), 31);
        assert_eq!(cmp.deviation[0], 0.0);
    }

    #[test]
    fn methods_agree_on_uniform_field() {
        let field = VectorField::filled(8, 8, DVec2::new(0.5, 0.25)).unwrap();
        let cmp = compare_methods(&field, DVec2::new(1.0, 1.0), 0.2, 10).unwrap();
        assert!(cmp.max_deviation() < 1e-12);
    }

    #[test]
    fn methods_diverge_on_rotation() {
        let field = rotation_grid(21);
        let cmp = compare_methods(&field, DVec2::new(14.0, 10.0), 0.2, 40).unwrap();
        assert!(cmp.final_deviation() > 0.1, "got {}", cmp.final_deviation());
        assert!(cmp.max_deviation() >= cmp.final_deviation());
    }

    #[test]
    fn rejects_seed_outside_domain_and_bad_step() {
        let field = rotation_grid(5);
        assert!(compare_methods(&field, DVec2::new(5.0, 1.0), 0.1, 3).is_err());
        assert!(compare_methods(&field, DVec2::ONE, 0.0, 3).is_err());
        assert!(compare_methods(&field, DVec2::ONE, 0.1, usize::MAX).is_err());
    }

    #[test]
    fn zero_steps_returns_only_the_seed() {
        let field = rotation_grid(5);
        let cmp = compare_methods(&field, DVec2::ONE, 0.1, 0).unwrap();
        assert_eq!(cmp.euler, vec![DVec2::ONE]);
        assert_eq!(cmp.rk4, vec![DVec2::ONE]);
    }
}
