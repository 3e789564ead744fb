//! Analytic field sources and the grid builders that sample them.
//!
//! A [`FieldSource`] produces a 2D vector at any point of a continuous
//! coordinate plane; a [`ScalarSource`] produces a scalar. [`vector_field`]
//! and [`scalar_field`] sample a source over a [`CoordinateRange`] to build
//! the regular grids consumed by the integrator, LIC and contouring stages.
//!
//! All implementations are deterministic: same inputs produce the same output.

use glam::DVec2;
use noise::{NoiseFn, Perlin};

use crate::error::VisError;
use crate::grid::{ScalarField, VectorField};

/// A source of 2D vector values over the continuous plane.
pub trait FieldSource: Send + Sync {
    /// Evaluate the field at `p`.
    fn evaluate(&self, p: DVec2) -> DVec2;
}

/// A source of scalar values over the continuous plane.
pub trait ScalarSource: Send + Sync {
    /// Evaluate the scalar at `p`.
    fn evaluate(&self, p: DVec2) -> f64;
}

/// Distances below this are treated as zero.
const SINGULARITY_EPS: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Vector sources
// ---------------------------------------------------------------------------

/// Rigid rotation `(-y, x) * strength` around `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub center: DVec2,
    pub strength: f64,
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            center: DVec2::ZERO,
            strength: 1.0,
        }
    }
}

/// The same vector everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    pub velocity: DVec2,
}

/// Hyperbolic saddle `(x, -y)` around `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saddle {
    pub center: DVec2,
    pub strength: f64,
}

/// Radial flow away from `center` (positive strength) or toward it (negative).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radial {
    pub center: DVec2,
    pub strength: f64,
}

/// Rotational vortex with Gaussian distance falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vortex {
    pub center: DVec2,
    pub strength: f64,
    pub radius: f64,
}

/// Perlin noise field producing vectors from two offset noise samples.
pub struct PerlinField {
    noise: Perlin,
    scale: f64,
    strength: f64,
}

/// Curl of a scalar Perlin noise: approximately divergence-free flow.
pub struct CurlField {
    noise: Perlin,
    scale: f64,
    strength: f64,
    eps: f64,
}

/// Sums the vectors of multiple [`FieldSource`] objects.
pub struct CompositeField {
    sources: Vec<Box<dyn FieldSource>>,
}

impl PerlinField {
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            strength,
        }
    }
}

impl CurlField {
    /// Creates a curl noise source with a finite-difference epsilon of 0.001.
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            strength,
            eps: 0.001,
        }
    }
}

impl CompositeField {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a source to the composite (builder pattern).
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, source: Box<dyn FieldSource>) -> Self {
        self.sources.push(source);
        self
    }
}

impl Default for CompositeField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSource for Rotation {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        (p - self.center).perp() * self.strength
    }
}

impl FieldSource for Uniform {
    fn evaluate(&self, _p: DVec2) -> DVec2 {
        self.velocity
    }
}

impl FieldSource for Saddle {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        let r = p - self.center;
        DVec2::new(r.x, -r.y) * self.strength
    }
}

impl FieldSource for Radial {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        (p - self.center) * self.strength
    }
}

impl FieldSource for Vortex {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        let r = p - self.center;
        let dist = r.length();
        if dist < SINGULARITY_EPS || self.radius.abs() < SINGULARITY_EPS {
            return DVec2::ZERO;
        }
        let falloff = (-(dist * dist) / (2.0 * self.radius * self.radius)).exp();
        r.perp() / dist * self.strength * falloff
    }
}

impl FieldSource for PerlinField {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        let s = p * self.scale;
        DVec2::new(
            self.noise.get([s.x, s.y]),
            self.noise.get([s.x + 100.0, s.y + 100.0]),
        ) * self.strength
    }
}

impl FieldSource for CurlField {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        let s = p * self.scale;
        let eps = self.eps * self.scale;
        if eps.abs() < SINGULARITY_EPS {
            return DVec2::ZERO;
        }
        // curl of scalar F: (dF/dy, -dF/dx)
        let df_dy =
            (self.noise.get([s.x, s.y + eps]) - self.noise.get([s.x, s.y - eps])) / (2.0 * eps);
        let df_dx =
            (self.noise.get([s.x + eps, s.y]) - self.noise.get([s.x - eps, s.y])) / (2.0 * eps);
        DVec2::new(df_dy, -df_dx) * self.strength
    }
}

impl FieldSource for CompositeField {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        self.sources
            .iter()
            .fold(DVec2::ZERO, |acc, source| acc + source.evaluate(p))
    }
}

// ---------------------------------------------------------------------------
// Scalar sources
// ---------------------------------------------------------------------------

/// Euclidean distance from `center`; iso lines are circles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadialDistance {
    pub center: DVec2,
}

/// `x * y`: the canonical saddle for exercising ambiguous cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SaddleProduct;

/// Sum of isotropic Gaussian bumps `(center, amplitude, sigma)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GaussianBumps {
    bumps: Vec<(DVec2, f64, f64)>,
}

impl GaussianBumps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one bump (builder pattern). Non-positive `sigma` contributes nothing.
    pub fn with_bump(mut self, center: DVec2, amplitude: f64, sigma: f64) -> Self {
        self.bumps.push((center, amplitude, sigma));
        self
    }
}

/// Perlin noise as a scalar.
pub struct PerlinScalar {
    noise: Perlin,
    scale: f64,
}

impl PerlinScalar {
    pub fn new(scale: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
        }
    }
}

impl ScalarSource for RadialDistance {
    fn evaluate(&self, p: DVec2) -> f64 {
        p.distance(self.center)
    }
}

impl ScalarSource for SaddleProduct {
    fn evaluate(&self, p: DVec2) -> f64 {
        p.x * p.y
    }
}

impl ScalarSource for GaussianBumps {
    fn evaluate(&self, p: DVec2) -> f64 {
        self.bumps
            .iter()
            .filter(|(_, _, sigma)| *sigma > SINGULARITY_EPS)
            .map(|&(c, amp, sigma)| amp * (-p.distance_squared(c) / (2.0 * sigma * sigma)).exp())
            .sum()
    }
}

impl ScalarSource for PerlinScalar {
    fn evaluate(&self, p: DVec2) -> f64 {
        let s = p * self.scale;
        self.noise.get([s.x, s.y])
    }
}

// ---------------------------------------------------------------------------
// Grid builders
// ---------------------------------------------------------------------------

/// Continuous coordinate rectangle mapped onto grid samples.
///
/// Sample `i` along an axis lands at `min + i / (n - 1) * (max - min)`, so
/// the first and last samples hit the rectangle edges exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRange {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for CoordinateRange {
    fn default() -> Self {
        Self {
            min: DVec2::splat(-1.0),
            max: DVec2::splat(1.0),
        }
    }
}

impl CoordinateRange {
    pub fn new(min: DVec2, max: DVec2) -> Result<Self, VisError> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(VisError::invalid_param("range", "bounds must be finite"));
        }
        if min.x >= max.x || min.y >= max.y {
            return Err(VisError::invalid_param(
                "range",
                format!("min {min} must be below max {max} on both axes"),
            ));
        }
        Ok(Self { min, max })
    }

    /// Coordinate of grid sample `(i, j)` in a `width x height` grid.
    pub fn coordinate(&self, i: usize, j: usize, width: usize, height: usize) -> DVec2 {
        let t = DVec2::new(axis_fraction(i, width), axis_fraction(j, height));
        self.min + t * (self.max - self.min)
    }
}

fn axis_fraction(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

/// Samples a vector source onto a `width x height` grid.
pub fn vector_field(
    source: &dyn FieldSource,
    width: usize,
    height: usize,
    range: CoordinateRange,
) -> Result<VectorField, VisError> {
    VectorField::from_fn(width, height, |i, j| {
        source.evaluate(range.coordinate(i, j, width, height))
    })
}

/// Samples a scalar source onto a `width x height` grid.
pub fn scalar_field(
    source: &dyn ScalarSource,
    width: usize,
    height: usize,
    range: CoordinateRange,
) -> Result<ScalarField, VisError> {
    ScalarField::from_fn(width, height, |i, j| {
        source.evaluate(range.coordinate(i, j, width, height))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-12
    }

    // -- Vector sources --

    #[test]
    fn rotation_matches_minus_y_x() {
        let rot = Rotation::default();
        assert!(close(rot.evaluate(DVec2::new(2.0, 3.0)), DVec2::new(-3.0, 2.0)));
    }

    #[test]
    fn rotation_is_perpendicular_to_radius() {
        let rot = Rotation {
            center: DVec2::new(1.0, 1.0),
            strength: 2.5,
        };
        let p = DVec2::new(4.0, -2.0);
        assert!(rot.evaluate(p).dot(p - rot.center).abs() < 1e-12);
    }

    #[test]
    fn saddle_expands_x_and_contracts_y() {
        let s = Saddle {
            center: DVec2::ZERO,
            strength: 1.0,
        };
        assert!(close(s.evaluate(DVec2::new(2.0, 3.0)), DVec2::new(2.0, -3.0)));
    }

    #[test]
    fn radial_sink_points_toward_center() {
        let sink = Radial {
            center: DVec2::ZERO,
            strength: -1.0,
        };
        let v = sink.evaluate(DVec2::new(1.0, 0.0));
        assert!(v.x < 0.0 && v.y.abs() < 1e-12);
    }

    #[test]
    fn vortex_at_center_returns_zero() {
        let v = Vortex {
            center: DVec2::new(3.0, 3.0),
            strength: 1.0,
            radius: 2.0,
        };
        assert_eq!(v.evaluate(DVec2::new(3.0, 3.0)), DVec2::ZERO);
    }

    #[test]
    fn vortex_zero_radius_returns_zero() {
        let v = Vortex {
            center: DVec2::ZERO,
            strength: 1.0,
            radius: 0.0,
        };
        assert_eq!(v.evaluate(DVec2::new(1.0, 1.0)), DVec2::ZERO);
    }

    #[test]
    fn vortex_falls_off_with_distance() {
        let v = Vortex {
            center: DVec2::ZERO,
            strength: 1.0,
            radius: 1.0,
        };
        let near = v.evaluate(DVec2::new(0.5, 0.0)).length();
        let far = v.evaluate(DVec2::new(3.0, 0.0)).length();
        assert!(near > far, "near {near} should exceed far {far}");
    }

    #[test]
    fn curl_field_approximately_divergence_free() {
        let curl = CurlField::new(1.5, 1.0, 7);
        let h = 1e-4;
        let p = DVec2::new(0.37, -0.81);
        let div = (curl.evaluate(p + DVec2::X * h).x - curl.evaluate(p - DVec2::X * h).x
            + curl.evaluate(p + DVec2::Y * h).y
            - curl.evaluate(p - DVec2::Y * h).y)
            / (2.0 * h);
        assert!(div.abs() < 1e-2, "divergence {div} too large");
    }

    #[test]
    fn empty_composite_returns_zero() {
        assert_eq!(CompositeField::new().evaluate(DVec2::ONE), DVec2::ZERO);
    }

    #[test]
    fn composite_sums_sources() {
        let composite = CompositeField::new()
            .add(Box::new(Rotation::default()))
            .add(Box::new(Uniform {
                velocity: DVec2::new(1.0, 0.0),
            }));
        assert!(close(
            composite.evaluate(DVec2::new(0.0, 1.0)),
            DVec2::new(0.0, 0.0)
        ));
    }

    // -- Scalar sources --

    #[test]
    fn radial_distance_is_euclidean() {
        let r = RadialDistance { center: DVec2::ZERO };
        assert!((r.evaluate(DVec2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn gaussian_bump_peaks_at_center() {
        let bumps = GaussianBumps::new().with_bump(DVec2::ZERO, 2.0, 0.5);
        assert!((bumps.evaluate(DVec2::ZERO) - 2.0).abs() < 1e-12);
        assert!(bumps.evaluate(DVec2::new(1.0, 0.0)) < 2.0);
    }

    #[test]
    fn gaussian_bump_ignores_degenerate_sigma() {
        let bumps = GaussianBumps::new().with_bump(DVec2::ZERO, 2.0, 0.0);
        assert_eq!(bumps.evaluate(DVec2::ZERO), 0.0);
    }

    // -- Grid builders --

    #[test]
    fn default_range_is_unit_square_around_origin() {
        let range = CoordinateRange::default();
        assert_eq!(range.coordinate(0, 0, 16, 16), DVec2::splat(-1.0));
        assert_eq!(range.coordinate(15, 15, 16, 16), DVec2::splat(1.0));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(CoordinateRange::new(DVec2::ONE, DVec2::ZERO).is_err());
        assert!(CoordinateRange::new(DVec2::ZERO, DVec2::new(f64::INFINITY, 1.0)).is_err());
    }

    #[test]
    fn vector_field_samples_rotation_at_corners() {
        let grid = vector_field(&Rotation::default(), 16, 16, CoordinateRange::default()).unwrap();
        assert!(close(grid.get(0, 0), DVec2::new(1.0, -1.0)));
        assert!(close(grid.get(15, 0), DVec2::new(1.0, 1.0)));
        assert!(close(grid.get(15, 15), DVec2::new(-1.0, 1.0)));
    }

    #[test]
    fn scalar_field_samples_saddle_product() {
        let grid = scalar_field(&SaddleProduct, 3, 3, CoordinateRange::default()).unwrap();
        assert_eq!(grid.get(0, 0), 1.0);
        assert_eq!(grid.get(1, 1), 0.0);
        assert_eq!(grid.get(2, 0), -1.0);
    }

    #[test]
    fn builders_reject_zero_dimensions() {
        assert!(vector_field(&Rotation::default(), 0, 4, CoordinateRange::default()).is_err());
        assert!(scalar_field(&SaddleProduct, 4, 0, CoordinateRange::default()).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_point() -> impl Strategy<Value = DVec2> {
            (-1e3_f64..1e3, -1e3_f64..1e3).prop_map(|(x, y)| DVec2::new(x, y))
        }

        proptest! {
            #[test]
            fn all_sources_return_finite_values(p in any_point()) {
                let sources: Vec<Box<dyn FieldSource>> = vec![
                    Box::new(Rotation::default()),
                    Box::new(Saddle { center: DVec2::ZERO, strength: 1.0 }),
                    Box::new(Radial { center: DVec2::ZERO, strength: 1.0 }),
                    Box::new(Vortex { center: DVec2::ZERO, strength: 1.0, radius: 5.0 }),
                    Box::new(PerlinField::new(0.1, 1.0, 42)),
                    Box::new(CurlField::new(0.1, 1.0, 42)),
                ];
                for source in &sources {
                    prop_assert!(source.evaluate(p).is_finite());
                }
            }

            #[test]
            fn perlin_is_deterministic(p in any_point(), seed: u32) {
                let a = PerlinField::new(0.05, 1.0, seed);
                let b = PerlinField::new(0.05, 1.0, seed);
                prop_assert_eq!(a.evaluate(p), b.evaluate(p));
            }
        }
    }
}
