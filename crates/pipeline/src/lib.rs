#![deny(unsafe_code)]
//! Field registry and image output.
//!
//! Maps field names to analytic sources so the CLI can build vector and
//! scalar grids by name, converts `ColorImage` buffers to RGBA8, and writes
//! PNG snapshots.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use flowvis_core::field_source::{
    CompositeField, CurlField, GaussianBumps, PerlinField, PerlinScalar, Radial, RadialDistance,
    Rotation, Saddle, SaddleProduct, Uniform, Vortex,
};
use flowvis_core::params::{param_f64, param_pair, param_u64};
use flowvis_core::{
    scalar_field, vector_field, CoordinateRange, DVec2, FieldSource, ScalarField, ScalarSource,
    VectorField, VisError,
};
use serde_json::Value;

const VECTOR_FIELD_NAMES: &[&str] = &[
    "rotation", "uniform", "saddle", "radial", "vortex", "vortex-pair", "perlin", "curl",
];

const SCALAR_FIELD_NAMES: &[&str] = &["radial", "saddle", "bumps", "perlin"];

fn center(params: &Value) -> DVec2 {
    let (x, y) = param_pair(params, "center", (0.0, 0.0));
    DVec2::new(x, y)
}

fn noise_seed(params: &Value) -> u32 {
    // Perlin takes a 32-bit seed; wider seeds keep their low bits.
    param_u64(params, "seed", 0) as u32
}

/// Named analytic vector fields.
pub enum VectorFieldKind {
    Rotation(Rotation),
    Uniform(Uniform),
    Saddle(Saddle),
    Radial(Radial),
    Vortex(Vortex),
    VortexPair(CompositeField),
    Perlin(PerlinField),
    Curl(CurlField),
}

impl VectorFieldKind {
    /// Builds a source by name, reading its knobs from `params`.
    ///
    /// Returns `VisError::UnknownField` if the name is not recognized.
    pub fn from_name(name: &str, params: &Value) -> Result<Self, VisError> {
        let strength = param_f64(params, "strength", 1.0);
        let scale = param_f64(params, "scale", 2.0);
        Ok(match name {
            "rotation" => VectorFieldKind::Rotation(Rotation {
                center: center(params),
                strength,
            }),
            "uniform" => {
                let (x, y) = param_pair(params, "velocity", (1.0, 0.0));
                VectorFieldKind::Uniform(Uniform {
                    velocity: DVec2::new(x, y),
                })
            }
            "saddle" => VectorFieldKind::Saddle(Saddle {
                center: center(params),
                strength,
            }),
            "radial" => VectorFieldKind::Radial(Radial {
                center: center(params),
                strength,
            }),
            "vortex" => VectorFieldKind::Vortex(Vortex {
                center: center(params),
                strength,
                radius: param_f64(params, "radius", 0.5),
            }),
            "vortex-pair" => {
                let radius = param_f64(params, "radius", 0.4);
                let offset = DVec2::new(param_f64(params, "separation", 1.0) / 2.0, 0.0);
                VectorFieldKind::VortexPair(
                    CompositeField::new()
                        .add(Box::new(Vortex {
                            center: center(params) - offset,
                            strength,
                            radius,
                        }))
                        .add(Box::new(Vortex {
                            center: center(params) + offset,
                            strength: -strength,
                            radius,
                        })),
                )
            }
            "perlin" => VectorFieldKind::Perlin(PerlinField::new(scale, strength, noise_seed(params))),
            "curl" => VectorFieldKind::Curl(CurlField::new(scale, strength, noise_seed(params))),
            _ => return Err(VisError::UnknownField(name.to_string())),
        })
    }

    pub fn list() -> &'static [&'static str] {
        VECTOR_FIELD_NAMES
    }

    /// Samples the source on a `width x height` grid over `range`.
    pub fn build(
        &self,
        width: usize,
        height: usize,
        range: CoordinateRange,
    ) -> Result<VectorField, VisError> {
        vector_field(self, width, height, range)
    }
}

impl FieldSource for VectorFieldKind {
    fn evaluate(&self, p: DVec2) -> DVec2 {
        match self {
            VectorFieldKind::Rotation(f) => f.evaluate(p),
            VectorFieldKind::Uniform(f) => f.evaluate(p),
            VectorFieldKind::Saddle(f) => f.evaluate(p),
            VectorFieldKind::Radial(f) => f.evaluate(p),
            VectorFieldKind::Vortex(f) => f.evaluate(p),
            VectorFieldKind::VortexPair(f) => f.evaluate(p),
            VectorFieldKind::Perlin(f) => f.evaluate(p),
            VectorFieldKind::Curl(f) => f.evaluate(p),
        }
    }
}

/// Named analytic scalar fields.
pub enum ScalarFieldKind {
    Radial(RadialDistance),
    Saddle(SaddleProduct),
    Bumps(GaussianBumps),
    Perlin(PerlinScalar),
}

impl ScalarFieldKind {
    /// Returns `VisError::UnknownField` if the name is not recognized.
    pub fn from_name(name: &str, params: &Value) -> Result<Self, VisError> {
        Ok(match name {
            "radial" => ScalarFieldKind::Radial(RadialDistance {
                center: center(params),
            }),
            "saddle" => ScalarFieldKind::Saddle(SaddleProduct),
            "bumps" => {
                let sigma = param_f64(params, "sigma", 0.3);
                ScalarFieldKind::Bumps(
                    GaussianBumps::new()
                        .with_bump(DVec2::new(-0.4, -0.3), 1.0, sigma)
                        .with_bump(DVec2::new(0.45, 0.2), 0.8, sigma)
                        .with_bump(DVec2::new(0.0, 0.55), -0.6, sigma),
                )
            }
            "perlin" => ScalarFieldKind::Perlin(PerlinScalar::new(
                param_f64(params, "scale", 2.0),
                noise_seed(params),
            )),
            _ => return Err(VisError::UnknownField(name.to_string())),
        })
    }

    pub fn list() -> &'static [&'static str] {
        SCALAR_FIELD_NAMES
    }

    pub fn build(
        &self,
        width: usize,
        height: usize,
        range: CoordinateRange,
    ) -> Result<ScalarField, VisError> {
        scalar_field(self, width, height, range)
    }
}

impl ScalarSource for ScalarFieldKind {
    fn evaluate(&self, p: DVec2) -> f64 {
        match self {
            ScalarFieldKind::Radial(f) => f.evaluate(p),
            ScalarFieldKind::Saddle(f) => f.evaluate(p),
            ScalarFieldKind::Bumps(f) => f.evaluate(p),
            ScalarFieldKind::Perlin(f) => f.evaluate(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_listed_vector_field_builds() {
        for name in VectorFieldKind::list() {
            let kind = VectorFieldKind::from_name(name, &json!({})).unwrap();
            let field = kind.build(8, 6, CoordinateRange::default()).unwrap();
            assert_eq!(field.dims(), (8, 6), "{name}");
        }
    }

    #[test]
    fn every_listed_scalar_field_builds() {
        for name in ScalarFieldKind::list() {
            let kind = ScalarFieldKind::from_name(name, &json!({})).unwrap();
            let field = kind.build(5, 5, CoordinateRange::default()).unwrap();
            assert_eq!(field.dims(), (5, 5), "{name}");
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            VectorFieldKind::from_name("tornado", &json!({})),
            Err(VisError::UnknownField(_))
        ));
        assert!(matches!(
            ScalarFieldKind::from_name("tornado", &json!({})),
            Err(VisError::UnknownField(_))
        ));
    }

    #[test]
    fn default_rotation_is_minus_y_x() {
        let kind = VectorFieldKind::from_name("rotation", &json!({})).unwrap();
        let field = kind.build(16, 16, CoordinateRange::default()).unwrap();
        // Node (15, 0) sits at (1, -1).
        let v = field.get(15, 0);
        assert!((v - DVec2::new(1.0, 1.0)).length() < 1e-12, "{v}");
    }

    #[test]
    fn params_reach_the_source() {
        let kind = VectorFieldKind::from_name("uniform", &json!({"velocity": [0.0, 2.0]})).unwrap();
        assert_eq!(kind.evaluate(DVec2::new(0.3, 0.7)), DVec2::new(0.0, 2.0));
    }

    #[test]
    fn noise_fields_are_deterministic_per_seed() {
        let a = VectorFieldKind::from_name("curl", &json!({"seed": 7})).unwrap();
        let b = VectorFieldKind::from_name("curl", &json!({"seed": 7})).unwrap();
        let p = DVec2::new(0.31, -0.42);
        assert_eq!(a.evaluate(p), b.evaluate(p));
    }
}
