#![deny(unsafe_code)]
//! Core types for the flowvis visualization toolkit.
//!
//! Provides the `VisError` type, the generic `Grid` container with its
//! `ScalarField` / `VectorField` / `ColorImage` aliases, bilinear sampling,
//! analytic field sources, noise textures, transfer functions, the
//! `Xorshift64` PRNG, and JSON parameter helpers.

pub mod error;
pub mod field_source;
pub mod grid;
pub mod params;
pub mod prng;
pub mod sampler;
pub mod texture;
pub mod transfer;

pub use error::VisError;
pub use field_source::{scalar_field, vector_field, CoordinateRange, FieldSource, ScalarSource};
pub use grid::{ColorImage, Grid, ScalarField, VectorField};
pub use prng::Xorshift64;
pub use sampler::sample;
pub use texture::{noise_texture, solid_gray};
pub use transfer::{parse_hex, ColorStop, TransferFunction};

pub use glam::{DVec2, DVec4};
