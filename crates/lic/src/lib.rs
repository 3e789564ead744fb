#![deny(unsafe_code)]
//! Line integral convolution over 2D vector fields.
//!
//! [`standard_lic`] convolves a texture along one streamline per pixel with
//! a [`Kernel`]; [`fast_lic`] reuses long streamlines across every pixel
//! they cross. [`render`] picks one from a [`LicConfig`] and optionally
//! applies [`ContrastEnhancement`].

pub mod config;
pub mod contrast;
pub mod fast;
pub mod kernel;
pub mod mapping;
pub mod render;
pub mod standard;

pub use config::{Algorithm, LicConfig};
pub use contrast::{channel_stats, ChannelStats, ContrastEnhancement};
pub use fast::{fast_lic, fast_lic_with_stats, FastLicStats, SlidingBox, VisitedMask};
pub use kernel::Kernel;
pub use mapping::PixelMapping;
pub use render::render;
pub use standard::standard_lic;
