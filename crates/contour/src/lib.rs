#![deny(unsafe_code)]
//! Marching squares isocontours over scalar fields.
//!
//! Cells are classified against the iso-value and emit zero, one or two
//! segments. Saddle cells are resolved by an explicit [`Decider`]. Segments
//! come out in normalized plot space, `[0, 1]` on both axes.

pub mod cell;
pub mod config;
pub mod extract;
pub mod levels;

pub use cell::{cell_segments, Cell, Decider, Edge, EdgePairs, Segment};
pub use config::ContourConfig;
pub use extract::{compare_deciders, extract, grid_lines, DeciderComparison};
pub use levels::{contour, contour_both_deciders, iso_values, resolve_levels, IsoLevels, Isoline};
