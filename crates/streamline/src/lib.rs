#![deny(unsafe_code)]
//! Streamline integration over 2D vector fields.
//!
//! Euler and RK4 step rules, an [`Integrator`] with five stopping policies
//! and an iteration cap, seeding strategies for many streamlines, an
//! Euler/RK4 comparison, and the plot-space transform used to emit
//! normalized polylines.

pub mod comparison;
pub mod integrator;
pub mod plot;
pub mod seeding;

pub use comparison::{compare_methods, MethodComparison};
pub use integrator::{
    euler_step, rk4_step, Bounds, Direction, Integrator, IntegratorConfig, Method, StopCondition,
    StopKind, Termination, Trajectory,
};
pub use plot::PlotTransform;
pub use seeding::{grid_seeds, magnitude_weighted_seeds, random_seeds};
