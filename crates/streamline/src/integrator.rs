//! Streamline integration through a sampled vector field.
//!
//! [`euler_step`] and [`rk4_step`] advance one position; an [`Integrator`]
//! repeats them from a seed until its [`StopCondition`] fires and records
//! why it stopped in the returned [`Trajectory`].
//!
//! Positions are in grid-index space: `(0, 0)` is the first sample and
//! `(width-1, height-1)` the last.

use std::fmt;
use std::str::FromStr;

use flowvis_core::params::{param_bool, param_choice, param_f64, param_usize};
use flowvis_core::{sample, VectorField, VisError};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Lower bound on the vector length used when normalizing for constant speed.
pub const NORMALIZE_FLOOR: f64 = 1e-16;

/// Steps shorter than this count as coincident points and end the trajectory.
pub const COINCIDENT_EPS: f64 = 1e-6;

const SPEED_EPS: f64 = 1e-16;

pub const DEFAULT_STEP_SIZE: f64 = 0.1;
pub const DEFAULT_STEPS: usize = 100;
pub const DEFAULT_ARC_LENGTH: f64 = 10.0;
pub const DEFAULT_MIN_SPEED: f64 = 0.01;
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Largest step count the `Steps` policy accepts.
pub const MAX_STEPS: usize = 10_000_000;

// ---------------------------------------------------------------------------
// Step rules
// ---------------------------------------------------------------------------

fn maybe_normalize(v: DVec2, constant_speed: bool) -> DVec2 {
    if constant_speed {
        v / v.length().max(NORMALIZE_FLOOR)
    } else {
        v
    }
}

/// One explicit Euler step: `pos + direction * v(pos) * step_size`.
///
/// With `constant_speed` the velocity is normalized first so every step
/// covers `step_size` (unless the field vanishes).
pub fn euler_step(
    field: &VectorField,
    pos: DVec2,
    step_size: f64,
    direction: f64,
    constant_speed: bool,
) -> DVec2 {
    let v = sample(field, pos) * direction;
    pos + maybe_normalize(v, constant_speed) * step_size
}

/// One classic fourth-order Runge-Kutta step.
///
/// Normalization for constant speed applies to the combined slope, not to
/// the individual stages.
pub fn rk4_step(
    field: &VectorField,
    pos: DVec2,
    step_size: f64,
    direction: f64,
    constant_speed: bool,
) -> DVec2 {
    let h = step_size;
    let f = |p: DVec2| sample(field, p) * direction;
    let k1 = f(pos);
    let k2 = f(pos + k1 * (h * 0.5));
    let k3 = f(pos + k2 * (h * 0.5));
    let k4 = f(pos + k3 * h);
    let slope = (k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0;
    pos + maybe_normalize(slope, constant_speed) * h
}

// ---------------------------------------------------------------------------
// Configuration enums
// ---------------------------------------------------------------------------

/// Integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Euler,
    #[default]
    Rk4,
}

impl Method {
    pub fn step(
        self,
        field: &VectorField,
        pos: DVec2,
        step_size: f64,
        direction: f64,
        constant_speed: bool,
    ) -> DVec2 {
        match self {
            Method::Euler => euler_step(field, pos, step_size, direction, constant_speed),
            Method::Rk4 => rk4_step(field, pos, step_size, direction, constant_speed),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Euler => "euler",
            Method::Rk4 => "rk4",
        }
    }
}

impl FromStr for Method {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self, VisError> {
        match s {
            "euler" => Ok(Method::Euler),
            "rk4" => Ok(Method::Rk4),
            other => Err(VisError::invalid_param(
                "method",
                format!("expected 'euler' or 'rk4', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of travel along the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// `+1.0` for forward, `-1.0` for backward.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl FromStr for Direction {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self, VisError> {
        match s {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            other => Err(VisError::invalid_param(
                "direction",
                format!("expected 'forward' or 'backward', got '{other}'"),
            )),
        }
    }
}

/// Which stopping policy a config selects; the policy's parameter lives in
/// the matching config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    #[default]
    Steps,
    ArcLength,
    Boundary,
    Zeroes,
    Slow,
}

impl FromStr for StopKind {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self, VisError> {
        match s {
            "steps" => Ok(StopKind::Steps),
            "arc_length" => Ok(StopKind::ArcLength),
            "boundary" => Ok(StopKind::Boundary),
            "zeroes" => Ok(StopKind::Zeroes),
            "slow" => Ok(StopKind::Slow),
            other => Err(VisError::invalid_param(
                "stop",
                format!("unknown stopping policy '{other}'"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Stopping policies
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle, inclusive on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// The sampling domain of `field`: `[0, width-1] x [0, height-1]`.
    pub fn of_field(field: &VectorField) -> Self {
        Self {
            min: DVec2::ZERO,
            max: field.domain_max(),
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// When to stop extending a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// Exactly `n` steps.
    Steps(usize),
    /// Until the travelled distance reaches the target.
    ArcLength(f64),
    /// Until the current position leaves the rectangle.
    Boundary(Bounds),
    /// Until a step stops moving the position.
    Zeroes,
    /// Until the per-step speed drops below `min_speed`.
    Slow { min_speed: f64 },
}

/// Why a trajectory ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    SeedOutsideDomain,
    StepCount,
    ArcLength,
    LeftBoundary,
    Stagnated,
    TooSlow,
    IterationLimit,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::SeedOutsideDomain => "seed_outside_domain",
            Termination::StepCount => "step_count",
            Termination::ArcLength => "arc_length",
            Termination::LeftBoundary => "left_boundary",
            Termination::Stagnated => "stagnated",
            Termination::TooSlow => "too_slow",
            Termination::IterationLimit => "iteration_limit",
        }
    }
}

/// Ordered positions from the seed outward, plus the reason tracing stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<DVec2>,
    termination: Termination,
}

impl Trajectory {
    fn seed_outside() -> Self {
        Self {
            points: Vec::new(),
            termination: Termination::SeedOutsideDomain,
        }
    }

    /// Positions; the first one (if any) is the seed.
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn into_points(self) -> Vec<DVec2> {
        self.points
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of distances between consecutive points.
    pub fn arc_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Knobs for an [`Integrator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    pub method: Method,
    pub direction: Direction,
    pub step_size: f64,
    /// Normalize the field so every step has length `step_size`.
    pub constant_speed: bool,
    pub stop: StopKind,
    pub steps: usize,
    pub arc_length: f64,
    pub min_speed: f64,
    /// Rectangle for [`StopKind::Boundary`]; `None` means the field domain.
    pub bounds: Option<Bounds>,
    /// Cap on the number of steps for every policy except `Steps`.
    pub max_iterations: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            direction: Direction::default(),
            step_size: DEFAULT_STEP_SIZE,
            constant_speed: false,
            stop: StopKind::default(),
            steps: DEFAULT_STEPS,
            arc_length: DEFAULT_ARC_LENGTH,
            min_speed: DEFAULT_MIN_SPEED,
            bounds: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl IntegratorConfig {
    /// Reads the config from a JSON object, using defaults for missing keys.
    ///
    /// Fails only on unrecognized enum strings; range checks happen in
    /// [`Integrator::new`].
    pub fn from_json(params: &Value) -> Result<Self, VisError> {
        let defaults = Self::default();
        Ok(Self {
            method: param_choice(params, "method", defaults.method)?,
            direction: param_choice(params, "direction", defaults.direction)?,
            step_size: param_f64(params, "step_size", defaults.step_size),
            constant_speed: param_bool(params, "constant_speed", defaults.constant_speed),
            stop: param_choice(params, "stop", defaults.stop)?,
            steps: param_usize(params, "steps", defaults.steps),
            arc_length: param_f64(params, "arc_length", defaults.arc_length),
            min_speed: param_f64(params, "min_speed", defaults.min_speed),
            bounds: None,
            max_iterations: param_usize(params, "max_iterations", defaults.max_iterations),
        })
    }

    pub fn param_schema() -> Value {
        json!({
            "method": {
                "type": "string",
                "default": "rk4",
                "options": ["euler", "rk4"],
                "description": "Integration scheme"
            },
            "direction": {
                "type": "string",
                "default": "forward",
                "options": ["forward", "backward"],
                "description": "Follow the field or its negation"
            },
            "step_size": {
                "type": "number",
                "default": DEFAULT_STEP_SIZE,
                "min": 0.0,
                "description": "Step length in grid units (exclusive minimum)"
            },
            "constant_speed": {
                "type": "boolean",
                "default": false,
                "description": "Normalize the field so each step has length step_size"
            },
            "stop": {
                "type": "string",
                "default": "steps",
                "options": ["steps", "arc_length", "boundary", "zeroes", "slow"],
                "description": "Stopping policy"
            },
            "steps": {
                "type": "integer",
                "default": DEFAULT_STEPS,
                "min": 0,
                "max": MAX_STEPS,
                "description": "Number of steps for the 'steps' policy"
            },
            "arc_length": {
                "type": "number",
                "default": DEFAULT_ARC_LENGTH,
                "min": 0.0,
                "description": "Target travelled distance for the 'arc_length' policy"
            },
            "min_speed": {
                "type": "number",
                "default": DEFAULT_MIN_SPEED,
                "min": 0.0,
                "description": "Speed threshold for the 'slow' policy"
            },
            "max_iterations": {
                "type": "integer",
                "default": DEFAULT_MAX_ITERATIONS,
                "min": 1,
                "description": "Step cap for every policy except 'steps'"
            }
        })
    }

    fn validate(&self) -> Result<(), VisError> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(VisError::invalid_param(
                "step_size",
                format!("must be finite and positive, got {}", self.step_size),
            ));
        }
        if !(self.arc_length.is_finite() && self.arc_length >= 0.0) {
            return Err(VisError::invalid_param(
                "arc_length",
                format!("must be finite and non-negative, got {}", self.arc_length),
            ));
        }
        if !(self.min_speed.is_finite() && self.min_speed >= 0.0) {
            return Err(VisError::invalid_param(
                "min_speed",
                format!("must be finite and non-negative, got {}", self.min_speed),
            ));
        }
        if self.steps > MAX_STEPS {
            return Err(VisError::invalid_param(
                "steps",
                format!("must not exceed {MAX_STEPS}, got {}", self.steps),
            ));
        }
        if self.max_iterations == 0 {
            return Err(VisError::invalid_param("max_iterations", "must be at least 1"));
        }
        if let Some(b) = self.bounds {
            if !(b.min.is_finite() && b.max.is_finite()) || b.min.x > b.max.x || b.min.y > b.max.y
            {
                return Err(VisError::invalid_param(
                    "bounds",
                    format!("min {} must not exceed max {}", b.min, b.max),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Integrator
// ---------------------------------------------------------------------------

/// Traces trajectories through one field with one validated config.
#[derive(Debug, Clone)]
pub struct Integrator<'a> {
    field: &'a VectorField,
    config: IntegratorConfig,
    stop: StopCondition,
}

impl<'a> Integrator<'a> {
    /// Validates the field (at least 2x2) and the config once, so tracing
    /// itself never fails.
    pub fn new(field: &'a VectorField, config: IntegratorConfig) -> Result<Self, VisError> {
        field.ensure_interpolable()?;
        config.validate()?;
        let stop = match config.stop {
            StopKind::Steps => StopCondition::Steps(config.steps),
            StopKind::ArcLength => StopCondition::ArcLength(config.arc_length),
            StopKind::Boundary => {
                StopCondition::Boundary(config.bounds.unwrap_or_else(|| Bounds::of_field(field)))
            }
            StopKind::Zeroes => StopCondition::Zeroes,
            StopKind::Slow => StopCondition::Slow {
                min_speed: config.min_speed,
            },
        };
        debug!(
            method = %config.method,
            step_size = config.step_size,
            constant_speed = config.constant_speed,
            ?stop,
            "integrator ready"
        );
        Ok(Self {
            field,
            config,
            stop,
        })
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn stop_condition(&self) -> StopCondition {
        self.stop
    }

    pub fn field(&self) -> &'a VectorField {
        self.field
    }

    /// Traces from `seed` in the configured direction.
    pub fn trace(&self, seed: DVec2) -> Trajectory {
        self.trace_in(seed, self.config.direction)
    }

    /// Traces from `seed` in both directions: `(backward, forward)`.
    ///
    /// Both trajectories start with the seed itself.
    pub fn trace_bidirectional(&self, seed: DVec2) -> (Trajectory, Trajectory) {
        (
            self.trace_in(seed, Direction::Backward),
            self.trace_in(seed, Direction::Forward),
        )
    }

    /// Traces from `seed` in an explicit direction.
    ///
    /// A seed outside the field domain yields an empty trajectory.
    pub fn trace_in(&self, seed: DVec2, direction: Direction) -> Trajectory {
        if !self.field.contains(seed) {
            return Trajectory::seed_outside();
        }
        let sign = direction.sign();
        let step = |p: DVec2| {
            self.config.method.step(
                self.field,
                p,
                self.config.step_size,
                sign,
                self.config.constant_speed,
            )
        };

        let mut points = vec![seed];
        if let StopCondition::Steps(n) = self.stop {
            let mut pos = seed;
            points.reserve(n);
            for _ in 0..n {
                pos = step(pos);
                points.push(pos);
            }
            return Trajectory {
                points,
                termination: Termination::StepCount,
            };
        }

        let mut pos = seed;
        let mut travelled = 0.0;
        for _ in 0..self.config.max_iterations {
            let next = step(pos);
            let moved = next.distance(pos);
            let verdict = match self.stop {
                StopCondition::Boundary(bounds) if !bounds.contains(pos) => {
                    Some(Termination::LeftBoundary)
                }
                StopCondition::Slow { min_speed } => {
                    (moved / self.config.step_size < min_speed + SPEED_EPS)
                        .then_some(Termination::TooSlow)
                }
                _ if moved < COINCIDENT_EPS => Some(Termination::Stagnated),
                _ => None,
            };
            if let Some(termination) = verdict {
                return Trajectory {
                    points,
                    termination,
                };
            }
            points.push(next);
            pos = next;
            if let StopCondition::ArcLength(target) = self.stop {
                travelled += moved;
                if travelled >= target {
                    return Trajectory {
                        points,
                        termination: Termination::ArcLength,
                    };
                }
            }
        }

        debug!(
            seed = %seed,
            max_iterations = self.config.max_iterations,
            stop = ?self.stop,
            "trajectory hit the iteration cap"
        );
        Trajectory {
            points,
            termination: Termination::IterationLimit,
        }
    }
}
