//! Whole-field marching squares.
//!
//! Output points are in normalized plot space: node `(x, y)` maps to
//! `(x / (width - 1), y / (height - 1))`.

use flowvis_core::{ScalarField, VisError};
use glam::DVec2;
use tracing::debug;

use crate::cell::{Cell, Decider, Segment};

fn plot_scale(width: usize, height: usize) -> DVec2 {
    DVec2::new((width - 1) as f64, (height - 1) as f64)
}

/// Iso-line segments of `field` at value `c`.
pub fn extract(field: &ScalarField, c: f64, decider: Decider) -> Result<Vec<Segment>, VisError> {
    field.ensure_interpolable()?;
    if !c.is_finite() {
        return Err(VisError::invalid_param(
            "iso_value",
            format!("must be finite, got {c}"),
        ));
    }
    let (width, height) = field.dims();
    let scale = plot_scale(width, height);

    let mut segments = Vec::new();
    for j in 0..height - 1 {
        for i in 0..width - 1 {
            let cell = Cell::new(
                field.get(i, j),
                field.get(i + 1, j),
                field.get(i, j + 1),
                field.get(i + 1, j + 1),
            );
            let origin = DVec2::new(i as f64, j as f64);
            segments.extend(
                cell.segments(c, decider)
                    .map(|s| s.map(|p| (origin + p) / scale)),
            );
        }
    }
    debug!(
        iso_value = c,
        decider = decider.as_str(),
        segments = segments.len(),
        "marching squares"
    );
    Ok(segments)
}

/// The same iso-value extracted once per decider.
#[derive(Debug, Clone, PartialEq)]
pub struct DeciderComparison {
    pub midpoint: Vec<Segment>,
    pub asymptotic: Vec<Segment>,
}

impl DeciderComparison {
    /// Whether both deciders produced the same segments.
    pub fn agree(&self) -> bool {
        self.midpoint == self.asymptotic
    }
}

pub fn compare_deciders(field: &ScalarField, c: f64) -> Result<DeciderComparison, VisError> {
    Ok(DeciderComparison {
        midpoint: extract(field, c, Decider::Midpoint)?,
        asymptotic: extract(field, c, Decider::Asymptotic)?,
    })
}

/// The cell grid of a `width x height` field as unit-length segments in
/// normalized plot space: rows first, then columns.
pub fn grid_lines(width: usize, height: usize) -> Result<Vec<Segment>, VisError> {
    if width < 2 || height < 2 {
        return Err(VisError::InvalidDimensions {
            width,
            height,
            reason: "grid lines need at least 2x2 nodes",
        });
    }
    let scale = plot_scale(width, height);
    let node = |x: usize, y: usize| DVec2::new(x as f64, y as f64) / scale;

    let rows = (0..height).flat_map(|j| (0..width - 1).map(move |i| (i, j, i + 1, j)));
    let cols = (0..width).flat_map(|i| (0..height - 1).map(move |j| (i, j, i, j + 1)));
    Ok(rows
        .chain(cols)
        .map(|(x0, y0, x1, y1)| Segment::new(node(x0, y0), node(x1, y1)))
        .collect())
}
