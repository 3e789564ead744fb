//! Bilinear field sampling at continuous positions.

use std::ops::{Add, Mul};

use glam::DVec2;

use crate::grid::Grid;

/// Samples `grid` at the continuous position `pos` by bilinear interpolation.
///
/// Positions outside `[0, width-1] x [0, height-1]` (or NaN) return the zero
/// value of `T`. On the last row or column the base cell is shifted back by
/// one so the four corners always exist; the fractional weight then becomes
/// 1 and the result is exact at the boundary nodes. Grids smaller than 2x2
/// have no cell and always sample to zero.
pub fn sample<T>(grid: &Grid<T>, pos: DVec2) -> T
where
    T: Copy + Default + Add<Output = T> + Mul<f64, Output = T>,
{
    if grid.width() < 2 || grid.height() < 2 || !grid.contains(pos) {
        return T::default();
    }

    let mut x0 = pos.x.floor() as usize;
    let mut y0 = pos.y.floor() as usize;
    if x0 == grid.width() - 1 {
        x0 -= 1;
    }
    if y0 == grid.height() - 1 {
        y0 -= 1;
    }
    let fx = pos.x - x0 as f64;
    let fy = pos.y - y0 as f64;

    let v00 = grid.get(x0, y0);
    let v10 = grid.get(x0 + 1, y0);
    let v01 = grid.get(x0, y0 + 1);
    let v11 = grid.get(x0 + 1, y0 + 1);

    v00 * ((1.0 - fx) * (1.0 - fy)) + v10 * (fx * (1.0 - fy)) + v01 * ((1.0 - fx) * fy)
        + v11 * (fx * fy)
}
