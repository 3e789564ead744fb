//! Regular two-dimensional grids of samples.
//!
//! A [`Grid`] stores `width * height` samples in row-major layout and is
//! addressed by integer `(x, y)`. The same container backs scalar fields,
//! vector fields and RGBA images through the aliases below. Unlike a
//! toroidal simulation buffer, indexing never wraps: continuous positions
//! outside `[0, width-1] x [0, height-1]` are out of domain.

use glam::{DVec2, DVec4};

use crate::error::VisError;

/// A regular 2D array of samples in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Grid of scalar samples (isocontouring input).
pub type ScalarField = Grid<f64>;

/// Grid of 2-component vectors (flow input).
pub type VectorField = Grid<DVec2>;

/// Grid of RGBA colors with channels in [0, 255] (noise textures, LIC output).
pub type ColorImage = Grid<DVec4>;

/// Checks non-zero dimensions and returns the sample count.
fn checked_len(width: usize, height: usize) -> Result<usize, VisError> {
    if width == 0 || height == 0 {
        return Err(VisError::InvalidDimensions {
            width,
            height,
            reason: "width and height must be non-zero",
        });
    }
    width.checked_mul(height).ok_or(VisError::InvalidDimensions {
        width,
        height,
        reason: "sample count overflows usize",
    })
}

impl<T: Copy + Default> Grid<T> {
    /// Creates a grid filled with `T::default()` (zero for numeric samples).
    ///
    /// Returns `VisError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, VisError> {
        Self::filled(width, height, T::default())
    }
}

impl<T: Copy> Grid<T> {
    /// Creates a grid with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, VisError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Creates a grid from a pre-built row-major data vector, validating that
    /// `data.len() == width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<T>) -> Result<Self, VisError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(VisError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a grid from a volume-shaped input whose depth must be 1.
    ///
    /// Volumes with more than one slice are rejected instead of silently
    /// reading the first slice.
    pub fn from_volume(
        width: usize,
        height: usize,
        depth: usize,
        data: Vec<T>,
    ) -> Result<Self, VisError> {
        if depth != 1 {
            return Err(VisError::InvalidDimensions {
                width,
                height,
                reason: "volume inputs must have a depth of exactly 1",
            });
        }
        Self::from_data(width, height, data)
    }

    /// Creates a grid by evaluating `f(x, y)` for every sample in row-major order.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Result<Self, VisError> {
        let len = checked_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Grid width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Gets the sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`. Use [`Grid::try_get`] for
    /// checked access.
    pub fn get(&self, x: usize, y: usize) -> T {
        assert!(
            x < self.width && y < self.height,
            "grid index ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        self.data[self.index(x, y)]
    }

    /// Gets the sample at `(x, y)`, returning `VisError::OutOfBounds` when
    /// the index lies outside the grid.
    pub fn try_get(&self, x: usize, y: usize) -> Result<T, VisError> {
        if x >= self.width || y >= self.height {
            return Err(VisError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.data[self.index(x, y)])
    }

    /// Sets the sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the index lies outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        assert!(
            x < self.width && y < self.height,
            "grid index ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Upper corner of the continuous sampling domain, `(width-1, height-1)`.
    pub fn domain_max(&self) -> DVec2 {
        DVec2::new((self.width - 1) as f64, (self.height - 1) as f64)
    }

    /// Whether a continuous position lies inside `[0, width-1] x [0, height-1]`.
    ///
    /// NaN coordinates are never inside.
    pub fn contains(&self, p: DVec2) -> bool {
        let max = self.domain_max();
        (0.0..=max.x).contains(&p.x) && (0.0..=max.y).contains(&p.y)
    }

    /// Integer cell holding a continuous position (`floor` of each coordinate),
    /// or `None` if that cell is outside the grid.
    pub fn cell_of(&self, p: DVec2) -> Option<(usize, usize)> {
        let fx = p.x.floor();
        let fy = p.y.floor();
        if !(fx >= 0.0 && fy >= 0.0) {
            return None;
        }
        let (x, y) = (fx as usize, fy as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Fails with `VisError::InvalidDimensions` unless the grid has at least
    /// one full cell (2x2 samples), which bilinear sampling and marching
    /// squares both require.
    pub fn ensure_interpolable(&self) -> Result<(), VisError> {
        if self.width < 2 || self.height < 2 {
            return Err(VisError::InvalidDimensions {
                width: self.width,
                height: self.height,
                reason: "need at least 2x2 samples",
            });
        }
        Ok(())
    }

    /// Fails with `VisError::DimensionMismatch` unless `other` has the same size.
    pub fn ensure_same_dims<U: Copy>(&self, other: &Grid<U>) -> Result<(), VisError> {
        if self.dims() != other.dims() {
            return Err(VisError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: other.width(),
                rhs_h: other.height(),
            });
        }
        Ok(())
    }

    /// Iterates over rows, top (y = 0) to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.data.chunks(self.width)
    }

    /// Iterates over all samples yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}

impl ScalarField {
    /// Minimum and maximum over all non-NaN samples, or `None` if every
    /// sample is NaN.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl VectorField {
    /// Largest vector magnitude stored in the grid.
    pub fn max_magnitude(&self) -> f64 {
        self.data
            .iter()
            .map(|v| v.length())
            .filter(|m| m.is_finite())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_zero_filled_grid() {
        let grid = ScalarField::new(4, 3).unwrap();
        assert_eq!(grid.dims(), (4, 3));
        assert_eq!(grid.data().len(), 12);
        assert!(grid.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn new_with_zero_dimension_returns_error() {
        assert!(matches!(
            ScalarField::new(0, 5),
            Err(VisError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            VectorField::new(5, 0),
            Err(VisError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn new_with_overflow_dimensions_returns_error() {
        assert!(ScalarField::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn get_after_set_returns_value() {
        let mut grid = VectorField::new(3, 3).unwrap();
        grid.set(2, 1, DVec2::new(0.5, -1.0));
        assert_eq!(grid.get(2, 1), DVec2::new(0.5, -1.0));
        assert_eq!(grid.get(1, 2), DVec2::ZERO);
    }

    #[test]
    fn set_uses_row_major_layout() {
        let mut grid = ScalarField::new(3, 2).unwrap();
        grid.set(1, 1, 7.0);
        assert_eq!(grid.data()[4], 7.0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        let grid = ScalarField::new(2, 2).unwrap();
        let _ = grid.get(2, 0);
    }

    #[test]
    fn try_get_reports_out_of_bounds() {
        let grid = ScalarField::new(2, 2).unwrap();
        assert!(matches!(
            grid.try_get(0, 2),
            Err(VisError::OutOfBounds { x: 0, y: 2, .. })
        ));
        assert!(grid.try_get(1, 1).is_ok());
    }

    #[test]
    fn from_data_rejects_wrong_length() {
        let result = ScalarField::from_data(2, 2, vec![0.0; 3]);
        assert!(matches!(result, Err(VisError::DimensionMismatch { .. })));
    }

    #[test]
    fn from_volume_requires_single_slice() {
        assert!(ScalarField::from_volume(2, 2, 1, vec![0.0; 4]).is_ok());
        assert!(matches!(
            ScalarField::from_volume(2, 2, 3, vec![0.0; 12]),
            Err(VisError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn from_fn_visits_in_row_major_order() {
        let grid = ScalarField::from_fn(3, 2, |x, y| (y * 10 + x) as f64).unwrap();
        assert_eq!(grid.data(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn contains_uses_inclusive_domain() {
        let grid = ScalarField::new(4, 3).unwrap();
        assert!(grid.contains(DVec2::new(0.0, 0.0)));
        assert!(grid.contains(DVec2::new(3.0, 2.0)));
        assert!(!grid.contains(DVec2::new(3.0001, 1.0)));
        assert!(!grid.contains(DVec2::new(-1e-9, 1.0)));
        assert!(!grid.contains(DVec2::new(f64::NAN, 1.0)));
    }

    #[test]
    fn cell_of_floors_and_bounds_checks() {
        let grid = ColorImage::new(4, 4).unwrap();
        assert_eq!(grid.cell_of(DVec2::new(2.7, 0.2)), Some((2, 0)));
        assert_eq!(grid.cell_of(DVec2::new(3.99, 3.99)), Some((3, 3)));
        assert_eq!(grid.cell_of(DVec2::new(4.0, 1.0)), None);
        assert_eq!(grid.cell_of(DVec2::new(-0.5, 1.0)), None);
        assert_eq!(grid.cell_of(DVec2::new(f64::NAN, 1.0)), None);
    }

    #[test]
    fn ensure_interpolable_rejects_degenerate_grids() {
        assert!(ScalarField::new(1, 5).unwrap().ensure_interpolable().is_err());
        assert!(ScalarField::new(5, 1).unwrap().ensure_interpolable().is_err());
        assert!(ScalarField::new(2, 2).unwrap().ensure_interpolable().is_ok());
    }

    #[test]
    fn ensure_same_dims_compares_across_sample_types() {
        let a = ScalarField::new(3, 3).unwrap();
        let b = VectorField::new(3, 3).unwrap();
        let c = ColorImage::new(3, 4).unwrap();
        assert!(a.ensure_same_dims(&b).is_ok());
        assert!(matches!(
            a.ensure_same_dims(&c),
            Err(VisError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn value_range_ignores_nan() {
        let grid = ScalarField::from_data(2, 2, vec![3.0, f64::NAN, -1.0, 2.0]).unwrap();
        assert_eq!(grid.value_range(), Some((-1.0, 3.0)));
        let all_nan = ScalarField::filled(2, 1, f64::NAN).unwrap();
        assert_eq!(all_nan.value_range(), None);
    }

    #[test]
    fn max_magnitude_finds_longest_vector() {
        let grid = VectorField::from_data(
            2,
            1,
            vec![DVec2::new(3.0, 4.0), DVec2::new(1.0, 0.0)],
        )
        .unwrap();
        assert!((grid.max_magnitude() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rows_and_iter_agree() {
        let grid = ScalarField::from_fn(3, 2, |x, y| (x + 3 * y) as f64).unwrap();
        let rows: Vec<&[f64]> = grid.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], &[3.0, 4.0, 5.0]);
        let triples: Vec<_> = grid.iter().collect();
        assert_eq!(triples[4], (1, 1, 4.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn from_fn_round_trips_through_get(
                w in 1_usize..=32,
                h in 1_usize..=32,
            ) {
                let grid = ScalarField::from_fn(w, h, |x, y| (x * 1000 + y) as f64).unwrap();
                for y in 0..h {
                    for x in 0..w {
                        prop_assert_eq!(grid.get(x, y), (x * 1000 + y) as f64);
                    }
                }
            }

            #[test]
            fn contains_agrees_with_domain_max(
                w in 2_usize..=32,
                h in 2_usize..=32,
                px in -5.0_f64..40.0,
                py in -5.0_f64..40.0,
            ) {
                let grid = ScalarField::new(w, h).unwrap();
                let max = grid.domain_max();
                let expected = px >= 0.0 && py >= 0.0 && px <= max.x && py <= max.y;
                prop_assert_eq!(grid.contains(DVec2::new(px, py)), expected);
            }
        }
    }
}
