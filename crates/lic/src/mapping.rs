//! Correspondence between output pixels and field positions.

use flowvis_core::{ColorImage, VectorField};
use glam::DVec2;

/// Maps texture pixels to field positions and back.
///
/// Pixel `(i, j)` seeds at `(i * fw / tw, j * fh / th)`; a field position
/// `p` lands in pixel `floor(p * tw / fw)`. One output pixel spans
/// [`PixelMapping::step`] field units along its longer side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelMapping {
    to_field: DVec2,
    to_texture: DVec2,
    domain_max: DVec2,
    texture_dims: (usize, usize),
}

impl PixelMapping {
    pub fn new(field: &VectorField, texture: &ColorImage) -> Self {
        let field_dims = DVec2::new(field.width() as f64, field.height() as f64);
        let tex_dims = DVec2::new(texture.width() as f64, texture.height() as f64);
        Self {
            to_field: field_dims / tex_dims,
            to_texture: tex_dims / field_dims,
            domain_max: field.domain_max(),
            texture_dims: texture.dims(),
        }
    }

    /// Integration step: the larger of the two field-per-pixel ratios.
    pub fn step(&self) -> f64 {
        self.to_field.max_element()
    }

    /// Seed position for pixel `(i, j)`, clamped into the field domain.
    ///
    /// When the texture is larger than the field, the last few pixels map
    /// past `width - 1`; clamping keeps them on the boundary row/column so
    /// every pixel still gets a streamline.
    pub fn seed(&self, i: usize, j: usize) -> DVec2 {
        (DVec2::new(i as f64, j as f64) * self.to_field).min(self.domain_max)
    }

    /// Pixel containing field position `p`, or `None` outside the texture.
    pub fn pixel(&self, p: DVec2) -> Option<(usize, usize)> {
        let q = (p * self.to_texture).floor();
        if !(q.x >= 0.0 && q.y >= 0.0) {
            return None;
        }
        let (x, y) = (q.x as usize, q.y as usize);
        (x < self.texture_dims.0 && y < self.texture_dims.1).then_some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(fw: usize, fh: usize, tw: usize, th: usize) -> PixelMapping {
        PixelMapping::new(
            &VectorField::new(fw, fh).unwrap(),
            &ColorImage::new(tw, th).unwrap(),
        )
    }

    #[test]
    fn step_is_larger_ratio() {
        assert_eq!(mapping(16, 16, 64, 32).step(), 0.5);
        assert_eq!(mapping(8, 8, 8, 8).step(), 1.0);
    }

    #[test]
    fn seed_scales_and_clamps() {
        let m = mapping(4, 4, 8, 8);
        assert_eq!(m.seed(2, 4), DVec2::new(1.0, 2.0));
        assert_eq!(m.seed(7, 7), DVec2::new(3.0, 3.0));
    }

    #[test]
    fn pixel_floors_and_rejects_outside() {
        let m = mapping(4, 4, 8, 8);
        assert_eq!(m.pixel(DVec2::new(1.3, 0.0)), Some((2, 0)));
        assert_eq!(m.pixel(DVec2::new(3.0, 3.0)), Some((6, 6)));
        assert_eq!(m.pixel(DVec2::new(-0.1, 1.0)), None);
        assert_eq!(m.pixel(DVec2::new(4.0, 1.0)), None);
    }

    #[test]
    fn same_size_round_trips_pixels() {
        let m = mapping(5, 3, 5, 3);
        for j in 0..3 {
            for i in 0..5 {
                assert_eq!(m.pixel(m.seed(i, j)), Some((i, j)));
            }
        }
    }
}
