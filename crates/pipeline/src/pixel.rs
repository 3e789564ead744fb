//! Pixel buffer conversion and simple line rasterization.
//!
//! This module is always available (no feature gate) so that callers that
//! only need raw bytes do not pull in the `image` crate.

use flowvis_core::{ColorImage, DVec2, DVec4, ScalarField, TransferFunction, VisError};

fn to_byte(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

/// Converts a color image (channels in [0, 255]) to an RGBA8 buffer of
/// `width * height * 4` bytes, row-major.
pub fn image_to_rgba(image: &ColorImage) -> Vec<u8> {
    image
        .data()
        .iter()
        .flat_map(|c| [to_byte(c.x), to_byte(c.y), to_byte(c.z), to_byte(c.w)])
        .collect()
}

/// Colors a scalar field through a transfer function, normalizing values by
/// the field's finite range. NaN samples take the first stop's color.
pub fn colorize(field: &ScalarField, transfer: &TransferFunction) -> Result<ColorImage, VisError> {
    let (min, max) = field.value_range().unwrap_or((0.0, 1.0));
    let span = max - min;
    ColorImage::from_fn(field.width(), field.height(), |x, y| {
        let t = if span > 0.0 { (field.get(x, y) - min) / span } else { 0.0 };
        transfer.sample(t) * 255.0
    })
}

/// Draws a segment given in normalized plot space (`[0, 1]` on both axes)
/// onto `image`. The y axis points up: plot y = 1 is the top row.
///
/// `color` channels are in [0, 1]. Points outside the image are clipped.
pub fn draw_segment(image: &mut ColorImage, start: DVec2, end: DVec2, color: DVec4) {
    let scale = DVec2::new(image.width() as f64 - 1.0, image.height() as f64 - 1.0);
    let flip = |p: DVec2| DVec2::new(p.x, 1.0 - p.y) * scale;
    let (a, b) = (flip(start), flip(end));
    let steps = (b - a).abs().max_element().ceil().max(1.0) as usize;
    let rgba = color * 255.0;
    for k in 0..=steps {
        let p = a.lerp(b, k as f64 / steps as f64).round();
        if p.x < 0.0 || p.y < 0.0 {
            continue;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if x < image.width() && y < image.height() {
            image.set(x, y, rgba);
        }
    }
}

/// Draws consecutive points as a connected polyline.
pub fn draw_polyline(image: &mut ColorImage, points: &[DVec2], color: DVec4) {
    for pair in points.windows(2) {
        draw_segment(image, pair[0], pair[1], color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_to_rgba_correct_length() {
        let image = ColorImage::new(8, 4).unwrap();
        assert_eq!(image_to_rgba(&image).len(), 8 * 4 * 4);
    }

    #[test]
    fn image_to_rgba_rounds_and_clamps() {
        let image = ColorImage::from_data(
            2,
            1,
            vec![DVec4::new(12.4, 12.6, -3.0, 255.0), DVec4::new(300.0, 0.0, 0.0, 0.0)],
        )
        .unwrap();
        assert_eq!(image_to_rgba(&image), vec![12, 13, 0, 255, 255, 0, 0, 0]);
    }

    #[test]
    fn colorize_spans_transfer_function() {
        let field = ScalarField::from_fn(3, 1, |x, _| x as f64).unwrap();
        let image = colorize(&field, &TransferFunction::grayscale()).unwrap();
        assert!(image.get(0, 0).x < 1.0);
        assert!(image.get(2, 0).x > 254.0);
        assert!((image.get(1, 0).x - image.get(1, 0).y).abs() < 1e-9);
    }

    #[test]
    fn draw_segment_covers_endpoints_with_flipped_y() {
        let mut image = ColorImage::new(5, 5).unwrap();
        let red = DVec4::new(1.0, 0.0, 0.0, 1.0);
        draw_segment(&mut image, DVec2::ZERO, DVec2::new(1.0, 0.0), red);
        // Plot y = 0 is the bottom row.
        for x in 0..5 {
            assert_eq!(image.get(x, 4), DVec4::new(255.0, 0.0, 0.0, 255.0));
            assert_eq!(image.get(x, 0), DVec4::ZERO);
        }
    }

    #[test]
    fn draw_segment_clips_outside_points() {
        let mut image = ColorImage::new(4, 4).unwrap();
        draw_segment(&mut image, DVec2::new(-1.0, 0.5), DVec2::new(2.0, 0.5), DVec4::ONE);
        assert!(image.data().iter().any(|c| c.w == 255.0));
    }

    #[test]
    fn draw_polyline_connects_points() {
        let mut image = ColorImage::new(3, 3).unwrap();
        let pts = [DVec2::new(0.0, 1.0), DVec2::new(1.0, 1.0), DVec2::new(1.0, 0.0)];
        draw_polyline(&mut image, &pts, DVec4::ONE);
        assert_eq!(image.get(0, 0).w, 255.0);
        assert_eq!(image.get(2, 2).w, 255.0);
        assert_eq!(image.get(0, 2).w, 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn segments_never_write_outside(
                w in 2_usize..20,
                h in 2_usize..20,
                ax in -2.0_f64..3.0, ay in -2.0_f64..3.0,
                bx in -2.0_f64..3.0, by in -2.0_f64..3.0,
            ) {
                let mut image = ColorImage::new(w, h).unwrap();
                draw_segment(&mut image, DVec2::new(ax, ay), DVec2::new(bx, by), DVec4::ONE);
                prop_assert_eq!(image_to_rgba(&image).len(), w * h * 4);
            }
        }
    }
}
