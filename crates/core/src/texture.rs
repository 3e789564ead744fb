//! Input textures for line integral convolution.

use glam::DVec4;

use crate::error::VisError;
use crate::grid::ColorImage;
use crate::prng::Xorshift64;

/// White-noise texture with channels in [0, 255] and opaque alpha.
///
/// Each pixel gets one random gray value shared by R, G and B. With
/// `black_and_white` the value is thresholded at 128 to pure black or
/// white. The same seed always yields the same texture.
pub fn noise_texture(
    width: usize,
    height: usize,
    seed: u64,
    black_and_white: bool,
) -> Result<ColorImage, VisError> {
    let mut rng = Xorshift64::new(seed);
    ColorImage::from_fn(width, height, |_, _| {
        let gray = rng.next_u8();
        let value = match (black_and_white, gray >= 128) {
            (false, _) => gray as f64,
            (true, true) => 255.0,
            (true, false) => 0.0,
        };
        DVec4::new(value, value, value, 255.0)
    })
}

/// Texture where every pixel has the same opaque gray value.
pub fn solid_gray(width: usize, height: usize, value: f64) -> Result<ColorImage, VisError> {
    if !(0.0..=255.0).contains(&value) {
        return Err(VisError::invalid_param(
            "gray",
            format!("{value} outside [0, 255]"),
        ));
    }
    ColorImage::filled(width, height, DVec4::new(value, value, value, 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_gray_and_opaque() {
        let tex = noise_texture(8, 8, 1, false).unwrap();
        for (_, _, c) in tex.iter() {
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
            assert_eq!(c.w, 255.0);
            assert!((0.0..=255.0).contains(&c.x));
        }
    }

    #[test]
    fn black_and_white_noise_is_binary() {
        let tex = noise_texture(16, 16, 9, true).unwrap();
        assert!(tex.data().iter().all(|c| c.x == 0.0 || c.x == 255.0));
        assert!(tex.data().iter().any(|c| c.x == 0.0));
        assert!(tex.data().iter().any(|c| c.x == 255.0));
    }

    #[test]
    fn same_seed_same_texture() {
        let a = noise_texture(10, 6, 77, false).unwrap();
        let b = noise_texture(10, 6, 77, false).unwrap();
        let c = noise_texture(10, 6, 78, false).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_size_texture_is_rejected() {
        assert!(noise_texture(0, 4, 1, false).is_err());
    }

    #[test]
    fn solid_gray_validates_range() {
        assert!(solid_gray(2, 2, 300.0).is_err());
        let tex = solid_gray(2, 2, 128.0).unwrap();
        assert!(tex.data().iter().all(|&c| c == DVec4::new(128.0, 128.0, 128.0, 255.0)));
    }
}
