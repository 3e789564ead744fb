//! PNG output for color images.
//!
//! Feature-gated behind `png` (default on) so the registry and pixel
//! conversion can be used without the `image` crate.

use std::path::Path;

use flowvis_core::{ColorImage, VisError};
use tracing::info;

use crate::pixel::image_to_rgba;

/// Writes `image` as an RGBA PNG.
///
/// Returns `VisError::InvalidDimensions` if the dimensions overflow `u32`,
/// or `VisError::Io` on write failure.
pub fn write_png(image: &ColorImage, path: &Path) -> Result<(), VisError> {
    let (width, height) = image.dims();
    let too_large = || VisError::InvalidDimensions {
        width,
        height,
        reason: "PNG dimensions must fit in u32",
    };
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    let img = image::RgbaImage::from_raw(w, h, image_to_rgba(image))
        .ok_or_else(|| VisError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| VisError::Io(e.to_string()))?;
    info!(path = %path.display(), width, height, "wrote PNG");
    Ok(())
}
