//! Single entry point that validates inputs, runs the configured LIC
//! algorithm and applies contrast enhancement.

use flowvis_core::{ColorImage, VectorField, VisError};
use tracing::info;

use crate::config::{Algorithm, LicConfig};
use crate::fast::fast_lic;
use crate::standard::standard_lic;

pub fn render(
    field: &VectorField,
    texture: &ColorImage,
    config: &LicConfig,
) -> Result<ColorImage, VisError> {
    config.validate()?;
    field.ensure_interpolable()?;

    let mut image = match config.algorithm {
        Algorithm::Standard => standard_lic(
            field,
            texture,
            config.arc_length,
            config.kernel,
            config.max_iterations,
        )?,
        Algorithm::Fast => fast_lic(field, texture, config.arc_length, config.max_iterations)?,
    };

    if config.contrast {
        config.enhancement()?.apply(&mut image);
    }
    info!(
        algorithm = %config.algorithm,
        width = image.width(),
        height = image.height(),
        contrast = config.contrast,
        "LIC rendered"
    );
    Ok(image)
}
