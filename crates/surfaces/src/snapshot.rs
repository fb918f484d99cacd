//! PNG heightmap snapshots of a [`Field`].
//!
//! Feature-gated behind `png` (default on). The pixel conversion itself lives
//! in [`crate::pixel`].

use std::path::Path;
use wavefield_core::error::FieldError;
use wavefield_core::field::Field;

use crate::pixel::heights_to_rgba;

/// Writes a field as a grayscale PNG, lowest cell black and highest white.
///
/// Returns `FieldError::InvalidDimensions` if the field dimensions overflow
/// `u32`, or `FieldError::Io` on write failure.
pub fn write_png(field: &Field, path: &Path) -> Result<(), FieldError> {
    let rgba = heights_to_rgba(field);
    let w = u32::try_from(field.width()).map_err(|_| FieldError::InvalidDimensions)?;
    let h = u32::try_from(field.height()).map_err(|_| FieldError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FieldError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FieldError::Io(e.to_string()))
}
