//! Pixel buffer conversion for heightmaps.
//!
//! Always available (no feature gate) so callers that only need raw RGBA
//! bytes do not pull in the `image` crate.

use wavefield_core::field::Field;

/// Maps heights to an 8-bit gray level, `[min, max]` spread over `[0, 255]`.
///
/// A flat field (including an all-zero one) maps to mid gray.
pub fn heights_to_gray(field: &Field) -> Vec<u8> {
    let (lo, hi) = field.min_max();
    let range = hi - lo;
    field
        .data()
        .iter()
        .map(|&h| {
            if range > 0.0 && range.is_finite() {
                (((h - lo) / range) * 255.0).round().clamp(0.0, 255.0) as u8
            } else {
                128
            }
        })
        .collect()
}

/// Grayscale RGBA8 buffer of the field, `width * height * 4` bytes.
pub fn heights_to_rgba(field: &Field) -> Vec<u8> {
    heights_to_gray(field)
        .into_iter()
        .flat_map(|g| [g, g, g, 255u8])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_to_rgba_correct_length() {
        let field = Field::new(8, 4).unwrap();
        assert_eq!(heights_to_rgba(&field).len(), 8 * 4 * 4);
    }

    #[test]
    fn flat_field_is_mid_gray() {
        let field = Field::from_data(2, 2, vec![-3.0; 4]).unwrap();
        assert!(heights_to_gray(&field).iter().all(|&g| g == 128));
    }

    #[test]
    fn extremes_map_to_black_and_white() {
        let field = Field::from_data(3, 1, vec![-2.0, 0.0, 2.0]).unwrap();
        let gray = heights_to_gray(&field);
        assert_eq!(gray[0], 0);
        assert_eq!(gray[1], 128);
        assert_eq!(gray[2], 255);
    }

    #[test]
    fn rgba_is_gray_and_opaque() {
        let field = Field::from_data(2, 1, vec![0.0, 1.0]).unwrap();
        let buf = heights_to_rgba(&field);
        assert_eq!(buf, vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }
}
