//! Centered crop rectangle computation.

use super::AspectRatio;

/// An integer pixel rectangle inside an upright raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Rectangle width.
    pub width: u32,
    /// Rectangle height.
    pub height: u32,
}

impl CropRect {
    /// True if the rectangle has area and lies inside a `width` x `height` raster.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }

    /// True if the rectangle covers the whole `width` x `height` raster.
    pub fn is_full(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }
}

/// Computes the largest centered rectangle of `ratio` inside a
/// `width` x `height` raster.
///
/// A relatively wider source is trimmed left and right; otherwise top and
/// bottom are trimmed. Origin and size are truncated toward zero
/// independently, so centering is exact to within one pixel.
pub fn crop_rect(width: u32, height: u32, ratio: AspectRatio) -> CropRect {
    ratio.assert_valid();

    let pixel_width = f64::from(width);
    let pixel_height = f64::from(height);
    let target_aspect = ratio.value();
    let source_aspect = pixel_width / pixel_height;

    let (crop_width, crop_height) = if source_aspect > target_aspect {
        (pixel_height * target_aspect, pixel_height)
    } else {
        (pixel_width, pixel_width / target_aspect)
    };

    let origin_x = (pixel_width - crop_width) / 2.0;
    let origin_y = (pixel_height - crop_height) / 2.0;

    // `as` saturates: negative or NaN values become 0, which the caller
    // rejects through `fits_within`.
    CropRect {
        x: origin_x.trunc() as u32,
        y: origin_y.trunc() as u32,
        width: crop_width.trunc() as u32,
        height: crop_height.trunc() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::{CARD_OUTER_RATIO, PRINT_AREA_RATIO};
    use proptest::prelude::*;

    #[test]
    fn test_portrait_sensor_frame() {
        // 3024/4032 = 0.75 > 46/62 ~ 0.742, so left and right are trimmed.
        let rect = crop_rect(3024, 4032, PRINT_AREA_RATIO);
        assert_eq!(
            rect,
            CropRect {
                x: 16,
                y: 0,
                width: 2991,
                height: 4032
            }
        );
        assert!(rect.fits_within(3024, 4032));
    }

    #[test]
    fn test_landscape_sensor_frame() {
        // 4032 * 62 / 46 = 5434 would overflow the height, so the wide branch applies.
        let rect = crop_rect(4032, 3024, PRINT_AREA_RATIO);
        assert_eq!(rect.height, 3024);
        assert_eq!(rect.width, 2243);
        assert_eq!(rect.x, 894);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_tall_source_trims_top_and_bottom() {
        let rect = crop_rect(540, 2000, CARD_OUTER_RATIO);
        assert_eq!(rect.width, 540);
        assert_eq!(rect.height, 860);
        assert_eq!(rect.y, 570);
        assert_eq!(rect.x, 0);
    }

    #[test]
    fn test_exact_ratio_is_full_frame() {
        let rect = crop_rect(460, 620, PRINT_AREA_RATIO);
        assert!(rect.is_full(460, 620));
    }

    #[test]
    fn test_recrop_within_one_pixel() {
        let first = crop_rect(3024, 4032, PRINT_AREA_RATIO);
        let second = crop_rect(first.width, first.height, PRINT_AREA_RATIO);
        assert_eq!(second.width, 2991);
        assert_eq!(second.height, 4031);
    }

    #[test]
    fn test_empty_source_is_degenerate() {
        let rect = crop_rect(0, 0, PRINT_AREA_RATIO);
        assert!(!rect.fits_within(0, 0));
    }

    #[test]
    #[should_panic]
    fn test_zero_ratio_panics() {
        crop_rect(100, 100, AspectRatio::unchecked(0.0, 62.0));
    }

    proptest! {
        #[test]
        fn prop_wide_source_keeps_height(
            width in 1u32..8000,
            height in 1u32..8000,
            rw in 1u32..200,
            rh in 1u32..200,
        ) {
            let ratio = AspectRatio::new(f64::from(rw), f64::from(rh));
            let source = f64::from(width) / f64::from(height);
            prop_assume!(source > ratio.value());

            let rect = crop_rect(width, height, ratio);
            let expected = (f64::from(height) * ratio.value()).trunc() as u32;
            prop_assert_eq!(rect.height, height);
            prop_assert_eq!(rect.width, expected);
            prop_assert_eq!(rect.y, 0);
            let centered = (f64::from(width) - f64::from(rect.width)) / 2.0;
            prop_assert!((f64::from(rect.x) - centered).abs() <= 1.0);
            prop_assert!(rect.x + rect.width <= width);
        }

        #[test]
        fn prop_tall_source_keeps_width(
            width in 1u32..8000,
            height in 1u32..8000,
            rw in 1u32..200,
            rh in 1u32..200,
        ) {
            let ratio = AspectRatio::new(f64::from(rw), f64::from(rh));
            let source = f64::from(width) / f64::from(height);
            prop_assume!(source <= ratio.value());

            let rect = crop_rect(width, height, ratio);
            let expected = (f64::from(width) / ratio.value()).trunc() as u32;
            prop_assert_eq!(rect.width, width);
            prop_assert_eq!(rect.height, expected);
            prop_assert_eq!(rect.x, 0);
            let centered = (f64::from(height) - f64::from(rect.height)) / 2.0;
            prop_assert!((f64::from(rect.y) - centered).abs() <= 1.0);
        }

        #[test]
        fn prop_print_sized_source_is_unchanged(scale in 1u32..2000) {
            let (width, height) = (46 * scale, 62 * scale);
            let rect = crop_rect(width, height, PRINT_AREA_RATIO);
            prop_assert!(rect.width.abs_diff(width) <= 1);
            prop_assert!(rect.height.abs_diff(height) <= 1);
            prop_assert!(rect.fits_within(width, height));
        }
    }
}
