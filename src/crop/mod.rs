//! Fixed-aspect-ratio cropping.
//!
//! Turns a raw captured frame into an upright image trimmed to a print
//! ratio. The operation is pure and synchronous, so it is safe to call
//! from any thread.
//!
//! Cropping is best-effort: if the computed rectangle cannot be applied
//! the upright, uncropped raster is returned instead of an error.

mod geometry;
mod orientation;
mod ratio;

pub use geometry::{crop_rect, CropRect};
pub use orientation::Orientation;
pub use ratio::{AspectRatio, CARD_OUTER_RATIO, PRINT_AREA_RATIO};

use crate::capture::CapturedFrame;
use image::{DynamicImage, GenericImageView};

/// Crops a captured frame to `ratio`, consuming the raw frame.
///
/// # Panics
///
/// Panics if `ratio` has a non-positive component.
pub fn crop(frame: CapturedFrame, ratio: AspectRatio) -> DynamicImage {
    let (image, orientation) = frame.into_parts();
    crop_image(image, orientation, ratio)
}

/// Crops `image`, tagged with `orientation`, to `ratio`.
///
/// The result is always upright. Rectangle math happens in upright pixel
/// space, after orientation has been applied.
///
/// # Panics
///
/// Panics if `ratio` has a non-positive component.
pub fn crop_image(image: DynamicImage, orientation: Orientation, ratio: AspectRatio) -> DynamicImage {
    ratio.assert_valid();

    let upright = orientation.normalize(image);
    let (width, height) = upright.dimensions();
    let rect = crop_rect(width, height, ratio);

    if !rect.fits_within(width, height) {
        tracing::warn!(
            width,
            height,
            ?rect,
            %ratio,
            "Crop rectangle out of bounds, keeping uncropped image"
        );
        return upright;
    }
    if rect.is_full(width, height) {
        return upright;
    }

    tracing::debug!(
        source_width = width,
        source_height = height,
        x = rect.x,
        y = rect.y,
        crop_width = rect.width,
        crop_height = rect.height,
        "Cropping to {}",
        ratio
    );
    upright.crop_imm(rect.x, rect.y, rect.width, rect.height)
}
