//! Orientation tags and upright normalization.
//!
//! Sensors report pixels in their native layout together with a tag that
//! says how the raster must be transformed to appear right-side-up. Crop
//! geometry is only meaningful after that transform has been applied.

use image::metadata::Orientation as RasterOrientation;
use image::DynamicImage;
use std::io::Cursor;

/// Orientation of a captured raster, using EXIF numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Already upright (EXIF 1).
    #[default]
    Up,
    /// Mirrored left-to-right (EXIF 2).
    UpMirrored,
    /// Upside down (EXIF 3).
    Down,
    /// Upside down and mirrored (EXIF 4).
    DownMirrored,
    /// Needs a 90 degree clockwise turn and a horizontal flip (EXIF 5).
    LeftMirrored,
    /// Needs a 90 degree clockwise turn (EXIF 6). Typical for portrait phone shots.
    Right,
    /// Needs a 270 degree clockwise turn and a horizontal flip (EXIF 7).
    RightMirrored,
    /// Needs a 270 degree clockwise turn (EXIF 8).
    Left,
}

impl Orientation {
    /// Maps an EXIF orientation value. Out-of-range values yield `None`.
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Up),
            2 => Some(Self::UpMirrored),
            3 => Some(Self::Down),
            4 => Some(Self::DownMirrored),
            5 => Some(Self::LeftMirrored),
            6 => Some(Self::Right),
            7 => Some(Self::RightMirrored),
            8 => Some(Self::Left),
            _ => None,
        }
    }

    /// EXIF value of this orientation.
    pub fn exif_value(&self) -> u32 {
        match self {
            Self::Up => 1,
            Self::UpMirrored => 2,
            Self::Down => 3,
            Self::DownMirrored => 4,
            Self::LeftMirrored => 5,
            Self::Right => 6,
            Self::RightMirrored => 7,
            Self::Left => 8,
        }
    }

    /// Reads the orientation tag from encoded image bytes.
    ///
    /// Returns `None` when the container has no EXIF block or no usable tag.
    pub fn read_from_exif(bytes: &[u8]) -> Option<Self> {
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .ok()?;
        let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
        field.value.get_uint(0).and_then(Self::from_exif)
    }

    /// Whether normalizing swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            Self::LeftMirrored | Self::Right | Self::RightMirrored | Self::Left
        )
    }

    /// Upright dimensions of a `width` x `height` raster carrying this tag.
    pub fn upright_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Transforms `image` so its pixels are right-side-up.
    pub fn normalize(&self, mut image: DynamicImage) -> DynamicImage {
        if *self != Self::Up {
            image.apply_orientation(self.to_raster());
        }
        image
    }

    fn to_raster(self) -> RasterOrientation {
        match self {
            Self::Up => RasterOrientation::NoTransforms,
            Self::UpMirrored => RasterOrientation::FlipHorizontal,
            Self::Down => RasterOrientation::Rotate180,
            Self::DownMirrored => RasterOrientation::FlipVertical,
            Self::LeftMirrored => RasterOrientation::Rotate90FlipH,
            Self::Right => RasterOrientation::Rotate90,
            Self::RightMirrored => RasterOrientation::Rotate270FlipH,
            Self::Left => RasterOrientation::Rotate270,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn marked_landscape() -> DynamicImage {
        // 4x2 with a red pixel at the top-left corner.
        let mut img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_exif_values_round_trip() {
        for value in 1..=8 {
            let orientation = Orientation::from_exif(value).unwrap();
            assert_eq!(orientation.exif_value(), value);
        }
        assert_eq!(Orientation::from_exif(0), None);
        assert_eq!(Orientation::from_exif(9), None);
    }

    #[test]
    fn test_up_is_untouched() {
        let img = Orientation::Up.normalize(marked_landscape());
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_right_rotates_clockwise() {
        let img = Orientation::Right.normalize(marked_landscape());
        assert_eq!(img.dimensions(), (2, 4));
        // Top-left moves to top-right after a clockwise quarter turn.
        assert_eq!(img.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_down_rotates_half_turn() {
        let img = Orientation::Down.normalize(marked_landscape());
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(3, 1).0[0], 255);
    }

    #[test]
    fn test_upright_dimensions() {
        assert_eq!(Orientation::Right.upright_dimensions(4032, 3024), (3024, 4032));
        assert_eq!(Orientation::Down.upright_dimensions(4032, 3024), (4032, 3024));
    }

    #[test]
    fn test_missing_exif_is_none() {
        assert_eq!(Orientation::read_from_exif(b"not an image"), None);
    }
}
