//! Captured frame and final photo types.

use super::backend::{PhotoPayload, RawPhoto};
use super::CaptureError;
use crate::crop::Orientation;
use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView, RgbImage};

/// A decoded raster as delivered by the hardware, plus its orientation tag.
///
/// Owned by the controller until handed to the cropper, which consumes it.
#[derive(Clone)]
pub struct CapturedFrame {
    /// Pixels in sensor layout.
    image: DynamicImage,
    /// How the pixels must be transformed to appear upright.
    orientation: Orientation,
    /// Monotonic capture counter of the owning controller.
    sequence: u64,
    /// Wall-clock capture time.
    captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    /// Creates a frame from an already-decoded raster.
    pub fn new(image: DynamicImage, orientation: Orientation, sequence: u64) -> Self {
        Self {
            image,
            orientation,
            sequence,
            captured_at: Utc::now(),
        }
    }

    /// Decodes a hardware photo.
    ///
    /// Fails with [`CaptureError::ImageDecode`] if the photo carries no data
    /// or the data cannot be turned into a raster. Encoded payloads without
    /// an explicit orientation fall back to their EXIF tag, then to `Up`.
    pub fn decode(raw: RawPhoto, sequence: u64) -> Result<Self, CaptureError> {
        let payload = raw.payload.ok_or(CaptureError::ImageDecode)?;

        let (image, orientation) = match payload {
            PhotoPayload::Encoded(bytes) => {
                let image = image::load_from_memory(&bytes).map_err(|e| {
                    tracing::warn!(error = %e, bytes = bytes.len(), "Failed to decode photo data");
                    CaptureError::ImageDecode
                })?;
                let orientation = raw
                    .orientation
                    .or_else(|| Orientation::read_from_exif(&bytes))
                    .unwrap_or_default();
                (image, orientation)
            }
            PhotoPayload::Rgb8 {
                width,
                height,
                pixels,
            } => {
                let buffer = RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
                    tracing::warn!(width, height, "Pixel buffer does not match dimensions");
                    CaptureError::ImageDecode
                })?;
                (
                    DynamicImage::ImageRgb8(buffer),
                    raw.orientation.unwrap_or_default(),
                )
            }
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(CaptureError::ImageDecode);
        }

        Ok(Self::new(image, orientation, sequence))
    }

    /// Width in sensor layout.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in sensor layout.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Orientation tag.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Capture timestamp.
    #[inline]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Splits the frame into its raster and orientation.
    pub fn into_parts(self) -> (DynamicImage, Orientation) {
        (self.image, self.orientation)
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("orientation", &self.orientation)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Final upright photo cropped to the print area.
#[derive(Clone)]
pub struct Photo {
    /// Cropped raster. Always upright.
    pub image: DynamicImage,
    /// Sequence number of the source frame.
    pub sequence: u64,
    /// When the source frame was captured.
    pub captured_at: DateTime<Utc>,
}

impl Photo {
    /// Pixel dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("Photo")
            .field("width", &width)
            .field("height", &height)
            .field("sequence", &self.sequence)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([1, 2, 3])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_encoded_payload() {
        let raw = RawPhoto {
            payload: Some(PhotoPayload::Encoded(png_bytes(8, 6))),
            orientation: Some(Orientation::Right),
        };
        let frame = CapturedFrame::decode(raw, 3).unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert_eq!(frame.orientation(), Orientation::Right);
        assert_eq!(frame.sequence(), 3);
    }

    #[test]
    fn test_encoded_without_tag_defaults_up() {
        let raw = RawPhoto {
            payload: Some(PhotoPayload::Encoded(png_bytes(4, 4))),
            orientation: None,
        };
        let frame = CapturedFrame::decode(raw, 1).unwrap();
        assert_eq!(frame.orientation(), Orientation::Up);
    }

    fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([1, 2, 3])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        let jpeg = out.into_inner();

        // APP1 segment with a big-endian TIFF header and a single-entry IFD0.
        let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(b"MM\0\x2A\0\0\0\x08");
        app1.extend_from_slice(&[0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        app1.extend_from_slice(&orientation.to_be_bytes());
        app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&app1);
        bytes.extend_from_slice(&jpeg[2..]);
        bytes
    }

    #[test]
    fn test_encoded_orientation_read_from_exif() {
        let bytes = jpeg_with_orientation(400, 300, 6);
        assert_eq!(Orientation::read_from_exif(&bytes), Some(Orientation::Right));

        let raw = RawPhoto {
            payload: Some(PhotoPayload::Encoded(bytes)),
            orientation: None,
        };
        let frame = CapturedFrame::decode(raw, 1).unwrap();
        assert_eq!((frame.width(), frame.height()), (400, 300));
        assert_eq!(frame.orientation(), Orientation::Right);

        let image = crate::crop::crop(frame, crate::crop::PRINT_AREA_RATIO);
        assert_eq!(image.dimensions(), (296, 400));
    }

    #[test]
    fn test_explicit_orientation_overrides_exif() {
        let raw = RawPhoto {
            payload: Some(PhotoPayload::Encoded(jpeg_with_orientation(40, 30, 6))),
            orientation: Some(Orientation::Up),
        };
        let frame = CapturedFrame::decode(raw, 1).unwrap();
        assert_eq!(frame.orientation(), Orientation::Up);
    }

    #[test]
    fn test_decode_pixels() {
        let raw = RawPhoto {
            payload: Some(PhotoPayload::Rgb8 {
                width: 2,
                height: 3,
                pixels: vec![7u8; 2 * 3 * 3],
            }),
            orientation: None,
        };
        let frame = CapturedFrame::decode(raw, 1).unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 3));
    }

    #[test]
    fn test_missing_payload_is_decode_error() {
        let raw = RawPhoto {
            payload: None,
            orientation: None,
        };
        assert_eq!(
            CapturedFrame::decode(raw, 1).unwrap_err(),
            CaptureError::ImageDecode
        );
    }

    #[test]
    fn test_garbage_bytes_is_decode_error() {
        let raw = RawPhoto {
            payload: Some(PhotoPayload::Encoded(vec![0xde, 0xad, 0xbe, 0xef])),
            orientation: None,
        };
        assert_eq!(
            CapturedFrame::decode(raw, 1).unwrap_err(),
            CaptureError::ImageDecode
        );
    }

    #[test]
    fn test_short_pixel_buffer_is_decode_error() {
        let raw = RawPhoto {
            payload: Some(PhotoPayload::Rgb8 {
                width: 10,
                height: 10,
                pixels: vec![0u8; 12],
            }),
            orientation: None,
        };
        assert!(CapturedFrame::decode(raw, 1).is_err());
    }
}
