//! Hardware-free capture service.

use super::controller::{CaptureResult, CaptureService};
use super::session::{CaptureSession, SessionHandle};
use super::simulated::gradient;
use super::{CaptureError, Photo};
use crate::crop::{crop_image, Orientation, PRINT_AREA_RATIO};
use async_trait::async_trait;
use chrono::Utc;
use image::DynamicImage;
use std::sync::atomic::{AtomicU64, Ordering};

/// Capture service that needs no camera and no permission.
///
/// `start` always succeeds and `capture` always returns the same
/// print-area photo, so presentation code can be driven deterministically.
#[derive(Debug)]
pub struct MockCaptureService {
    session: CaptureSession,
    width: u32,
    height: u32,
    sequence: AtomicU64,
}

impl MockCaptureService {
    /// Creates a mock producing photos cropped from a 640x480 gradient.
    pub fn new() -> Self {
        Self::with_source_size(640, 480)
    }

    /// Creates a mock whose synthetic source frame is `width` x `height`.
    pub fn with_source_size(width: u32, height: u32) -> Self {
        Self {
            session: CaptureSession::new(),
            width,
            height,
            sequence: AtomicU64::new(0),
        }
    }
}

impl Default for MockCaptureService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureService for MockCaptureService {
    async fn start(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    async fn capture(&self) -> CaptureResult {
        let source = DynamicImage::ImageRgb8(gradient(self.width, self.height));
        Ok(Photo {
            image: crop_image(source, Orientation::Up, PRINT_AREA_RATIO),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            captured_at: Utc::now(),
        })
    }

    fn session(&self) -> SessionHandle {
        self.session.handle()
    }
}
