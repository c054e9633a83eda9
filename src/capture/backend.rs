//! Camera hardware abstraction.
//!
//! [`CameraBackend`] is the seam between the session controller and the
//! platform capture framework. The controller owns all state-machine and
//! binding logic; a backend only answers questions and performs the
//! primitive hardware actions.

use super::config::{DevicePosition, QualityPrioritization};
use super::HardwareError;
use crate::crop::Orientation;
use async_trait::async_trait;

/// Camera authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// The user has not been asked yet.
    NotDetermined,
    /// Access granted.
    Authorized,
    /// The user declined access.
    Denied,
    /// Access blocked by policy.
    Restricted,
    /// A value this crate does not know about. Treated as denied.
    Unknown(i32),
}

/// Kind of physical camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Default wide-angle lens.
    WideAngle,
}

/// A physical camera resolved by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Backend identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Lens kind.
    pub kind: DeviceKind,
    /// Facing direction.
    pub position: DevicePosition,
}

/// An opened input for a camera device, ready to bind to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInput {
    device: CameraDevice,
}

impl DeviceInput {
    /// Wraps an opened device. Backends call this from `make_input`.
    pub fn new(device: CameraDevice) -> Self {
        Self { device }
    }

    /// The device behind this input.
    pub fn device(&self) -> &CameraDevice {
        &self.device
    }
}

/// Still-photo output attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhotoOutput {
    /// Upper bound on quality prioritization for requests on this output.
    pub max_quality: QualityPrioritization,
}

/// Settings for a single still-capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSettings {
    /// Whether the flash fires.
    pub flash_enabled: bool,
    /// Quality prioritization.
    pub quality: QualityPrioritization,
}

/// Pixel data delivered by the hardware.
#[derive(Clone, PartialEq, Eq)]
pub enum PhotoPayload {
    /// Encoded file data (JPEG, HEIF-converted PNG, ...).
    Encoded(Vec<u8>),
    /// Packed 8-bit RGB pixels in sensor layout.
    Rgb8 {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// `width * height * 3` bytes.
        pixels: Vec<u8>,
    },
}

impl std::fmt::Debug for PhotoPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoded(bytes) => f
                .debug_struct("Encoded")
                .field("bytes", &bytes.len())
                .finish(),
            Self::Rgb8 {
                width,
                height,
                pixels,
            } => f
                .debug_struct("Rgb8")
                .field("width", width)
                .field("height", height)
                .field("pixel_bytes", &pixels.len())
                .finish(),
        }
    }
}

/// Result of a successful hardware capture.
///
/// The hardware may complete without retrievable image data, in which
/// case `payload` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPhoto {
    /// Captured data, if any.
    pub payload: Option<PhotoPayload>,
    /// Orientation reported alongside the data. When absent, the tag is
    /// read from the encoded payload's EXIF block.
    pub orientation: Option<Orientation>,
}

/// Platform camera framework.
///
/// Implementations must be shareable across tasks; the controller holds
/// one behind an `Arc`.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Current camera authorization.
    fn authorization_status(&self) -> PermissionState;

    /// Asks the user for camera access and waits for the answer.
    async fn request_access(&self) -> bool;

    /// Resolves the default camera of `kind` facing `position`.
    fn default_device(&self, kind: DeviceKind, position: DevicePosition) -> Option<CameraDevice>;

    /// Opens an input for `device`.
    fn make_input(&self, device: &CameraDevice) -> Result<DeviceInput, HardwareError>;

    /// Whether the session accepts `input`.
    fn can_add_input(&self, input: &DeviceInput) -> bool;

    /// Whether the session accepts `output`.
    fn can_add_output(&self, output: &PhotoOutput) -> bool;

    /// Starts streaming frames from the bound input.
    fn start_running(&self);

    /// Stops streaming.
    fn stop_running(&self);

    /// Takes one still photo.
    async fn capture_photo(&self, settings: &PhotoSettings) -> Result<RawPhoto, HardwareError>;
}
