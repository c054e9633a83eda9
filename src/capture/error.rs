//! Capture error taxonomy.

use thiserror::Error;

/// Error reported by the camera hardware layer.
///
/// Passed through to callers unmodified inside [`CaptureError::Hardware`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("camera hardware error {code}: {message}")]
pub struct HardwareError {
    /// Backend-specific error code.
    pub code: i32,
    /// Backend-provided description.
    pub message: String,
}

impl HardwareError {
    /// Creates a hardware error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors surfaced by the capture session controller.
///
/// Every variant displays as text suitable for showing to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("camera access is not allowed; enable it for this app in system settings")]
    PermissionDenied,
    #[error("no camera was found on this device")]
    DeviceNotFound,
    #[error("the camera session could not be configured")]
    SessionConfiguration,
    #[error("the photo could not be read from the camera")]
    ImageDecode,
    #[error("the camera is not running; start it before taking a photo")]
    SessionNotRunning,
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// Discriminant of [`CaptureError`], for state tracking and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PermissionDenied,
    DeviceNotFound,
    SessionConfiguration,
    ImageDecode,
    SessionNotRunning,
    Hardware,
}

impl CaptureError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::DeviceNotFound => ErrorKind::DeviceNotFound,
            Self::SessionConfiguration => ErrorKind::SessionConfiguration,
            Self::ImageDecode => ErrorKind::ImageDecode,
            Self::SessionNotRunning => ErrorKind::SessionNotRunning,
            Self::Hardware(_) => ErrorKind::Hardware,
        }
    }
}

impl ErrorKind {
    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::DeviceNotFound => "device_not_found",
            Self::SessionConfiguration => "session_configuration",
            Self::ImageDecode => "image_decode",
            Self::SessionNotRunning => "session_not_running",
            Self::Hardware => "hardware",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
