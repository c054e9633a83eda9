//! Camera capture session lifecycle.
//!
//! The [`CaptureController`] walks a hardware session through permission,
//! configuration, and streaming, then turns each still capture into an
//! upright photo cropped to the print area. Hardware access goes through
//! the [`CameraBackend`] trait; presentation code talks to the
//! [`CaptureService`] trait so a [`MockCaptureService`] can stand in.

mod backend;
mod config;
mod controller;
mod error;
mod frame;
mod mock;
mod model;
#[cfg(feature = "camera")]
mod nokhwa_backend;
mod session;
mod simulated;

pub use backend::{
    CameraBackend, CameraDevice, DeviceInput, DeviceKind, PermissionState, PhotoOutput,
    PhotoPayload, PhotoSettings, RawPhoto,
};
pub use config::{
    CaptureConfig, ConfigError, DevicePosition, FileConfig, QualityPrioritization,
    SessionPreset, SimulationConfig,
};
pub use controller::{CaptureController, CaptureResult, CaptureService, ControllerState};
pub use error::{CaptureError, ErrorKind, HardwareError};
pub use frame::{CapturedFrame, Photo};
pub use mock::MockCaptureService;
pub use model::CaptureModel;
#[cfg(feature = "camera")]
pub use nokhwa_backend::NokhwaBackend;
pub use session::{BindingError, CaptureSession, SessionHandle};
pub use simulated::SimulatedBackend;
