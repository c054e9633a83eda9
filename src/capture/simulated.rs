//! Scriptable in-memory camera backend.
//!
//! Behaves like a platform capture framework whose answers are set up in
//! advance: permission state, device presence, binding acceptance, and
//! capture outcomes. Records every call so tests can assert on the
//! controller's interaction with the hardware.

use super::backend::{
    CameraBackend, CameraDevice, DeviceInput, DeviceKind, PermissionState, PhotoOutput,
    PhotoPayload, PhotoSettings, RawPhoto,
};
use super::config::DevicePosition;
use super::HardwareError;
use crate::crop::Orientation;
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct Script {
    permission: PermissionState,
    grant_on_request: bool,
    device_present: bool,
    input_error: Option<HardwareError>,
    accept_input: bool,
    accept_output: bool,
    queued: VecDeque<Result<RawPhoto, HardwareError>>,
    sensor: (u32, u32, Orientation),
}

#[derive(Debug, Default)]
struct Calls {
    access_requests: u32,
    device_queries: u32,
    start_count: u32,
    stop_count: u32,
    running: bool,
    captures: u32,
    last_settings: Option<PhotoSettings>,
}

/// Simulated camera backend.
///
/// Defaults to an authorized, present back camera that accepts bindings
/// and returns a 640x480 upright gradient frame per capture.
#[derive(Debug)]
pub struct SimulatedBackend {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBackend {
    /// Creates a backend with a working, authorized camera.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                permission: PermissionState::Authorized,
                grant_on_request: true,
                device_present: true,
                input_error: None,
                accept_input: true,
                accept_output: true,
                queued: VecDeque::new(),
                sensor: (640, 480, Orientation::Up),
            }),
            calls: Mutex::new(Calls::default()),
        }
    }

    /// Sets the initial permission state.
    pub fn with_permission(self, permission: PermissionState) -> Self {
        self.set_permission(permission);
        self
    }

    /// Sets how the user answers an access request.
    pub fn grant_on_request(self, grant: bool) -> Self {
        lock(&self.script).grant_on_request = grant;
        self
    }

    /// Removes the camera device.
    pub fn without_device(self) -> Self {
        lock(&self.script).device_present = false;
        self
    }

    /// Makes opening the device input fail with `error`.
    pub fn fail_input(self, error: HardwareError) -> Self {
        lock(&self.script).input_error = Some(error);
        self
    }

    /// Makes the session refuse the camera input.
    pub fn reject_input(self) -> Self {
        lock(&self.script).accept_input = false;
        self
    }

    /// Makes the session refuse the photo output.
    pub fn reject_output(self) -> Self {
        lock(&self.script).accept_output = false;
        self
    }

    /// Sets the size and orientation tag of generated frames.
    pub fn with_sensor(self, width: u32, height: u32, orientation: Orientation) -> Self {
        lock(&self.script).sensor = (width, height, orientation);
        self
    }

    /// Changes the permission state, e.g. after a settings change.
    pub fn set_permission(&self, permission: PermissionState) {
        lock(&self.script).permission = permission;
    }

    /// Queues an outcome for the next capture. Once the queue is empty,
    /// captures produce generated frames.
    pub fn queue_capture(&self, outcome: Result<RawPhoto, HardwareError>) {
        lock(&self.script).queued.push_back(outcome);
    }

    /// Number of interactive access requests issued.
    pub fn access_requests(&self) -> u32 {
        lock(&self.calls).access_requests
    }

    /// Number of device lookups.
    pub fn device_queries(&self) -> u32 {
        lock(&self.calls).device_queries
    }

    /// Number of `start_running` calls.
    pub fn start_count(&self) -> u32 {
        lock(&self.calls).start_count
    }

    /// Number of `stop_running` calls.
    pub fn stop_count(&self) -> u32 {
        lock(&self.calls).stop_count
    }

    /// Whether the simulated session is streaming.
    pub fn is_running(&self) -> bool {
        lock(&self.calls).running
    }

    /// Number of capture requests received.
    pub fn captures_taken(&self) -> u32 {
        lock(&self.calls).captures
    }

    /// Settings of the most recent capture request.
    pub fn last_settings(&self) -> Option<PhotoSettings> {
        lock(&self.calls).last_settings
    }
}

#[async_trait]
impl CameraBackend for SimulatedBackend {
    fn authorization_status(&self) -> PermissionState {
        lock(&self.script).permission
    }

    async fn request_access(&self) -> bool {
        lock(&self.calls).access_requests += 1;
        // The real dialog resolves later; let other tasks run meanwhile.
        tokio::task::yield_now().await;

        let mut script = lock(&self.script);
        let granted = script.grant_on_request;
        script.permission = if granted {
            PermissionState::Authorized
        } else {
            PermissionState::Denied
        };
        granted
    }

    fn default_device(&self, kind: DeviceKind, position: DevicePosition) -> Option<CameraDevice> {
        lock(&self.calls).device_queries += 1;
        lock(&self.script).device_present.then(|| CameraDevice {
            id: format!("simulated-{:?}-{:?}", position, kind).to_lowercase(),
            name: "Simulated Camera".to_string(),
            kind,
            position,
        })
    }

    fn make_input(&self, device: &CameraDevice) -> Result<DeviceInput, HardwareError> {
        match &lock(&self.script).input_error {
            Some(error) => Err(error.clone()),
            None => Ok(DeviceInput::new(device.clone())),
        }
    }

    fn can_add_input(&self, _input: &DeviceInput) -> bool {
        lock(&self.script).accept_input
    }

    fn can_add_output(&self, _output: &PhotoOutput) -> bool {
        lock(&self.script).accept_output
    }

    fn start_running(&self) {
        let mut calls = lock(&self.calls);
        calls.start_count += 1;
        calls.running = true;
    }

    fn stop_running(&self) {
        let mut calls = lock(&self.calls);
        calls.stop_count += 1;
        calls.running = false;
    }

    async fn capture_photo(&self, settings: &PhotoSettings) -> Result<RawPhoto, HardwareError> {
        {
            let mut calls = lock(&self.calls);
            calls.captures += 1;
            calls.last_settings = Some(*settings);
        }
        tokio::task::yield_now().await;

        let (queued, sensor) = {
            let mut script = lock(&self.script);
            (script.queued.pop_front(), script.sensor)
        };
        if let Some(outcome) = queued {
            return outcome;
        }

        let (width, height, orientation) = sensor;
        Ok(RawPhoto {
            payload: Some(PhotoPayload::Rgb8 {
                width,
                height,
                pixels: gradient(width, height).into_raw(),
            }),
            orientation: Some(orientation),
        })
    }
}

/// Deterministic diagonal gradient used for synthetic frames.
pub(crate) fn gradient(width: u32, height: u32) -> RgbImage {
    let w = width.max(1);
    let h = height.max(1);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / w) as u8,
            (y * 255 / h) as u8,
            ((x + y) * 127 / (w + h)) as u8,
        ])
    })
}
