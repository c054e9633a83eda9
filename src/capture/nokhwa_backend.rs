//! Webcam backend built on `nokhwa`.
//!
//! Desktop webcams have no facing information; the first enumerated
//! device is treated as the back camera and the second as the front one.
//! Each capture opens the device on a blocking task, grabs one frame, and
//! releases it again.

use super::backend::{
    CameraBackend, CameraDevice, DeviceInput, DeviceKind, PermissionState, PhotoOutput,
    PhotoPayload, PhotoSettings, RawPhoto,
};
use super::config::DevicePosition;
use super::HardwareError;
use crate::crop::Orientation;
use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use std::sync::{Mutex, MutexGuard};

const NOKHWA_ERROR_CODE: i32 = -1;

fn hardware_error(error: impl std::fmt::Display) -> HardwareError {
    HardwareError::new(NOKHWA_ERROR_CODE, error.to_string())
}

fn camera_index(id: &str) -> CameraIndex {
    id.parse::<u32>()
        .map(CameraIndex::Index)
        .unwrap_or_else(|_| CameraIndex::String(id.to_string()))
}

fn requested_format() -> RequestedFormat<'static> {
    RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution)
}

/// Real camera backend.
#[derive(Debug, Default)]
pub struct NokhwaBackend {
    selected: Mutex<Option<String>>,
    running: Mutex<bool>,
}

impl NokhwaBackend {
    /// Creates a backend. No device is opened until a session is configured.
    pub fn new() -> Self {
        Self::default()
    }

    fn selected(&self) -> MutexGuard<'_, Option<String>> {
        self.selected.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn running(&self) -> MutexGuard<'_, bool> {
        self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CameraBackend for NokhwaBackend {
    fn authorization_status(&self) -> PermissionState {
        if nokhwa::nokhwa_check() {
            PermissionState::Authorized
        } else {
            PermissionState::NotDetermined
        }
    }

    async fn request_access(&self) -> bool {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Mutex::new(Some(tx));
        nokhwa::nokhwa_initialize(move |granted| {
            let sender = tx
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take();
            if let Some(sender) = sender {
                let _ = sender.send(granted);
            }
        });
        rx.await.unwrap_or(false)
    }

    fn default_device(&self, kind: DeviceKind, position: DevicePosition) -> Option<CameraDevice> {
        let devices = match nokhwa::query(ApiBackend::Auto) {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to enumerate cameras");
                return None;
            }
        };
        let slot = match position {
            DevicePosition::Back => 0,
            DevicePosition::Front => 1,
        };
        let info = devices.into_iter().nth(slot)?;
        Some(CameraDevice {
            id: info.index().to_string(),
            name: info.human_name(),
            kind,
            position,
        })
    }

    fn make_input(&self, device: &CameraDevice) -> Result<DeviceInput, HardwareError> {
        // Opening validates the device; it is released right away.
        Camera::new(camera_index(&device.id), requested_format()).map_err(hardware_error)?;
        *self.selected() = Some(device.id.clone());
        tracing::info!(device = %device.name, "Opened camera input");
        Ok(DeviceInput::new(device.clone()))
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        self.selected().as_deref() == Some(input.device().id.as_str())
    }

    fn can_add_output(&self, _output: &PhotoOutput) -> bool {
        true
    }

    fn start_running(&self) {
        *self.running() = true;
    }

    fn stop_running(&self) {
        *self.running() = false;
    }

    async fn capture_photo(&self, settings: &PhotoSettings) -> Result<RawPhoto, HardwareError> {
        if !*self.running() {
            return Err(hardware_error("camera session is not running"));
        }
        let id = self
            .selected()
            .clone()
            .ok_or_else(|| hardware_error("no camera input selected"))?;
        tracing::debug!(?settings, device = %id, "Grabbing webcam frame");

        let (width, height, pixels) = tokio::task::spawn_blocking(move || {
            let mut camera =
                Camera::new(camera_index(&id), requested_format()).map_err(hardware_error)?;
            camera.open_stream().map_err(hardware_error)?;
            let buffer = camera.frame().map_err(hardware_error)?;
            let decoded = buffer.decode_image::<RgbFormat>().map_err(hardware_error)?;
            if let Err(e) = camera.stop_stream() {
                tracing::debug!(error = %e, "Failed to stop webcam stream");
            }
            Ok::<_, HardwareError>((decoded.width(), decoded.height(), decoded.into_raw()))
        })
        .await
        .map_err(hardware_error)??;

        Ok(RawPhoto {
            payload: Some(PhotoPayload::Rgb8 {
                width,
                height,
                pixels,
            }),
            orientation: Some(Orientation::Up),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_refused_until_running() {
        let backend = NokhwaBackend::new();
        *backend.selected() = Some("0".to_string());
        let settings = PhotoSettings {
            flash_enabled: false,
            quality: Default::default(),
        };

        let err = backend.capture_photo(&settings).await.unwrap_err();
        assert_eq!(err.code, NOKHWA_ERROR_CODE);

        backend.start_running();
        backend.stop_running();
        assert!(backend.capture_photo(&settings).await.is_err());
    }
}
