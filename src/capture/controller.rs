//! Capture session controller.
//!
//! Drives the session through
//! `Idle -> RequestingPermission -> Configuring -> Running -> Capturing -> Running`,
//! or into `Failed` when `start` cannot complete.

use super::backend::{CameraBackend, DeviceKind, PermissionState, PhotoOutput, PhotoSettings};
use super::config::CaptureConfig;
use super::session::{CaptureSession, SessionHandle};
use super::{CaptureError, CapturedFrame, ErrorKind, Photo};
use crate::crop::{self, PRINT_AREA_RATIO};
use crate::metrics::CaptureMetrics;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Outcome of one capture request.
pub type CaptureResult = Result<Photo, CaptureError>;

/// Lifecycle of a [`CaptureController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Not started, or stopped.
    Idle,
    /// Waiting on the camera permission decision.
    RequestingPermission,
    /// Binding input and output.
    Configuring,
    /// Streaming and ready to capture.
    Running,
    /// A still capture is in flight.
    Capturing,
    /// The last `start` failed; the session is inactive.
    Failed(ErrorKind),
}

/// Capture operations consumed by presentation code.
///
/// Implemented by [`CaptureController`] for real hardware and by
/// [`MockCaptureService`](super::MockCaptureService) for hardware-free use.
#[async_trait]
pub trait CaptureService: Send + Sync {
    /// Acquires permission, binds the camera, and starts streaming.
    ///
    /// Safe to call repeatedly; every call reconfigures from scratch.
    async fn start(&self) -> Result<(), CaptureError>;

    /// Takes one photo cropped to the print area.
    async fn capture(&self) -> CaptureResult;

    /// Read-only handle for binding a preview surface.
    fn session(&self) -> SessionHandle;
}

/// Owns the capture session for one screen instance.
pub struct CaptureController<B> {
    backend: Arc<B>,
    config: CaptureConfig,
    session: CaptureSession,
    state: Mutex<ControllerState>,
    start_lock: tokio::sync::Mutex<()>,
    sequence: AtomicU64,
    metrics: Option<Arc<CaptureMetrics>>,
}

impl<B: CameraBackend> CaptureController<B> {
    /// Creates an idle controller over `backend`.
    pub fn new(backend: Arc<B>, config: CaptureConfig) -> Self {
        Self {
            backend,
            config,
            session: CaptureSession::new(),
            state: Mutex::new(ControllerState::Idle),
            start_lock: tokio::sync::Mutex::new(()),
            sequence: AtomicU64::new(0),
            metrics: None,
        }
    }

    /// Records start and capture outcomes into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<CaptureMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: ControllerState) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *state != next {
            tracing::debug!(from = ?*state, to = ?next, "Capture controller state change");
            *state = next;
        }
    }

    /// Read-only session handle.
    pub fn session(&self) -> SessionHandle {
        self.session.handle()
    }

    /// Acquires permission, binds the camera and output, and starts streaming.
    ///
    /// Existing bindings are torn down first, so repeated calls never leave
    /// more than one input and one output bound. On failure the session is
    /// left inactive and the controller enters `Failed`.
    pub async fn start(&self) -> Result<(), CaptureError> {
        let _guard = self.start_lock.lock().await;
        self.teardown();

        let result = self.configure().await;
        if let Some(metrics) = &self.metrics {
            metrics.record_start(result.as_ref().err().map(CaptureError::kind));
        }

        match result {
            Ok(()) => {
                self.set_state(ControllerState::Running);
                tracing::info!(position = ?self.config.position, "Capture session running");
                Ok(())
            }
            Err(e) => {
                self.teardown();
                self.set_state(ControllerState::Failed(e.kind()));
                tracing::warn!(error = %e, kind = %e.kind(), "Capture session failed to start");
                Err(e)
            }
        }
    }

    async fn configure(&self) -> Result<(), CaptureError> {
        self.set_state(ControllerState::RequestingPermission);
        self.ensure_permission().await?;

        self.set_state(ControllerState::Configuring);
        self.session.begin_configuration();
        self.session.set_preset(self.config.preset);

        let device = self
            .backend
            .default_device(DeviceKind::WideAngle, self.config.position)
            .ok_or(CaptureError::DeviceNotFound)?;
        let input = self.backend.make_input(&device)?;
        if !self.backend.can_add_input(&input) {
            tracing::warn!(device = %device.name, "Session rejected camera input");
            return Err(CaptureError::SessionConfiguration);
        }
        self.session.bind_input(input).map_err(|e| {
            tracing::warn!(error = %e, "Failed to bind camera input");
            CaptureError::SessionConfiguration
        })?;

        let output = PhotoOutput {
            max_quality: self.config.quality,
        };
        if !self.backend.can_add_output(&output) {
            tracing::warn!("Session rejected photo output");
            return Err(CaptureError::SessionConfiguration);
        }
        self.session.bind_output(output).map_err(|e| {
            tracing::warn!(error = %e, "Failed to bind photo output");
            CaptureError::SessionConfiguration
        })?;

        self.session.commit_configuration();
        self.backend.start_running();
        self.session.set_running(true);
        Ok(())
    }

    async fn ensure_permission(&self) -> Result<(), CaptureError> {
        match self.backend.authorization_status() {
            PermissionState::Authorized => Ok(()),
            PermissionState::NotDetermined => {
                tracing::info!("Requesting camera access");
                if self.backend.request_access().await {
                    Ok(())
                } else {
                    Err(CaptureError::PermissionDenied)
                }
            }
            PermissionState::Denied | PermissionState::Restricted => {
                Err(CaptureError::PermissionDenied)
            }
            PermissionState::Unknown(raw) => {
                tracing::warn!(raw, "Unrecognized camera authorization status");
                Err(CaptureError::PermissionDenied)
            }
        }
    }

    /// Takes one photo and crops it to the print area.
    ///
    /// Each call issues exactly one hardware request with the flash off
    /// and yields exactly one result. Failures are not retried.
    pub async fn capture(&self) -> CaptureResult {
        let result = self.capture_once().await;

        if self.session.is_running() {
            self.set_state(ControllerState::Running);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_capture(&result);
        }
        match &result {
            Ok(photo) => {
                let (width, height) = photo.dimensions();
                tracing::info!(sequence = photo.sequence, width, height, "Photo captured");
            }
            Err(e) => tracing::warn!(error = %e, kind = %e.kind(), "Photo capture failed"),
        }
        result
    }

    async fn capture_once(&self) -> CaptureResult {
        let output = match self.session.output() {
            Some(output) if self.session.is_running() => output,
            _ => return Err(CaptureError::SessionNotRunning),
        };

        self.set_state(ControllerState::Capturing);
        let settings = PhotoSettings {
            flash_enabled: false,
            quality: output.max_quality,
        };
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;

        let raw = self.backend.capture_photo(&settings).await?;
        let frame = CapturedFrame::decode(raw, sequence)?;
        let (upright_width, upright_height) = frame
            .orientation()
            .upright_dimensions(frame.width(), frame.height());
        tracing::debug!(?frame, upright_width, upright_height, "Cropping captured frame");

        let captured_at = frame.captured_at();
        let image = crop::crop(frame, PRINT_AREA_RATIO);
        Ok(Photo {
            image,
            sequence,
            captured_at,
        })
    }

    /// Tears down the session, e.g. when the owning screen is dismissed.
    pub fn stop(&self) {
        self.teardown();
        self.set_state(ControllerState::Idle);
        if let Some(metrics) = &self.metrics {
            metrics.record_stop();
        }
        tracing::info!("Capture session stopped");
    }

    fn teardown(&self) {
        if self.session.is_running() {
            self.backend.stop_running();
            self.session.set_running(false);
        }
        self.session.unbind_all();
    }
}

#[async_trait]
impl<B: CameraBackend> CaptureService for CaptureController<B> {
    async fn start(&self) -> Result<(), CaptureError> {
        CaptureController::start(self).await
    }

    async fn capture(&self) -> CaptureResult {
        CaptureController::capture(self).await
    }

    fn session(&self) -> SessionHandle {
        CaptureController::session(self)
    }
}
