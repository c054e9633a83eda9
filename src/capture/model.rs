//! Presentation-facing capture state.
//!
//! [`CaptureModel`] wraps a [`CaptureService`] and turns its results into
//! observable state: the in-flight flag, the last captured photo, and a
//! stream of displayable errors.

use super::controller::CaptureService;
use super::session::SessionHandle;
use super::{CaptureError, Photo};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

const ERROR_CHANNEL_CAPACITY: usize = 16;

/// Observable capture state for a camera screen.
pub struct CaptureModel {
    service: Arc<dyn CaptureService>,
    capturing: watch::Sender<bool>,
    photo: watch::Sender<Option<Photo>>,
    errors: broadcast::Sender<CaptureError>,
}

impl CaptureModel {
    /// Creates a model over `service`.
    pub fn new(service: Arc<dyn CaptureService>) -> Self {
        let (capturing, _) = watch::channel(false);
        let (photo, _) = watch::channel(None);
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Self {
            service,
            capturing,
            photo,
            errors,
        }
    }

    /// Session handle for the preview surface.
    pub fn session(&self) -> SessionHandle {
        self.service.session()
    }

    /// Starts the camera. Failures are published on the error channel.
    pub async fn start(&self) {
        if let Err(e) = self.service.start().await {
            self.publish_error(e);
        }
    }

    /// Takes a photo and waits for the result.
    ///
    /// Returns `false` without issuing a request if a capture is already
    /// in flight.
    pub async fn capture(&self) -> bool {
        if !self.claim_capture() {
            return false;
        }
        self.run_claimed_capture().await;
        true
    }

    /// Fire-and-forget variant of [`capture`](Self::capture).
    ///
    /// The in-flight flag is set before this returns, so a second trigger
    /// is refused until the outcome arrives. Must be called from within a
    /// Tokio runtime. The outcome is observed through
    /// [`watch_photo`](Self::watch_photo) and
    /// [`subscribe_errors`](Self::subscribe_errors).
    pub fn trigger_capture(self: &Arc<Self>) -> bool {
        if !self.claim_capture() {
            return false;
        }
        let model = Arc::clone(self);
        tokio::spawn(async move {
            model.run_claimed_capture().await;
        });
        true
    }

    fn claim_capture(&self) -> bool {
        let claimed = self.capturing.send_if_modified(|capturing| {
            if *capturing {
                false
            } else {
                *capturing = true;
                true
            }
        });
        if !claimed {
            tracing::debug!("Capture already in flight, ignoring trigger");
        }
        claimed
    }

    // Caller holds the in-flight flag; it is released once the outcome is published.
    async fn run_claimed_capture(&self) {
        match self.service.capture().await {
            Ok(photo) => {
                self.photo.send_replace(Some(photo));
            }
            Err(e) => self.publish_error(e),
        }
        self.capturing.send_replace(false);
    }

    /// Whether a capture is in flight.
    pub fn is_capturing(&self) -> bool {
        *self.capturing.borrow()
    }

    /// Watches the in-flight flag.
    pub fn watch_capturing(&self) -> watch::Receiver<bool> {
        self.capturing.subscribe()
    }

    /// Most recently captured photo.
    pub fn captured_photo(&self) -> Option<Photo> {
        self.photo.borrow().clone()
    }

    /// Watches the captured photo.
    pub fn watch_photo(&self) -> watch::Receiver<Option<Photo>> {
        self.photo.subscribe()
    }

    /// Subscribes to errors from `start` and `capture`.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<CaptureError> {
        self.errors.subscribe()
    }

    fn publish_error(&self, error: CaptureError) {
        tracing::warn!(error = %error, "Capture error");
        if self.errors.send(error).is_err() {
            tracing::debug!("No error subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{
        CaptureConfig, CaptureController, MockCaptureService, PermissionState, SimulatedBackend,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn test_capture_with_mock_service() {
        let model = CaptureModel::new(Arc::new(MockCaptureService::new()));
        model.start().await;

        assert!(model.capture().await);
        assert!(!model.is_capturing());
        let photo = model.captured_photo().unwrap();
        assert_eq!(photo.dimensions(), (356, 480));
    }

    #[tokio::test]
    async fn test_start_error_published() {
        let backend = Arc::new(SimulatedBackend::new().with_permission(PermissionState::Denied));
        let controller = CaptureController::new(backend, CaptureConfig::default());
        let model = CaptureModel::new(Arc::new(controller));
        let mut errors = model.subscribe_errors();

        model.start().await;

        assert_eq!(errors.recv().await.unwrap(), CaptureError::PermissionDenied);
        assert!(!model.session().is_running());
    }

    #[tokio::test]
    async fn test_capture_error_published_and_flag_cleared() {
        let backend = Arc::new(SimulatedBackend::new());
        let controller = CaptureController::new(backend, CaptureConfig::default());
        let model = CaptureModel::new(Arc::new(controller));
        let mut errors = model.subscribe_errors();

        // Never started.
        assert!(model.capture().await);

        assert_eq!(errors.recv().await.unwrap(), CaptureError::SessionNotRunning);
        assert!(!model.is_capturing());
        assert!(model.captured_photo().is_none());
    }

    #[tokio::test]
    async fn test_trigger_capture_is_guarded() {
        let model = Arc::new(CaptureModel::new(Arc::new(MockCaptureService::new())));
        let mut photos = model.watch_photo();

        assert!(model.trigger_capture());
        tokio::time::timeout(Duration::from_secs(5), photos.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(photos.borrow().is_some());
        assert!(!model.is_capturing());
    }

    #[tokio::test]
    async fn test_trigger_claims_flag_before_returning() {
        let backend = Arc::new(SimulatedBackend::new());
        let controller = CaptureController::new(Arc::clone(&backend), CaptureConfig::default());
        let model = Arc::new(CaptureModel::new(Arc::new(controller)));
        model.start().await;
        let mut photos = model.watch_photo();

        assert!(model.trigger_capture());
        assert!(model.is_capturing());
        assert!(!model.trigger_capture());

        tokio::time::timeout(Duration::from_secs(5), photos.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(backend.captures_taken(), 1);
        assert!(!model.is_capturing());

        // The flag is free again once the photo arrived.
        assert!(model.trigger_capture());
        tokio::time::timeout(Duration::from_secs(5), photos.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(backend.captures_taken(), 2);
    }

    #[tokio::test]
    async fn test_second_capture_rejected_while_in_flight() {
        let model = CaptureModel::new(Arc::new(MockCaptureService::new()));
        model.capturing.send_replace(true);
        assert!(!model.capture().await);
        assert!(model.captured_photo().is_none());
    }
}
