//! Metrics collection and registry.

use crate::capture::{CaptureResult, ErrorKind};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus registry for capture session outcomes.
pub struct CaptureMetrics {
    registry: Registry,

    // Session metrics
    starts_total: IntCounter,
    start_failures: IntCounterVec,
    session_running: IntGauge,

    // Capture metrics
    captures_total: IntCounter,
    capture_success: IntCounter,
    capture_failures: IntCounterVec,
    last_photo_width: IntGauge,
    last_photo_height: IntGauge,
}

impl CaptureMetrics {
    /// Creates a registry with all capture metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let starts_total = IntCounter::new(
            "instant_print_session_starts_total",
            "Number of capture session start attempts",
        )?;
        let start_failures = IntCounterVec::new(
            Opts::new(
                "instant_print_session_start_failures_total",
                "Failed capture session starts by error kind",
            ),
            &["kind"],
        )?;
        let session_running = IntGauge::new(
            "instant_print_session_running",
            "Whether the capture session is streaming (1=running, 0=inactive)",
        )?;

        let captures_total = IntCounter::new(
            "instant_print_captures_total",
            "Number of still capture requests",
        )?;
        let capture_success = IntCounter::new(
            "instant_print_capture_success_total",
            "Number of photos delivered after cropping",
        )?;
        let capture_failures = IntCounterVec::new(
            Opts::new(
                "instant_print_capture_failures_total",
                "Failed capture requests by error kind",
            ),
            &["kind"],
        )?;
        let last_photo_width = IntGauge::new(
            "instant_print_last_photo_width_pixels",
            "Width of the last delivered photo",
        )?;
        let last_photo_height = IntGauge::new(
            "instant_print_last_photo_height_pixels",
            "Height of the last delivered photo",
        )?;

        registry.register(Box::new(starts_total.clone()))?;
        registry.register(Box::new(start_failures.clone()))?;
        registry.register(Box::new(session_running.clone()))?;
        registry.register(Box::new(captures_total.clone()))?;
        registry.register(Box::new(capture_success.clone()))?;
        registry.register(Box::new(capture_failures.clone()))?;
        registry.register(Box::new(last_photo_width.clone()))?;
        registry.register(Box::new(last_photo_height.clone()))?;

        Ok(Self {
            registry,
            starts_total,
            start_failures,
            session_running,
            captures_total,
            capture_success,
            capture_failures,
            last_photo_width,
            last_photo_height,
        })
    }

    /// Records a `start` outcome; `failure` is `None` on success.
    pub fn record_start(&self, failure: Option<ErrorKind>) {
        self.starts_total.inc();
        match failure {
            None => self.session_running.set(1),
            Some(kind) => {
                self.session_running.set(0);
                self.start_failures.with_label_values(&[kind.as_str()]).inc();
            }
        }
    }

    /// Records that the session was torn down.
    pub fn record_stop(&self) {
        self.session_running.set(0);
    }

    /// Records a capture outcome.
    pub fn record_capture(&self, result: &CaptureResult) {
        self.captures_total.inc();
        match result {
            Ok(photo) => {
                let (width, height) = photo.dimensions();
                self.capture_success.inc();
                self.last_photo_width.set(i64::from(width));
                self.last_photo_height.set(i64::from(height));
            }
            Err(e) => {
                self.capture_failures
                    .with_label_values(&[e.kind().as_str()])
                    .inc();
            }
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for CaptureMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureMetrics")
            .field("starts_total", &self.starts_total.get())
            .field("captures_total", &self.captures_total.get())
            .finish()
    }
}
