//! Prometheus metrics for capture sessions.
//!
//! # Metrics Exposed
//!
//! - `instant_print_session_starts_total` - `start` calls
//! - `instant_print_session_start_failures_total{kind}` - failed starts by error kind
//! - `instant_print_session_running` - 1 while the session streams
//! - `instant_print_captures_total` - capture requests
//! - `instant_print_capture_success_total` - photos delivered
//! - `instant_print_capture_failures_total{kind}` - failed captures by error kind
//! - `instant_print_last_photo_width_pixels` / `instant_print_last_photo_height_pixels`
//!   - size of the last cropped photo
//!
//! # Example
//!
//! ```no_run
//! use instant_print::metrics::CaptureMetrics;
//!
//! let metrics = CaptureMetrics::new().expect("Failed to create registry");
//! metrics.record_start(None);
//! println!("{}", metrics.encode().unwrap());
//! ```

mod collector;

pub use collector::{CaptureMetrics, MetricsError};
