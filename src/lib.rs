//! Instant Print Capture Library
//!
//! Capture-session lifecycle and deterministic print cropping for a
//! simulated instant-print camera.
//!
//! # Architecture
//!
//! ```text
//! permission → configuration → running → capture → decode → crop
//!                                  ↑                           ↓
//!                                  └──────── Photo / CaptureError
//! ```
//!
//! - [`capture`] owns the hardware session state machine and exposes it
//!   through the [`CaptureService`] trait.
//! - [`crop`] is a pure function from a raw frame to an upright image at a
//!   fixed print ratio.
//! - [`metrics`] counts session and capture outcomes.
//!
//! # Example
//!
//! ```no_run
//! use instant_print::{
//!     capture::{CaptureConfig, CaptureController, SimulatedBackend},
//!     crop::PRINT_AREA_RATIO,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), instant_print::CaptureError> {
//! let backend = Arc::new(SimulatedBackend::new());
//! let controller = CaptureController::new(backend, CaptureConfig::default());
//!
//! controller.start().await?;
//! let photo = controller.capture().await?;
//! println!("{:?} cropped to {}", photo.dimensions(), PRINT_AREA_RATIO);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod crop;
pub mod metrics;

// Re-export commonly used types at crate root
pub use capture::{
    CaptureConfig, CaptureController, CaptureError, CaptureModel, CaptureResult, CaptureService,
    MockCaptureService, Photo, SessionHandle,
};
pub use crop::{crop, AspectRatio, Orientation, CARD_OUTER_RATIO, PRINT_AREA_RATIO};
pub use metrics::CaptureMetrics;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
