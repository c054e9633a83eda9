//! Session binding bookkeeping.
//!
//! A [`CaptureSession`] holds at most one device input and one photo
//! output. Binding a second of either kind is refused; callers must unbind
//! first. Presentation code only ever sees a [`SessionHandle`].

use super::backend::{CameraDevice, DeviceInput, PhotoOutput};
use super::config::SessionPreset;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Why a binding was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("an input is already bound")]
    InputAlreadyBound,
    #[error("an output is already bound")]
    OutputAlreadyBound,
    #[error("bindings can only change inside a configuration block")]
    NotConfiguring,
}

#[derive(Debug, Default)]
struct SessionState {
    input: Option<DeviceInput>,
    output: Option<PhotoOutput>,
    preset: SessionPreset,
    configuring: bool,
    running: bool,
}

/// Mutable session owned by a single controller.
#[derive(Debug, Default)]
pub struct CaptureSession {
    state: Arc<RwLock<SessionState>>,
}

impl CaptureSession {
    /// Creates an empty, idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only handle for preview surfaces.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens a configuration block.
    pub fn begin_configuration(&self) {
        self.write().configuring = true;
    }

    /// Closes the configuration block.
    pub fn commit_configuration(&self) {
        self.write().configuring = false;
    }

    /// Sets the session preset.
    pub fn set_preset(&self, preset: SessionPreset) {
        self.write().preset = preset;
    }

    /// Binds `input`. Refused if an input is already bound.
    pub fn bind_input(&self, input: DeviceInput) -> Result<(), BindingError> {
        let mut state = self.write();
        if !state.configuring {
            return Err(BindingError::NotConfiguring);
        }
        if state.input.is_some() {
            return Err(BindingError::InputAlreadyBound);
        }
        state.input = Some(input);
        Ok(())
    }

    /// Binds `output`. Refused if an output is already bound.
    pub fn bind_output(&self, output: PhotoOutput) -> Result<(), BindingError> {
        let mut state = self.write();
        if !state.configuring {
            return Err(BindingError::NotConfiguring);
        }
        if state.output.is_some() {
            return Err(BindingError::OutputAlreadyBound);
        }
        state.output = Some(output);
        Ok(())
    }

    /// Currently bound output.
    pub fn output(&self) -> Option<PhotoOutput> {
        self.read().output
    }

    /// Removes both bindings and ends any open configuration block.
    pub fn unbind_all(&self) {
        let mut state = self.write();
        state.input = None;
        state.output = None;
        state.configuring = false;
    }

    /// Marks the session as streaming.
    pub fn set_running(&self, running: bool) {
        self.write().running = running;
    }

    /// Whether the session is streaming.
    pub fn is_running(&self) -> bool {
        self.read().running
    }
}

/// Read-only capability handle onto a [`CaptureSession`].
///
/// Cloneable and cheap; reflects the live session state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    state: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether frames are streaming.
    pub fn is_running(&self) -> bool {
        self.read().running
    }

    /// Device behind the bound input, if any.
    pub fn input_device(&self) -> Option<CameraDevice> {
        self.read().input.as_ref().map(|input| input.device().clone())
    }

    /// Whether a photo output is bound.
    pub fn has_output(&self) -> bool {
        self.read().output.is_some()
    }

    /// Number of bound inputs and outputs. Each is at most one.
    pub fn binding_counts(&self) -> (usize, usize) {
        let state = self.read();
        (
            usize::from(state.input.is_some()),
            usize::from(state.output.is_some()),
        )
    }

    /// Active preset.
    pub fn preset(&self) -> SessionPreset {
        self.read().preset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::backend::DeviceKind;
    use crate::capture::config::DevicePosition;

    fn input() -> DeviceInput {
        DeviceInput::new(CameraDevice {
            id: "back-wide".into(),
            name: "Back Camera".into(),
            kind: DeviceKind::WideAngle,
            position: DevicePosition::Back,
        })
    }

    #[test]
    fn test_second_input_refused() {
        let session = CaptureSession::new();
        session.begin_configuration();
        session.bind_input(input()).unwrap();
        assert_eq!(
            session.bind_input(input()),
            Err(BindingError::InputAlreadyBound)
        );
        session.bind_output(PhotoOutput::default()).unwrap();
        assert_eq!(
            session.bind_output(PhotoOutput::default()),
            Err(BindingError::OutputAlreadyBound)
        );
        session.commit_configuration();
        assert_eq!(session.handle().binding_counts(), (1, 1));
    }

    #[test]
    fn test_binding_requires_configuration_block() {
        let session = CaptureSession::new();
        assert_eq!(
            session.bind_input(input()),
            Err(BindingError::NotConfiguring)
        );
    }

    #[test]
    fn test_unbind_then_rebind() {
        let session = CaptureSession::new();
        session.begin_configuration();
        session.bind_input(input()).unwrap();
        session.unbind_all();
        session.begin_configuration();
        session.bind_input(input()).unwrap();
        assert_eq!(session.handle().binding_counts(), (1, 0));
    }

    #[test]
    fn test_handle_reflects_live_state() {
        let session = CaptureSession::new();
        let handle = session.handle();
        assert!(!handle.is_running());
        session.set_running(true);
        assert!(handle.is_running());
        assert_eq!(handle.preset(), SessionPreset::Photo);
        assert_eq!(handle.input_device(), None);
    }
}
