//! Mock command link for unit testing and port-less operation.
//!
//! # Why a mock link?
//!
//! The real [`SerialLink`](super::SerialLink):
//!
//! - Requires an actual serial device (or a pty pair) to open.
//! - Actually transmits bytes that a connected projector would act on.
//! - Cannot be observed directly from test code.
//!
//! The `MockLink` replaces the port with in-memory recording.  Each written
//! frame is pushed into a `Mutex<Vec<...>>` so assertions can inspect exactly
//! what was sent and in what order.  It is also what the agent binary runs
//! against when no serial port is configured.
//!
//! # Failure injection
//!
//! Arm a [`MockFailure`] with [`MockLink::fail_with`] to make subsequent
//! writes fail, exercising the error-handling paths in the controller
//! without a broken port.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::control_device::{CommandLink, LinkError};

/// Failure mode injected into writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Reject the write with an I/O error.
    Refuse,
    /// Accept only this many bytes of the frame.
    Short(usize),
}

/// A mock link that records every frame without touching hardware.
///
/// Records live in `Mutex<Vec<...>>` fields so tests can safely share the
/// link across tasks (e.g., when wrapping it in an `Arc`).
#[derive(Default)]
pub struct MockLink {
    /// Frames passed to `write_frame`, in call order.
    pub frames: Mutex<Vec<Vec<u8>>>,
    /// When set, every write fails with this mode instead of recording.
    pub failure: Mutex<Option<MockFailure>>,
}

impl MockLink {
    /// Creates a new `MockLink` with no recorded frames and no failure armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a failure mode for subsequent writes.
    pub fn fail_with(&self, mode: MockFailure) {
        *self.failure.lock().unwrap() = Some(mode);
    }

    /// Returns the recorded frames as lossy UTF-8 strings for assertions.
    pub fn frames_as_text(&self) -> Vec<String> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }
}

#[async_trait]
impl CommandLink for MockLink {
    /// Records the frame, or fails with the armed [`MockFailure`].
    async fn write_frame(&self, frame: &[u8]) -> Result<(), LinkError> {
        if let Some(mode) = *self.failure.lock().unwrap() {
            return Err(match mode {
                MockFailure::Refuse => LinkError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "mock link refused the write",
                )),
                MockFailure::Short(written) => LinkError::ShortWrite {
                    written,
                    expected: frame.len(),
                },
            });
        }
        self.frames.lock().unwrap().push(frame.to_vec());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
