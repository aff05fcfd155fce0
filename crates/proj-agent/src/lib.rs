//! proj-agent library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the agent do?
//!
//! The agent is the bridge between a cloud-facing parameter layer (toggles
//! for power and picture blank, a selector for the input source) and a
//! projector that only speaks a line-oriented ASCII protocol on its serial
//! port.
//!
//! The agent application:
//!
//! 1. Opens the serial link and starts a receive worker that continuously
//!    reads, trims, and forwards the projector's response lines.
//! 2. Receives validated parameter writes at the cloud boundary.
//! 3. Checks each write against the mirrored device state (blanking requires
//!    power), encodes the command, and writes the frame to the link.
//! 4. Updates the mirror only after the link confirms the write, and reports
//!    the changed parameters outward as a JSON state document.
//! 5. Resets the mirror to a pessimistic "everything off" belief whenever the
//!    cloud connection is (re-)established, without touching the wire.

/// Application layer: use cases for the agent.
pub mod application;

/// Infrastructure layer: serial transport, cloud boundary, status sinks,
/// and configuration storage.
pub mod infrastructure;
