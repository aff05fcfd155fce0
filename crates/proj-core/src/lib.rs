//! # proj-core
//!
//! Shared library for Proj-Link containing the ASCII command protocol
//! (payload keywords, framing, response trimming) and the device-state
//! domain types.
//!
//! This crate is used by the agent application and its integration tests.
//! It has zero dependencies on serial ports, network sockets, or OS APIs.
//!
//! # Architecture overview
//!
//! Proj-Link bridges a cloud-facing parameter layer (power, picture blank,
//! input source) to a projector that only understands a line-oriented ASCII
//! protocol on a serial port.  This crate is the pure foundation of that
//! bridge.  It defines:
//!
//! - **`protocol`** – How bytes travel over the serial wire.  Commands are
//!   encoded into `\r*<payload>#\r` frames; raw receive buffers are trimmed
//!   into response lines.  The protocol is write-mostly: there is no reliable
//!   way to read device state back, so nothing in here parses replies beyond
//!   trimming.
//!
//! - **`domain`** – Pure business logic with no I/O.  The central piece is
//!   the `DeviceState` mirror: the in-process belief about the projector's
//!   power/blank/source, with the invariant that blanking requires power.

// Rust will look for each module in a subdirectory with the same name
// (e.g., src/protocol/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `proj_core::Command` instead of `proj_core::protocol::command::Command`.
pub use domain::state::{DeviceState, StateUpdate};
pub use protocol::command::{Command, Source, SourceParseError};
pub use protocol::frame::{encode_command, MAX_FRAME_LEN};
pub use protocol::response::trim_response;
