//! Framing for outbound commands.
//!
//! Wire format:
//! ```text
//! \r * <payload> # \r
//! ```
//! A leading carriage return wakes the projector's command parser, `*`/`#`
//! delimit the payload, and the trailing carriage return submits the command.
//! There is no checksum and no sequence number; the device replies (at most)
//! one line per command on its own schedule.

use crate::protocol::command::Command;

/// Upper bound on a framed command.
///
/// The longest defined payload is `sour=hdmi2` (10 bytes), so frames stay
/// nowhere near this limit; the constant documents the transport's bounded
/// write buffer.
pub const MAX_FRAME_LEN: usize = 100;

/// Encodes a [`Command`] into the exact byte sequence the transport writes.
///
/// Encoding never fails: every representable command has a fixed keyword and
/// the frame length is bounded by construction (see [`MAX_FRAME_LEN`]).
///
/// # Examples
///
/// ```rust
/// use proj_core::{encode_command, Command};
///
/// assert_eq!(encode_command(Command::PowerOn), b"\r*pow=on#\r");
/// ```
pub fn encode_command(cmd: Command) -> Vec<u8> {
    let payload = cmd.payload();
    let mut buf = Vec::with_capacity(payload.len() + 4);
    buf.extend_from_slice(b"\r*");
    buf.extend_from_slice(payload.as_bytes());
    buf.extend_from_slice(b"#\r");
    buf
}

// ── Tests ─────────────────────────────────────────────────────────────────────
