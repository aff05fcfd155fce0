//! Integration tests for the wire protocol: command framing and response
//! trimming, exercised through the crate's public API exactly as the agent's
//! transport uses them.

use proj_core::{encode_command, trim_response, Command, Source};

// ── Framing ───────────────────────────────────────────────────────────────────

#[test]
fn test_full_keyword_table_frames() {
    let table: [(Command, &[u8]); 7] = [
        (Command::PowerOn, b"\r*pow=on#\r"),
        (Command::PowerOff, b"\r*pow=off#\r"),
        (Command::BlankOn, b"\r*blank=on#\r"),
        (Command::BlankOff, b"\r*blank=off#\r"),
        (Command::SelectSource(Source::Hdmi), b"\r*sour=hdmi#\r"),
        (Command::SelectSource(Source::Hdmi2), b"\r*sour=hdmi2#\r"),
        (Command::SelectSource(Source::Rgb), b"\r*sour=rgb#\r"),
    ];

    for (cmd, expected) in table {
        assert_eq!(encode_command(cmd), expected, "frame mismatch for {cmd:?}");
    }
}

#[test]
fn test_frames_are_pure_ascii() {
    for cmd in [
        Command::PowerOn,
        Command::BlankOn,
        Command::SelectSource(Source::Hdmi2),
    ] {
        assert!(encode_command(cmd).iter().all(u8::is_ascii));
    }
}

// ── Trimming ──────────────────────────────────────────────────────────────────

#[test]
fn test_trim_crlf_wrapped_ok_reply() {
    let raw = [0x0D, 0x0A, b'O', b'K', 0x0D, 0x0A];
    assert_eq!(trim_response(&raw), b"OK");
}

#[test]
fn test_trim_of_control_only_buffer_must_not_produce_a_response() {
    // The receive worker drops empty trims instead of delivering them; this
    // pins the trim side of that contract.
    let raw = [0x0D, 0x0A, 0x0D, 0x0A, 0x00];
    assert!(trim_response(&raw).is_empty());
}

#[test]
fn test_trim_is_idempotent() {
    let raw = b"\r\n*POW=ON#\r\n";
    let once = trim_response(raw);
    assert_eq!(trim_response(once), once);
}

#[test]
fn test_echoed_command_reply_round_trip() {
    // Typical exchange: the device echoes the command with a status suffix.
    // The frame goes out; the padded echo trims back to printable text.
    let frame = encode_command(Command::SelectSource(Source::Rgb));
    assert_eq!(frame, b"\r*sour=rgb#\r");

    let reply = b"\r\n*SOUR=RGB#\r\n";
    assert_eq!(trim_response(reply), b"*SOUR=RGB#");
}
