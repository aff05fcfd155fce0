//! Logical projector commands and the input-source whitelist.
//!
//! Every command maps to a fixed ASCII keyword (`pow=on`, `blank=off`,
//! `sour=hdmi2`, …).  The keyword table is closed: the enums below are the
//! only values that can reach the encoder, so an out-of-whitelist source is
//! not representable past this boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an input-source name is not in the whitelist.
///
/// Raised only at the string boundary (cloud parameter layer); once a
/// [`Source`] value exists it is valid by construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown input source: {0:?}")]
pub struct SourceParseError(pub String);

/// Selectable input sources.
///
/// The write-only valid values are exactly this set; the projector accepts
/// nothing else on the `sour=` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Hdmi,
    Hdmi2,
    Rgb,
}

impl Source {
    /// Lowercase canonical name used in the `sour=` command payload.
    pub fn wire_name(self) -> &'static str {
        match self {
            Source::Hdmi => "hdmi",
            Source::Hdmi2 => "hdmi2",
            Source::Rgb => "rgb",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Source {
    type Err = SourceParseError;

    /// Parses a source name case-insensitively.  Out-of-whitelist names are
    /// rejected here, before a command can be built from them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hdmi" => Ok(Source::Hdmi),
            "hdmi2" => Ok(Source::Hdmi2),
            "rgb" => Ok(Source::Rgb),
            _ => Err(SourceParseError(s.to_string())),
        }
    }
}

/// A logical command for the projector, consumed by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PowerOn,
    PowerOff,
    BlankOn,
    BlankOff,
    SelectSource(Source),
}

impl Command {
    /// The ASCII payload written between the frame delimiters.
    pub fn payload(self) -> String {
        match self {
            Command::PowerOn => "pow=on".to_string(),
            Command::PowerOff => "pow=off".to_string(),
            Command::BlankOn => "blank=on".to_string(),
            Command::BlankOff => "blank=off".to_string(),
            Command::SelectSource(src) => format!("sour={}", src.wire_name()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
