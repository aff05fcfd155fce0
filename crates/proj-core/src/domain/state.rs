//! The device-state mirror.
//!
//! # Why a mirror?
//!
//! The serial protocol is write-mostly: there is no reliable way to query the
//! projector for its current power, blank, or source setting.  The bridge
//! therefore keeps an in-process *belief* about device state, updated only
//! after a write has been confirmed accepted by the link.  Everything that
//! needs device state — precondition checks, outward parameter reports —
//! consults this mirror, never the hardware.
//!
//! The one cross-parameter invariant is `blank == true ⇒ power == true`: a
//! powered-off projector cannot be blanking.  The mutators below preserve it
//! structurally; callers enforce the precondition side (rejecting a blank
//! write while power is off) before any bytes reach the wire.

use serde::Serialize;

use crate::protocol::command::Source;

/// Mirrored belief about the projector's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub power: bool,
    pub blank: bool,
    pub source: Source,
}

impl Default for DeviceState {
    /// Startup default: powered off, not blanked, HDMI selected.
    fn default() -> Self {
        Self {
            power: false,
            blank: false,
            source: Source::Hdmi,
        }
    }
}

impl DeviceState {
    /// Applies a confirmed power write.
    ///
    /// Powering off also forces `blank = false` in the same update (cascading
    /// side effect), and the returned [`StateUpdate`] carries both fields so
    /// the cascade is reported outward even though blank was not explicitly
    /// requested.
    pub fn apply_power(&mut self, on: bool) -> StateUpdate {
        self.power = on;
        if on {
            StateUpdate {
                power: Some(true),
                ..StateUpdate::default()
            }
        } else {
            self.blank = false;
            StateUpdate {
                power: Some(false),
                blank: Some(false),
                ..StateUpdate::default()
            }
        }
    }

    /// Applies a confirmed blank write.
    ///
    /// The power precondition belongs to the caller; by the time a blank
    /// write is confirmed the mirror must show power on.
    pub fn apply_blank(&mut self, on: bool) -> StateUpdate {
        debug_assert!(self.power || !on, "blank applied while power is off");
        self.blank = on;
        StateUpdate {
            blank: Some(on),
            ..StateUpdate::default()
        }
    }

    /// Applies a confirmed source write.  No power precondition exists for
    /// source selection.
    pub fn apply_source(&mut self, source: Source) -> StateUpdate {
        self.source = source;
        StateUpdate {
            source: Some(source),
            ..StateUpdate::default()
        }
    }

    /// Forces the pessimistic post-reconnect belief: power and blank off,
    /// source untouched.
    ///
    /// After a connectivity gap the device may or may not still be on; with
    /// no read-back available, "off" is the only belief that cannot wedge a
    /// later blank request behind a stale `power == true`.
    pub fn reset_for_reconnect(&mut self) -> StateUpdate {
        self.power = false;
        self.blank = false;
        StateUpdate {
            power: Some(false),
            blank: Some(false),
            ..StateUpdate::default()
        }
    }

    /// True when the mirrored state satisfies `blank ⇒ power`.
    pub fn invariant_holds(&self) -> bool {
        !self.blank || self.power
    }
}

/// Changed-fields-only report handed to the outward state reporter after one
/// confirmed operation.  Serializes as a sparse JSON document: absent fields
/// were not touched by the operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
