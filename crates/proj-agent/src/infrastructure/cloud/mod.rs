//! Cloud-parameter boundary types and the shadow reporter.
//!
//! The actual cloud connectivity — session establishment, provisioning,
//! parameter registration and persistence — lives outside this repository.
//! This module defines the boundary it drives:
//!
//! - Inbound, parameter writes arrive as the tagged [`ParameterWrite`] enum.
//!   Dispatch is resolved once at this edge; nothing downstream compares
//!   name strings, and a misspelled parameter is a parse error here rather
//!   than a silent no-op.
//! - Outbound, every confirmed mirror update is serialized as a sparse JSON
//!   state document and pushed on a channel for the cloud session to publish.

use std::str::FromStr;

use proj_core::{Source, StateUpdate};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use crate::application::control_device::StateReporter;

/// Error for parameter writes that fail boundary validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// The parameter name is not one of `power`, `blank`, `source`.
    #[error("unknown parameter: {0:?}")]
    UnknownParameter(String),

    /// The value does not parse for the named parameter (including
    /// out-of-whitelist input sources).
    #[error("invalid value {value:?} for parameter {parameter}")]
    InvalidValue {
        parameter: &'static str,
        value: String,
    },
}

/// A validated, tagged parameter write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterWrite {
    Power(bool),
    Blank(bool),
    Source(Source),
}

impl ParameterWrite {
    /// Parses a `(name, value)` pair as delivered by the parameter layer.
    ///
    /// Names match case-insensitively.  Boolean parameters accept
    /// `on`/`off`, `true`/`false`, and `1`/`0`.  Source values are validated
    /// against the whitelist here, before they can reach the controller.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] for unknown names or unparseable values.
    pub fn parse(name: &str, value: &str) -> Result<Self, ParameterError> {
        match name.to_ascii_lowercase().as_str() {
            "power" => parse_switch("power", value).map(ParameterWrite::Power),
            "blank" => parse_switch("blank", value).map(ParameterWrite::Blank),
            "source" => Source::from_str(value)
                .map(ParameterWrite::Source)
                .map_err(|_| ParameterError::InvalidValue {
                    parameter: "source",
                    value: value.to_string(),
                }),
            _ => Err(ParameterError::UnknownParameter(name.to_string())),
        }
    }
}

fn parse_switch(parameter: &'static str, value: &str) -> Result<bool, ParameterError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(ParameterError::InvalidValue {
            parameter,
            value: value.to_string(),
        }),
    }
}

/// Reports confirmed mirror updates as JSON state documents on a channel.
///
/// `report` is called from under the controller's mirror lock, so the send
/// must not block; an unbounded channel keeps the reporting path synchronous.
pub struct ShadowReporter {
    tx: mpsc::UnboundedSender<String>,
}

impl ShadowReporter {
    /// Creates the reporter and the document stream the cloud session
    /// consumes.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StateReporter for ShadowReporter {
    fn report(&self, update: StateUpdate) {
        match serde_json::to_string(&update) {
            Ok(doc) => {
                if self.tx.send(doc).is_err() {
                    warn!("cloud document receiver dropped; state report discarded");
                }
            }
            Err(e) => warn!("failed to serialize state report: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
