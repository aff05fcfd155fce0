//! Status sinks for the device response feed.
//!
//! The response router pushes every trimmed line to exactly one
//! [`StatusSink`]; these are the shipped implementations.

use tokio::sync::mpsc;
use tracing::info;

use crate::application::route_responses::StatusSink;

/// Logs each device response line through `tracing`.
#[derive(Debug, Default)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn on_response(&self, line: &str) {
        info!(target: "device", "response: {line}");
    }
}

/// Forwards each response line on an unbounded channel.
///
/// Used by integration tests and by callers that consume the status feed
/// programmatically instead of through the log.
pub struct ChannelStatusSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelStatusSink {
    /// Creates the sink and the receiver of forwarded lines.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusSink for ChannelStatusSink {
    fn on_response(&self, line: &str) {
        // A dropped receiver means nobody is watching the feed anymore;
        // the line is simply discarded.
        let _ = self.tx.send(line.to_string());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
