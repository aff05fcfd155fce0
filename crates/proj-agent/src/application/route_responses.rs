//! Response routing from the transport's receive worker to the status sink.
//!
//! The receive worker and the controller run in different execution contexts,
//! so response delivery is a channel handoff rather than a direct call into
//! shared state.  No attempt is made to correlate a response with the command
//! that provoked it: the protocol is fire-and-forget plus an independent
//! best-effort status feed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

/// Outward push sink for device response lines.
pub trait StatusSink: Send + Sync {
    /// Receives one non-empty trimmed response line, verbatim.
    fn on_response(&self, line: &str);
}

/// Forwards response lines from the transport channel to the sink.
///
/// Runs until the channel closes (i.e. the transport's receive worker has
/// exited).  Intended to be spawned as its own task.
pub async fn route_responses(mut rx: mpsc::Receiver<String>, sink: Arc<dyn StatusSink>) {
    while let Some(line) = rx.recv().await {
        sink.on_response(&line);
    }
    debug!("response channel closed; router exiting");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
