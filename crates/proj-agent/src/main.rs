//! Proj-Link agent entry point.
//!
//! Wires together the serial transport, the device controller, the response
//! router, and a console dispatcher, then runs the Tokio event loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML configuration
//!  └─ SerialLink::open()     -- link write handle + receive worker
//!  └─ route_responses()      -- response lines -> status sink
//!  └─ console dispatch loop
//!       ├─ power/blank/source -> DeviceControlService
//!       └─ reconnect          -> on_reconnected()
//! ```
//!
//! # Console dispatcher
//!
//! The cloud parameter session (provisioning, registration, publishing) is
//! owned outside this repository.  The console dispatcher stands in for it
//! here: each input line is parsed into the same `ParameterWrite` boundary
//! value the cloud session would deliver, and the JSON state documents the
//! controller reports are logged where the session would publish them.
//!
//! # Serial link
//!
//! With `[serial] port` set in the config file the agent drives the real
//! port; without it, writes go to a recording `MockLink` so the control path
//! can be exercised on a desk with no projector attached.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use proj_agent::application::control_device::{CommandLink, DeviceControlService, StateReporter};
use proj_agent::application::route_responses::{route_responses, StatusSink};
use proj_agent::infrastructure::cloud::{ParameterWrite, ShadowReporter};
use proj_agent::infrastructure::serial::mock::MockLink;
use proj_agent::infrastructure::serial::{SerialConfig, SerialLink, RESPONSE_CHANNEL_CAPACITY};
use proj_agent::infrastructure::status::TracingStatusSink;
use proj_agent::infrastructure::storage::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    // Initialise structured logging; RUST_LOG overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone())),
        )
        .init();

    info!("proj-link agent starting");

    // ── Serial transport ──────────────────────────────────────────────────────
    let (link, response_rx): (Arc<dyn CommandLink>, mpsc::Receiver<String>) =
        match &config.serial.port {
            Some(port) => {
                let serial_cfg = SerialConfig {
                    port: port.clone(),
                    baud_rate: config.serial.baud_rate,
                };
                let (link, rx) = SerialLink::open(&serial_cfg)
                    .with_context(|| format!("failed to open serial port {port}"))?;
                (link, rx)
            }
            None => {
                warn!("no serial port configured; running against a recording mock link");
                let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);
                // The mock link never produces response lines; park the sender
                // so the router sees an open (but silent) channel.
                tokio::spawn(async move { tx.closed().await });
                (Arc::new(MockLink::new()), rx)
            }
        };

    // ── Controller and outward reporting ──────────────────────────────────────
    let (reporter, mut shadow_rx) = ShadowReporter::channel();
    let controller = Arc::new(DeviceControlService::new(
        link,
        Arc::new(reporter) as Arc<dyn StateReporter>,
    ));

    // Response router: device replies -> status sink.
    tokio::spawn(route_responses(
        response_rx,
        Arc::new(TracingStatusSink) as Arc<dyn StatusSink>,
    ));

    // Shadow document consumer: the cloud session would publish these.
    tokio::spawn(async move {
        while let Some(doc) = shadow_rx.recv().await {
            info!(target: "shadow", "reported state: {doc}");
        }
    });

    // The connectivity layer signals an established session at startup; the
    // mirror starts from its pessimistic belief and reports it.
    controller.on_reconnected().await;

    // ── Console dispatch loop ─────────────────────────────────────────────────
    info!("ready; commands: power on|off, blank on|off, source hdmi|hdmi2|rgb, reconnect, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("console read failed")? else {
                    break; // stdin closed
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("quit") {
                    break;
                }
                if line.eq_ignore_ascii_case("reconnect") {
                    controller.on_reconnected().await;
                    continue;
                }
                let Some((name, value)) = line.split_once(char::is_whitespace) else {
                    warn!("usage: <parameter> <value>");
                    continue;
                };
                match ParameterWrite::parse(name, value.trim()) {
                    Ok(write) => dispatch(&controller, write).await,
                    Err(e) => warn!("rejected: {e}"),
                }
            }
        }
    }

    info!("proj-link agent stopped");
    Ok(())
}

/// Applies one validated parameter write to the controller.
///
/// Failures are reported to the caller side (here, the log) and nothing is
/// retried; the parameter layer reflects the unchanged value back to whoever
/// issued the request.
async fn dispatch(controller: &DeviceControlService, write: ParameterWrite) {
    let result = match write {
        ParameterWrite::Power(on) => controller.set_power(on).await,
        ParameterWrite::Blank(on) => controller.set_blank(on).await,
        ParameterWrite::Source(source) => controller.set_source(source).await,
    };
    if let Err(e) = result {
        error!("write failed: {e}");
    }
}
