//! Serial transport: owns the physical link to the projector.
//!
//! Architecture:
//! - `SerialLink` owns the write half of the port and implements
//!   [`CommandLink`] for the controller.
//! - A spawned receive worker owns the read half exclusively.  It polls with
//!   a bounded wait so it stays responsive without busy-spinning, reads up to
//!   a fixed-size chunk per cycle, trims it, and forwards each non-empty
//!   result on an `mpsc` channel.  Chunk boundaries are the only framing: the
//!   device sends one reply per command with no interleaving.
//! - Link faults surfaced by the driver (overflow, parity/framing errors)
//!   are absorbed here: pending input is discarded and nothing is delivered
//!   or propagated.  The transport favors availability over completeness of
//!   lost data.

pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proj_core::trim_response;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, Mutex};
use tokio::time;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info, warn};

use crate::application::control_device::{CommandLink, LinkError};

/// Receive chunk size; sized to hold at least one full response.
const READ_CHUNK: usize = 256;
/// Bounded wait per receive poll cycle.
const READ_POLL: Duration = Duration::from_millis(100);
/// Bounded wait per drain cycle after a link fault.
const DRAIN_POLL: Duration = Duration::from_millis(10);
/// Capacity of the response handoff channel.
pub const RESPONSE_CHANNEL_CAPACITY: usize = 32;

/// Configuration for the serial link.  The projector side is fixed at
/// 8 data bits, no parity, 1 stop bit, no hardware flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port identifier, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    /// Baud rate matching the projector's RS-232 setting.
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
        }
    }
}

/// The serial command link.
///
/// Created by [`SerialLink::open`], which also starts the receive worker and
/// hands back the channel it delivers trimmed response lines on.
pub struct SerialLink {
    writer: Mutex<WriteHalf<SerialStream>>,
}

impl SerialLink {
    /// Opens the port and starts the receive worker.
    ///
    /// Returns the link write handle and the receiver of trimmed response
    /// lines.  Must be called within a Tokio runtime (the worker is spawned
    /// immediately).
    ///
    /// # Errors
    ///
    /// Returns the underlying serial error if the port cannot be opened or
    /// configured.
    pub fn open(
        config: &SerialConfig,
    ) -> Result<(Arc<Self>, mpsc::Receiver<String>), tokio_serial::Error> {
        let stream = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open_native_async()?;

        info!(
            "opened serial port {} at {} baud",
            config.port, config.baud_rate
        );

        let (reader, writer) = tokio::io::split(stream);
        let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);
        tokio::spawn(receive_worker(reader, tx));

        Ok((
            Arc::new(Self {
                writer: Mutex::new(writer),
            }),
            rx,
        ))
    }
}

#[async_trait]
impl CommandLink for SerialLink {
    /// Writes the frame in a single call.  A short write is an error, not a
    /// retry: the caller must be able to assume all-or-nothing delivery.
    async fn write_frame(&self, frame: &[u8]) -> Result<(), LinkError> {
        let mut writer = self.writer.lock().await;
        let text = String::from_utf8_lossy(frame);
        debug!("sending: {}", text.trim_matches('\r'));

        let written = writer.write(frame).await?;
        if written != frame.len() {
            return Err(LinkError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }
        writer.flush().await?;
        Ok(())
    }
}

/// The receive worker: runs for the lifetime of the process.
///
/// Each cycle polls the port with a bounded wait, trims whatever arrived, and
/// forwards the result if non-empty.  Read errors are treated as link faults:
/// logged, pending input drained, nothing delivered.
async fn receive_worker(mut reader: ReadHalf<SerialStream>, tx: mpsc::Sender<String>) {
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = match time::timeout(READ_POLL, reader.read(&mut chunk)).await {
            // Poll expired with nothing to read.
            Err(_) => continue,
            Ok(Ok(0)) => {
                warn!("serial port closed; receive worker exiting");
                break;
            }
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!("serial link fault: {e}; discarding buffered input");
                drain_input(&mut reader, &mut chunk).await;
                continue;
            }
        };

        let text = trim_response(&chunk[..n]);
        if text.is_empty() {
            continue;
        }
        let line = String::from_utf8_lossy(text).into_owned();
        debug!("response: {line}");

        if tx.send(line).await.is_err() {
            debug!("response receiver dropped; receive worker exiting");
            break;
        }
    }
}

/// Swallows pending bytes after a link fault so a torn response is never
/// delivered.  Stops at the first quiet poll or repeated error.
async fn drain_input(reader: &mut ReadHalf<SerialStream>, chunk: &mut [u8]) {
    while let Ok(Ok(n)) = time::timeout(DRAIN_POLL, reader.read(chunk)).await {
        if n == 0 {
            return;
        }
    }
}
