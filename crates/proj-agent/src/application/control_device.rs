//! DeviceControlService: turns validated parameter writes into serial
//! commands and keeps the device-state mirror consistent.
//!
//! This use case sits at the application layer and delegates byte transfer to
//! a [`CommandLink`] trait object; the serial implementation lives in the
//! infrastructure layer and tests substitute a recording fake.  Confirmed
//! updates are pushed outward through a [`StateReporter`].
//!
//! # Atomicity
//!
//! Every public operation runs as one validate → encode → write → update
//! sequence under a single mirror lock.  Holding the lock across the write
//! await is deliberate: a concurrent source change and reconnect reset must
//! not interleave into a mirrored state that violates the blank/power
//! invariant.  A write failure propagates before the mirror is touched, so a
//! failed call has no observable effect on mirrored state.

use std::sync::Arc;

use async_trait::async_trait;
use proj_core::{encode_command, Command, DeviceState, Source, StateUpdate};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Error type for serial link writes.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The link accepted fewer bytes than the framed command length.  The
    /// write is all-or-nothing; nothing retries the remainder.
    #[error("short write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    /// The link rejected the write outright.
    #[error("link write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for device-control operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Blanking was requested while the mirrored power state is off.
    /// No bytes were written and the mirror is unchanged.
    #[error("blank requires power on")]
    PowerIsOff,

    /// The transport failed to deliver the framed command.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Write side of the serial transport.
///
/// Implementations must treat a frame as all-or-nothing: a partial write is a
/// [`LinkError::ShortWrite`], never a silent success.
#[async_trait]
pub trait CommandLink: Send + Sync {
    /// Writes one framed command to the link.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] if the link rejects the write or accepts only
    /// part of the frame.
    async fn write_frame(&self, frame: &[u8]) -> Result<(), LinkError>;
}

/// Outward reporting sink for confirmed mirror updates.
///
/// The shipped implementation serializes updates as JSON state documents for
/// the cloud parameter layer; tests record them.
pub trait StateReporter: Send + Sync {
    /// Reports the fields changed by one confirmed operation.
    fn report(&self, update: StateUpdate);
}

/// The device-control use case.
///
/// Owns the mirror exclusively; the cloud-facing write handlers and the
/// connectivity resynchronizer both go through this instance and therefore
/// share its lock.
pub struct DeviceControlService {
    link: Arc<dyn CommandLink>,
    reporter: Arc<dyn StateReporter>,
    mirror: Mutex<DeviceState>,
}

impl DeviceControlService {
    /// Creates the service with the given link and reporter.  The mirror
    /// starts at the pessimistic defaults (off, unblanked, HDMI).
    pub fn new(link: Arc<dyn CommandLink>, reporter: Arc<dyn StateReporter>) -> Self {
        Self {
            link,
            reporter,
            mirror: Mutex::new(DeviceState::default()),
        }
    }

    /// Returns a copy of the mirrored state.
    pub async fn state(&self) -> DeviceState {
        *self.mirror.lock().await
    }

    /// Sets projector power.
    ///
    /// On success the mirror reflects the new power state; powering off also
    /// forces `blank = false` in the same update and both values are
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Link`] if the transport rejects the frame; the
    /// mirror is unchanged in that case.
    pub async fn set_power(&self, on: bool) -> Result<(), ControlError> {
        let mut mirror = self.mirror.lock().await;
        let cmd = if on { Command::PowerOn } else { Command::PowerOff };
        self.link.write_frame(&encode_command(cmd)).await?;
        let update = mirror.apply_power(on);
        self.reporter.report(update);
        Ok(())
    }

    /// Sets picture blanking.  Only legal while the mirrored power is on.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::PowerIsOff`] — with no write attempted — if
    /// the mirror shows power off, or [`ControlError::Link`] if the transport
    /// rejects the frame.
    pub async fn set_blank(&self, on: bool) -> Result<(), ControlError> {
        let mut mirror = self.mirror.lock().await;
        if !mirror.power {
            debug!("blank write rejected: mirrored power is off");
            return Err(ControlError::PowerIsOff);
        }
        let cmd = if on { Command::BlankOn } else { Command::BlankOff };
        self.link.write_frame(&encode_command(cmd)).await?;
        let update = mirror.apply_blank(on);
        self.reporter.report(update);
        Ok(())
    }

    /// Selects the input source.  Unlike blanking, source selection carries
    /// no power precondition.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Link`] if the transport rejects the frame; the
    /// mirror is unchanged in that case.
    pub async fn set_source(&self, source: Source) -> Result<(), ControlError> {
        let mut mirror = self.mirror.lock().await;
        self.link
            .write_frame(&encode_command(Command::SelectSource(source)))
            .await?;
        let update = mirror.apply_source(source);
        self.reporter.report(update);
        Ok(())
    }

    /// Connectivity resynchronizer: called whenever the cloud/control channel
    /// transitions to connected, including the very first connection.
    ///
    /// Forces the mirror to `power = false, blank = false` (source untouched)
    /// and reports both values — no bytes are written to the link.
    pub async fn on_reconnected(&self) {
        let mut mirror = self.mirror.lock().await;
        debug!("connection established; resetting mirror to pessimistic state");
        let update = mirror.reset_for_reconnect();
        self.reporter.report(update);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // ── Recording fakes ───────────────────────────────────────────────────────

    /// Outcome applied to every write on the fake link.
    #[derive(Clone, Copy)]
    enum WriteOutcome {
        Accept,
        Refuse,
        Short(usize),
    }

    /// Records every frame passed to `write_frame`, or fails with the
    /// configured outcome without recording.
    struct RecordingLink {
        frames: StdMutex<Vec<Vec<u8>>>,
        outcome: StdMutex<WriteOutcome>,
    }

    impl RecordingLink {
        fn new() -> Self {
            Self {
                frames: StdMutex::new(Vec::new()),
                outcome: StdMutex::new(WriteOutcome::Accept),
            }
        }

        fn set_outcome(&self, outcome: WriteOutcome) {
            *self.outcome.lock().unwrap() = outcome;
        }

        fn frames_as_text(&self) -> Vec<String> {
            self.frames
                .lock()
                .unwrap()
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect()
        }
    }

    #[async_trait]
    impl CommandLink for RecordingLink {
        async fn write_frame(&self, frame: &[u8]) -> Result<(), LinkError> {
            match *self.outcome.lock().unwrap() {
                WriteOutcome::Accept => {
                    self.frames.lock().unwrap().push(frame.to_vec());
                    Ok(())
                }
                WriteOutcome::Refuse => Err(LinkError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "injected failure",
                ))),
                WriteOutcome::Short(written) => Err(LinkError::ShortWrite {
                    written,
                    expected: frame.len(),
                }),
            }
        }
    }

    /// Records every reported update in call order.
    #[derive(Default)]
    struct RecordingReporter {
        updates: StdMutex<Vec<StateUpdate>>,
    }

    impl StateReporter for RecordingReporter {
        fn report(&self, update: StateUpdate) {
            self.updates.lock().unwrap().push(update);
        }
    }

    fn make_service() -> (
        DeviceControlService,
        Arc<RecordingLink>,
        Arc<RecordingReporter>,
    ) {
        let link = Arc::new(RecordingLink::new());
        let reporter = Arc::new(RecordingReporter::default());
        let service = DeviceControlService::new(
            Arc::clone(&link) as Arc<dyn CommandLink>,
            Arc::clone(&reporter) as Arc<dyn StateReporter>,
        );
        (service, link, reporter)
    }

    // ── Power ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_set_power_on_writes_frame_and_updates_mirror() {
        // Arrange
        let (service, link, reporter) = make_service();

        // Act
        service.set_power(true).await.unwrap();

        // Assert
        assert_eq!(link.frames_as_text(), vec!["\r*pow=on#\r"]);
        let state = service.state().await;
        assert!(state.power);
        assert!(!state.blank);
        assert_eq!(
            *reporter.updates.lock().unwrap(),
            vec![StateUpdate {
                power: Some(true),
                ..StateUpdate::default()
            }]
        );
    }

    #[tokio::test]
    async fn test_set_power_off_cascades_blank_and_reports_both() {
        // Arrange: powered on and blanked
        let (service, link, reporter) = make_service();
        service.set_power(true).await.unwrap();
        service.set_blank(true).await.unwrap();

        // Act
        service.set_power(false).await.unwrap();

        // Assert – one pow=off frame, no blank frame for the cascade
        assert_eq!(
            link.frames_as_text(),
            vec!["\r*pow=on#\r", "\r*blank=on#\r", "\r*pow=off#\r"]
        );
        let state = service.state().await;
        assert!(!state.power);
        assert!(!state.blank);
        let last = *reporter.updates.lock().unwrap().last().unwrap();
        assert_eq!(last.power, Some(false));
        assert_eq!(last.blank, Some(false));
    }

    #[tokio::test]
    async fn test_set_power_write_failure_leaves_mirror_unchanged() {
        // Arrange
        let (service, link, reporter) = make_service();
        link.set_outcome(WriteOutcome::Refuse);

        // Act
        let result = service.set_power(true).await;

        // Assert
        assert!(matches!(result, Err(ControlError::Link(_))));
        assert!(!service.state().await.power);
        assert!(reporter.updates.lock().unwrap().is_empty());
    }

    // ── Blank ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_set_blank_while_power_off_writes_nothing() {
        // Arrange
        let (service, link, reporter) = make_service();

        // Act
        let result = service.set_blank(true).await;

        // Assert – rejected before any bytes reach the link
        assert!(matches!(result, Err(ControlError::PowerIsOff)));
        assert!(link.frames_as_text().is_empty());
        assert_eq!(service.state().await, DeviceState::default());
        assert!(reporter.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_blank_while_powered_succeeds() {
        let (service, link, _reporter) = make_service();
        service.set_power(true).await.unwrap();

        service.set_blank(true).await.unwrap();

        assert_eq!(
            link.frames_as_text(),
            vec!["\r*pow=on#\r", "\r*blank=on#\r"]
        );
        assert!(service.state().await.blank);
    }

    #[tokio::test]
    async fn test_set_blank_short_write_leaves_mirror_unchanged() {
        // Arrange
        let (service, link, _reporter) = make_service();
        service.set_power(true).await.unwrap();
        link.set_outcome(WriteOutcome::Short(3));

        // Act
        let result = service.set_blank(true).await;

        // Assert
        assert!(matches!(
            result,
            Err(ControlError::Link(LinkError::ShortWrite { written: 3, .. }))
        ));
        assert!(!service.state().await.blank);
    }

    // ── Source ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_set_source_has_no_power_precondition() {
        // Arrange: power off
        let (service, link, _reporter) = make_service();

        // Act – source selection is always legal
        service.set_source(Source::Rgb).await.unwrap();

        // Assert
        assert_eq!(link.frames_as_text(), vec!["\r*sour=rgb#\r"]);
        assert_eq!(service.state().await.source, Source::Rgb);
    }

    // ── Reconnect ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_on_reconnected_resets_mirror_without_writing() {
        // Arrange: on, blanked, RGB
        let (service, link, reporter) = make_service();
        service.set_power(true).await.unwrap();
        service.set_blank(true).await.unwrap();
        service.set_source(Source::Rgb).await.unwrap();
        let frames_before = link.frames_as_text().len();

        // Act
        service.on_reconnected().await;

        // Assert – mirror pessimistic, source untouched, zero new frames
        let state = service.state().await;
        assert_eq!(
            state,
            DeviceState {
                power: false,
                blank: false,
                source: Source::Rgb,
            }
        );
        assert_eq!(link.frames_as_text().len(), frames_before);
        let last = *reporter.updates.lock().unwrap().last().unwrap();
        assert_eq!(last.power, Some(false));
        assert_eq!(last.blank, Some(false));
        assert_eq!(last.source, None);
    }

    // ── Invariant ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_invariant_holds_across_operation_sequence() {
        let (service, _link, _reporter) = make_service();

        // Interleave every operation kind; the invariant must hold at each
        // quiescent point.
        assert!(service.set_blank(true).await.is_err());
        assert!(service.state().await.invariant_holds());

        service.set_power(true).await.unwrap();
        assert!(service.state().await.invariant_holds());

        service.set_blank(true).await.unwrap();
        assert!(service.state().await.invariant_holds());

        service.set_source(Source::Hdmi2).await.unwrap();
        assert!(service.state().await.invariant_holds());

        service.set_power(false).await.unwrap();
        assert!(service.state().await.invariant_holds());

        service.on_reconnected().await;
        assert!(service.state().await.invariant_holds());
    }
}
