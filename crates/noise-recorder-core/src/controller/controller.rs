use crate::{
    SessionError, SessionResult,
    capture::{CaptureDevice, ConstructionFailure, DeviceErrorKind, DeviceEvent, DeviceEventSink},
    controller::{ControllerCommand, ControllerOptions, Notice, RecorderSnapshot},
    session::{SessionState, SessionStatus},
    upload::{UploadOutcome, Uploader},
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
};
use tracing::{debug, error, info, instrument, warn};

/// Outcome of an upload, tagged with the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettlement {
    /// Attempt number carried by the uploaded artifact.
    pub attempt: u64,
    /// What the uploader reported.
    pub outcome: UploadOutcome,
}

/// Bridges a capture device's events to [`SessionState`] transitions and
/// hands finished recordings to an [`Uploader`].
///
/// All device events, caller commands, and upload settlements are handled
/// one at a time, so the session needs no locking. Uploads run on their own
/// task; their settlement comes back through a channel and is applied only
/// if it still belongs to the current attempt.
pub struct RecordingController<D: CaptureDevice> {
    session: SessionState,
    device: D,
    uploader: Arc<dyn Uploader>,
    user: String,
    chunk_interval: Duration,
    pending_prefix: Option<String>,
    in_flight: Option<u64>,
    notice: Option<Notice>,
    events_rx: Option<mpsc::UnboundedReceiver<DeviceEvent>>,
    settle_tx: mpsc::UnboundedSender<UploadSettlement>,
    settle_rx: Option<mpsc::UnboundedReceiver<UploadSettlement>>,
    snapshot_tx: watch::Sender<RecorderSnapshot>,
}

impl<D: CaptureDevice> RecordingController<D> {
    /// Construct the capture device and a Waiting session around it.
    ///
    /// `open` receives the sink the device must emit its events on.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CaptureUnavailable`] if `open` fails. No
    /// session is created in that case.
    #[track_caller]
    #[instrument(skip_all, fields(user = %options.user))]
    pub fn connect<F>(
        open: F,
        uploader: Arc<dyn Uploader>,
        options: ControllerOptions,
    ) -> SessionResult<Self>
    where
        F: FnOnce(DeviceEventSink) -> Result<D, ConstructionFailure>,
    {
        let (sink, events_rx) = DeviceEventSink::channel();

        let device = open(sink).map_err(|failure| {
            error!(kind = %failure.kind, reason = %failure.reason, "Capture device unavailable");
            SessionError::CaptureUnavailable {
                kind: failure.kind,
                reason: failure.reason,
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let mut session =
            SessionState::with_clock(options.session_id, device.file_extension(), options.clock);
        session.reset(&options.prefix)?;

        let (settle_tx, settle_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(RecorderSnapshot {
            session: session.snapshot(),
            pending_prefix: None,
            notice: None,
        });

        info!(
            session_id = %session.filename().session_id(),
            extension = session.filename().extension(),
            "RecordingController initialized"
        );

        Ok(Self {
            session,
            device,
            uploader,
            user: options.user,
            chunk_interval: options.chunk_interval,
            pending_prefix: None,
            in_flight: None,
            notice: None,
            events_rx: Some(events_rx),
            settle_tx,
            settle_rx: Some(settle_rx),
            snapshot_tx,
        })
    }

    /// Read-only view of the session.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The capture device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Receiver of snapshots published after every change.
    pub fn subscribe(&self) -> watch::Receiver<RecorderSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Ask the device to begin capturing. No-op unless Waiting.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Capture`] if the device refuses to start.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn request_start(&mut self) -> SessionResult<()> {
        if self.session.status() != SessionStatus::Waiting {
            debug!(status = %self.session.status(), "Start ignored");
            return Ok(());
        }

        self.device.start(self.chunk_interval).map_err(|fault| {
            SessionError::Capture {
                kind: fault.kind,
                reason: fault.reason,
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        debug!(interval_ms = self.chunk_interval.as_millis(), "Capture requested");

        Ok(())
    }

    /// Ask the device to stop capturing. No-op unless Recording.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Capture`] if the device refuses to stop.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn request_stop(&mut self) -> SessionResult<()> {
        if self.session.status() != SessionStatus::Recording {
            debug!(status = %self.session.status(), "Stop ignored");
            return Ok(());
        }

        self.device.stop().map_err(|fault| SessionError::Capture {
            kind: fault.kind,
            reason: fault.reason,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Use `prefix` for the next attempt.
    ///
    /// Re-arms immediately when Waiting or Uploaded. During Recording or
    /// Uploading the prefix is held and applied once the session is next
    /// re-armed, so selection never interrupts an active attempt.
    ///
    /// # Errors
    ///
    /// Propagates [`SessionError::InvalidTransition`] from the session.
    #[instrument(skip(self))]
    pub fn select(&mut self, prefix: &str) -> SessionResult<()> {
        match self.session.status() {
            SessionStatus::Waiting | SessionStatus::Uploaded => {
                self.session.reset(prefix)?;
                self.pending_prefix = None;
                self.notice = None;
            }
            SessionStatus::Recording | SessionStatus::Uploading => {
                info!(prefix, "Selection deferred until the current attempt finishes");
                self.pending_prefix = Some(prefix.to_string());
            }
        }

        self.publish();

        Ok(())
    }

    /// Return an Uploaded (or Waiting) session to Waiting, applying any
    /// deferred selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] while Recording or Uploading.
    #[instrument(skip(self))]
    pub fn rearm(&mut self) -> SessionResult<()> {
        let prefix = self
            .pending_prefix
            .clone()
            .unwrap_or_else(|| self.session.filename().prefix().to_string());

        self.session.reset(&prefix)?;
        self.pending_prefix = None;
        self.notice = None;
        self.publish();

        Ok(())
    }

    /// Apply one device event.
    ///
    /// # Errors
    ///
    /// Whatever the matching `on_device_*` handler returns.
    pub fn handle_device_event(&mut self, event: DeviceEvent) -> SessionResult<()> {
        match event {
            DeviceEvent::Started => self.on_device_start(),
            DeviceEvent::Data(bytes) => self.on_device_data(bytes),
            DeviceEvent::Stopped => self.on_device_stop(),
            DeviceEvent::Error { kind, reason } => Err(self.on_device_error(kind, reason)),
        }
    }

    /// Device reports capture has begun.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Waiting.
    pub fn on_device_start(&mut self) -> SessionResult<()> {
        self.session.begin_recording()?;
        self.notice = None;
        self.publish();
        Ok(())
    }

    /// Device delivered a chunk. Any size is accepted; empty chunks are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Recording.
    pub fn on_device_data(&mut self, bytes: Vec<u8>) -> SessionResult<()> {
        self.session.append_chunk(bytes)?;
        self.publish();
        Ok(())
    }

    /// Device reports capture has ended: finalize and start the upload.
    ///
    /// The uploader is invoked exactly once per artifact. Its settlement is
    /// applied later by [`Self::on_upload_settled`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Recording, or
    /// [`SessionError::UploadFailure`] if no runtime is available to run the
    /// upload (the session is reopened in that case).
    #[track_caller]
    #[instrument(skip(self))]
    pub fn on_device_stop(&mut self) -> SessionResult<()> {
        let artifact = self.session.end_recording()?;
        let attempt = artifact.attempt();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                self.session.mark_upload_failed()?;
                self.publish();
                return Err(SessionError::UploadFailure {
                    reason: format!("No async runtime for upload: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let uploader = Arc::clone(&self.uploader);
        let user = self.user.clone();
        let settle_tx = self.settle_tx.clone();

        info!(
            attempt,
            filename = artifact.filename(),
            bytes = artifact.len(),
            "Upload started"
        );

        handle.spawn(async move {
            let outcome = uploader.upload(artifact, &user).await;
            if settle_tx.send(UploadSettlement { attempt, outcome }).is_err() {
                debug!(attempt, "Upload settled after controller shut down");
            }
        });

        self.in_flight = Some(attempt);
        self.publish();

        Ok(())
    }

    /// Device reports a runtime fault.
    ///
    /// The session is not touched; a `Stopped` event may still follow and
    /// finalize normally.
    #[track_caller]
    pub fn on_device_error(&mut self, kind: DeviceErrorKind, reason: String) -> SessionError {
        warn!(kind = %kind, reason = %reason, status = %self.session.status(), "Capture device error");

        SessionError::Capture {
            kind,
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Apply an upload's outcome.
    ///
    /// Settlements for any attempt other than the one in flight are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UploadFailure`] when the upload failed; the
    /// session has already been reopened when this is returned.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn on_upload_settled(&mut self, settlement: UploadSettlement) -> SessionResult<()> {
        let current = self.in_flight == Some(settlement.attempt)
            && self.session.attempt() == settlement.attempt
            && self.session.status() == SessionStatus::Uploading;

        if !current {
            warn!(
                attempt = settlement.attempt,
                current_attempt = self.session.attempt(),
                status = %self.session.status(),
                "Discarding stale upload settlement"
            );
            return Ok(());
        }

        self.in_flight = None;

        match settlement.outcome {
            UploadOutcome::Success => {
                self.session.mark_uploaded()?;
                self.publish();
                Ok(())
            }
            UploadOutcome::Failure { reason } => {
                self.session.mark_upload_failed()?;
                if let Some(prefix) = self.pending_prefix.take() {
                    self.session.reset(&prefix)?;
                }
                self.publish();
                Err(SessionError::UploadFailure {
                    reason,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Wait for the next device event and apply it.
    ///
    /// # Errors
    ///
    /// [`SessionError::ChannelClosed`] if the device event stream ended,
    /// otherwise whatever the event handler returns.
    pub async fn process_next_device_event(&mut self) -> SessionResult<()> {
        let location = ErrorLocation::from(Location::caller());
        let event = match self.events_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        };
        let event = event.ok_or_else(|| SessionError::ChannelClosed {
            message: "Device event stream ended".to_string(),
            location,
        })?;

        self.handle_device_event(event)
    }

    /// Wait for the next upload settlement and apply it.
    ///
    /// # Errors
    ///
    /// Whatever [`Self::on_upload_settled`] returns.
    pub async fn process_next_settlement(&mut self) -> SessionResult<()> {
        let location = ErrorLocation::from(Location::caller());
        let settlement = match self.settle_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        };
        let settlement = settlement.ok_or_else(|| SessionError::ChannelClosed {
            message: "Upload settlement stream ended".to_string(),
            location,
        })?;

        self.on_upload_settled(settlement)
    }

    /// Drive the controller until shutdown.
    ///
    /// Device events, upload settlements, and `commands` are handled in
    /// arrival order. Errors are logged and surfaced as a notice on the next
    /// snapshot; none of them end the loop. On shutdown an active recording
    /// is stopped and any in-flight upload is awaited.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ChannelClosed`] if called on a controller whose
    /// event streams were already consumed.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<ControllerCommand>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> SessionResult<()> {
        let (Some(mut events), Some(mut settlements)) =
            (self.events_rx.take(), self.settle_rx.take())
        else {
            return Err(SessionError::ChannelClosed {
                message: "Controller event streams already consumed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        info!("RecordingController running");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("RecordingController shutting down");
                    break;
                }

                Some(event) = events.recv() => {
                    let result = self.handle_device_event(event);
                    self.report(result);
                }

                Some(settlement) = settlements.recv() => {
                    let result = self.on_upload_settled(settlement);
                    self.report(result);
                }

                cmd = commands.recv() => {
                    let result = match cmd {
                        Some(ControllerCommand::Start) => self.request_start(),
                        Some(ControllerCommand::Stop) => self.request_stop(),
                        Some(ControllerCommand::Select { prefix }) => self.select(&prefix),
                        Some(ControllerCommand::Rearm) => self.rearm(),
                        Some(ControllerCommand::Shutdown) | None => {
                            info!("Shutdown requested");
                            break;
                        }
                    };
                    self.report(result);
                }
            }
        }

        self.finish(&mut events, &mut settlements).await;

        info!("RecordingController stopped");

        Ok(())
    }

    /// Stop an active recording and wait for its upload to settle.
    async fn finish(
        &mut self,
        events: &mut mpsc::UnboundedReceiver<DeviceEvent>,
        settlements: &mut mpsc::UnboundedReceiver<UploadSettlement>,
    ) {
        if self.session.status() == SessionStatus::Recording {
            let result = self.request_stop();
            self.report(result);

            while self.session.status() == SessionStatus::Recording {
                let Some(event) = events.recv().await else {
                    break;
                };
                let result = self.handle_device_event(event);
                self.report(result);
            }
        }

        if self.in_flight.is_some() {
            info!("Waiting for in-flight upload to settle");
            while self.in_flight.is_some() {
                let Some(settlement) = settlements.recv().await else {
                    break;
                };
                let result = self.on_upload_settled(settlement);
                self.report(result);
            }
        }
    }

    fn report(&mut self, result: SessionResult<()>) {
        let Err(e) = result else {
            return;
        };

        match &e {
            SessionError::InvalidTransition { .. } => error!(error = %e, "Rejected transition"),
            _ => warn!(error = %e, "Recording error"),
        }

        if let Some(notice) = Notice::from_error(&e) {
            self.notice = Some(notice);
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(RecorderSnapshot {
            session: self.session.snapshot(),
            pending_prefix: self.pending_prefix.clone(),
            notice: self.notice.clone(),
        });
    }
}
