use crate::{
    SessionError, SessionResult,
    session::{Artifact, Clock, Filename, MonotonicClock, SessionSnapshot, SessionStatus},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Authoritative model of one recording session.
///
/// Owns every mutation rule of the recording state machine:
///
/// ```text
/// Waiting --begin_recording--> Recording --end_recording--> Uploading
/// Uploading --mark_uploaded--> Uploaded --reset--> Waiting
/// Uploading --mark_upload_failed--> Waiting
/// Waiting --reset--> Waiting
/// ```
///
/// Every operation checks its precondition before touching any field, so a
/// rejected call leaves the state exactly as it was.
///
/// # Thread Safety
///
/// SessionState is NOT internally synchronized. It is owned by a single
/// [`crate::RecordingController`], which serializes all device callbacks.
#[derive(Debug)]
pub struct SessionState {
    status: SessionStatus,
    start_time_ms: Option<u64>,
    elapsed_ms: u64,
    chunks: Vec<Vec<u8>>,
    chunk_number: u64,
    filename: Filename,
    attempt: u64,
    clock: Arc<dyn Clock>,
}

impl SessionState {
    /// Creates a Waiting session with a fresh session ID and the system clock.
    pub fn new(extension: impl Into<String>) -> Self {
        Self::with_clock(Uuid::new_v4(), extension, Arc::new(MonotonicClock::new()))
    }

    /// Creates a Waiting session with an explicit session ID and clock.
    pub fn with_clock(
        session_id: Uuid,
        extension: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            status: SessionStatus::Waiting,
            start_time_ms: None,
            elapsed_ms: 0,
            chunks: Vec::new(),
            chunk_number: 0,
            filename: Filename::new(session_id, extension),
            attempt: 0,
            clock,
        }
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Clock reading when recording began; `None` outside Recording.
    pub fn start_time_ms(&self) -> Option<u64> {
        self.start_time_ms
    }

    /// Milliseconds from recording start to the most recent chunk or stop.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Chunks received so far, in arrival order.
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Number of chunks received in the current attempt.
    pub fn chunk_number(&self) -> u64 {
        self.chunk_number
    }

    /// Upload filename parts.
    pub fn filename(&self) -> &Filename {
        &self.filename
    }

    /// Attempt counter, incremented on every transition into Recording.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Copy of the renderable fields.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            elapsed_ms: self.elapsed_ms,
            chunk_number: self.chunk_number,
            byte_count: self.chunks.iter().map(Vec::len).sum(),
            filename: self.filename.to_string(),
            session_id: self.filename.session_id(),
            attempt: self.attempt,
        }
    }

    /// Re-arms the session for a new attempt under `prefix`.
    ///
    /// Legal from Waiting (idempotent) and Uploaded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] while Recording or Uploading.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.filename.session_id()))]
    pub fn reset(&mut self, prefix: &str) -> SessionResult<()> {
        match self.status {
            SessionStatus::Waiting | SessionStatus::Uploaded => {}
            SessionStatus::Recording | SessionStatus::Uploading => {
                return Err(self.reject("reset"));
            }
        }

        self.enter_waiting();
        self.filename.set_prefix(prefix);

        debug!(filename = %self.filename, "Session re-armed");

        Ok(())
    }

    /// Marks the start of capture.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Waiting.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.filename.session_id()))]
    pub fn begin_recording(&mut self) -> SessionResult<()> {
        if self.status != SessionStatus::Waiting {
            return Err(self.reject("begin recording"));
        }

        self.start_time_ms = Some(self.clock.now_ms());
        self.elapsed_ms = 0;
        self.attempt += 1;
        self.status = SessionStatus::Recording;

        info!(attempt = self.attempt, filename = %self.filename, "Recording started");

        Ok(())
    }

    /// Appends one chunk delivered by the capture device.
    ///
    /// Zero-length chunks are dropped without touching any field; devices
    /// emit them at stream boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Recording.
    #[track_caller]
    pub fn append_chunk(&mut self, bytes: Vec<u8>) -> SessionResult<()> {
        if self.status != SessionStatus::Recording {
            return Err(self.reject("append chunk"));
        }

        if bytes.is_empty() {
            return Ok(());
        }

        self.chunk_number += 1;
        debug!(
            chunk_number = self.chunk_number,
            bytes = bytes.len(),
            "Pushing chunk #{}",
            self.chunk_number
        );

        self.chunks.push(bytes);
        self.recompute_elapsed();

        Ok(())
    }

    /// Finishes capture and produces the artifact for upload.
    ///
    /// The returned bytes are the chunks concatenated in arrival order. The
    /// chunks stay in the session until it next returns to Waiting.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Recording.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.filename.session_id()))]
    pub fn end_recording(&mut self) -> SessionResult<Artifact> {
        if self.status != SessionStatus::Recording {
            return Err(self.reject("end recording"));
        }

        self.recompute_elapsed();
        self.start_time_ms = None;
        self.status = SessionStatus::Uploading;

        let bytes = self.chunks.concat();
        let artifact = Artifact::new(bytes, self.filename.to_string(), self.attempt);

        info!(
            attempt = self.attempt,
            elapsed_ms = self.elapsed_ms,
            chunk_count = self.chunk_number,
            bytes = artifact.len(),
            filename = artifact.filename(),
            "Recording finished"
        );

        Ok(artifact)
    }

    /// Records a successful upload.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Uploading.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.filename.session_id()))]
    pub fn mark_uploaded(&mut self) -> SessionResult<()> {
        if self.status != SessionStatus::Uploading {
            return Err(self.reject("mark uploaded"));
        }

        self.status = SessionStatus::Uploaded;
        info!(attempt = self.attempt, "Upload complete");

        Ok(())
    }

    /// Records a failed upload and reopens the session.
    ///
    /// The failed attempt's chunks are discarded; the prefix is kept so the
    /// user can record again straight away.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless Uploading.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.filename.session_id()))]
    pub fn mark_upload_failed(&mut self) -> SessionResult<()> {
        if self.status != SessionStatus::Uploading {
            return Err(self.reject("mark upload failed"));
        }

        self.enter_waiting();
        info!(attempt = self.attempt, "Upload failed, session reopened");

        Ok(())
    }

    fn enter_waiting(&mut self) {
        self.chunks.clear();
        self.chunk_number = 0;
        self.elapsed_ms = 0;
        self.start_time_ms = None;
        self.status = SessionStatus::Waiting;
    }

    fn recompute_elapsed(&mut self) {
        if let Some(start) = self.start_time_ms {
            self.elapsed_ms = self.clock.now_ms().saturating_sub(start);
        }
    }

    #[track_caller]
    fn reject(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            from: self.status,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
