//! Capture device seam.
//!
//! A device is driven by `start`/`stop` and reports its lifecycle through a
//! [`DeviceEventSink`]. Events from one device must arrive in order, with
//! `Stopped` after every `Data` of the same attempt.

use std::{fmt, time::Duration};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

/// Runtime fault kinds a capture device can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceErrorKind {
    /// The device cannot record right now.
    InvalidState,
    /// Recording the source is not permitted.
    Security,
    /// Anything else.
    Other,
}

impl DeviceErrorKind {
    /// Message suitable for showing to the user.
    pub fn notice(self) -> &'static str {
        match self {
            Self::InvalidState => "You can't record the audio right now. Try again later.",
            Self::Security => {
                "Recording the specified source is not allowed due to security restrictions."
            }
            Self::Other => "A problem occurred while trying to record the audio.",
        }
    }
}

impl fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidState => "InvalidState",
            Self::Security => "Security",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Reasons a capture device could not be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstructionErrorKind {
    /// The requested encoding or container is not supported.
    UnsupportedFormat,
    /// Anything else (missing input, no permission, no hardware).
    Other,
}

impl fmt::Display for ConstructionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsupportedFormat => "UnsupportedFormat",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Synchronous construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionFailure {
    /// Failure kind.
    pub kind: ConstructionErrorKind,
    /// Description of the failure.
    pub reason: String,
}

impl ConstructionFailure {
    /// Create a failure of `kind`.
    pub fn new(kind: ConstructionErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Synchronous failure of a `start` or `stop` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFault {
    /// Fault kind.
    pub kind: DeviceErrorKind,
    /// Description of the fault.
    pub reason: String,
}

impl DeviceFault {
    /// Create a fault of `kind`.
    pub fn new(kind: DeviceErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Lifecycle and data events emitted by a capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Capture has begun.
    Started,
    /// One encoded chunk. May be empty at stream boundaries.
    Data(Vec<u8>),
    /// Capture has ended; no further `Data` follows for this attempt.
    Stopped,
    /// Runtime fault. A `Stopped` event may or may not follow.
    Error {
        /// Fault kind.
        kind: DeviceErrorKind,
        /// Description of the fault.
        reason: String,
    },
}

/// Sending half of a device's event stream.
///
/// Cheap to clone; clones feed the same receiver, so a device can hand one
/// to its audio callback and keep another for lifecycle events.
#[derive(Debug, Clone)]
pub struct DeviceEventSink {
    tx: mpsc::UnboundedSender<DeviceEvent>,
}

impl DeviceEventSink {
    /// Create a sink and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DeviceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report that capture has begun.
    pub fn started(&self) {
        self.emit(DeviceEvent::Started);
    }

    /// Deliver one chunk.
    pub fn data(&self, bytes: Vec<u8>) {
        self.emit(DeviceEvent::Data(bytes));
    }

    /// Report that capture has ended.
    pub fn stopped(&self) {
        self.emit(DeviceEvent::Stopped);
    }

    /// Report a runtime fault.
    pub fn error(&self, kind: DeviceErrorKind, reason: impl Into<String>) {
        self.emit(DeviceEvent::Error {
            kind,
            reason: reason.into(),
        });
    }

    fn emit(&self, event: DeviceEvent) {
        // Receiver gone means the controller shut down; nothing to deliver to.
        if self.tx.send(event).is_err() {
            trace!("Device event dropped, controller no longer listening");
        }
    }
}

/// A source of encoded audio chunks.
///
/// Implementations must emit data at most `chunk_interval` apart while
/// capturing, so that data is available before an explicit stop.
pub trait CaptureDevice: Send {
    /// Begin capturing. `Started` is emitted once capture is live.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceFault`] if capture cannot begin.
    fn start(&mut self, chunk_interval: Duration) -> Result<(), DeviceFault>;

    /// Request the end of capture. Remaining data and `Stopped` follow.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceFault`] if the device is not capturing.
    fn stop(&mut self) -> Result<(), DeviceFault>;

    /// Extension of the container the chunks belong to, without the dot.
    fn file_extension(&self) -> &str;
}

impl<D: CaptureDevice + ?Sized> CaptureDevice for Box<D> {
    fn start(&mut self, chunk_interval: Duration) -> Result<(), DeviceFault> {
        (**self).start(chunk_interval)
    }

    fn stop(&mut self) -> Result<(), DeviceFault> {
        (**self).stop()
    }

    fn file_extension(&self) -> &str {
        (**self).file_extension()
    }
}
