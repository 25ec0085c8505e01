use crate::{
    capture::{ConstructionErrorKind, DeviceErrorKind},
    session::SessionStatus,
};

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording session errors with source location tracking.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A state change was requested that is not legal from the current status.
    ///
    /// The session is left exactly as it was before the call.
    #[error("Invalid transition: cannot {operation} while {from} {location}")]
    InvalidTransition {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Status the session was in when the operation was attempted.
        from: SessionStatus,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device could not be constructed.
    #[error("Capture unavailable ({kind}): {reason} {location}")]
    CaptureUnavailable {
        /// Construction failure kind reported by the device.
        kind: ConstructionErrorKind,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Runtime fault reported by the capture device.
    #[error("Capture error ({kind}): {reason} {location}")]
    Capture {
        /// Device error kind.
        kind: DeviceErrorKind,
        /// Description of the fault.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Network or server fault while delivering an artifact.
    #[error("Upload failed: {reason} {location}")]
    UploadFailure {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Catalog could not be loaded or is unusable.
    #[error("Catalog error: {reason} {location}")]
    Catalog {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An internal channel closed unexpectedly.
    #[error("Channel closed: {message} {location}")]
    ChannelClosed {
        /// Which channel closed.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
