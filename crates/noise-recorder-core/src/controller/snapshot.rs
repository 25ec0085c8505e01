use crate::{SessionError, session::SessionSnapshot};

use serde::Serialize;

/// User-facing message about the last fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Text to show.
    pub message: String,
}

impl Notice {
    /// Notice for `error`, or `None` for errors the user cannot act on.
    pub fn from_error(error: &SessionError) -> Option<Self> {
        let message = match error {
            SessionError::InvalidTransition { .. } | SessionError::ChannelClosed { .. } => {
                return None;
            }
            SessionError::CaptureUnavailable { reason, .. } => {
                format!("Recording is not available: {}", reason)
            }
            SessionError::Capture { kind, .. } => kind.notice().to_string(),
            SessionError::UploadFailure { reason, .. } => {
                format!("Upload failed ({}). Record again to retry.", reason)
            }
            SessionError::Catalog { reason, .. } => reason.clone(),
        };
        Some(Self { message })
    }
}

/// Everything a renderer needs, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecorderSnapshot {
    /// Session fields.
    pub session: SessionSnapshot,
    /// Prefix selected during an active attempt, applied to the next one.
    pub pending_prefix: Option<String>,
    /// Last fault worth telling the user about.
    pub notice: Option<Notice>,
}
