use crate::session::SessionStatus;

use serde::Serialize;
use uuid::Uuid;

/// Read-only view of a [`crate::SessionState`] for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Current status.
    pub status: SessionStatus,
    /// Milliseconds between recording start and the last chunk or stop.
    pub elapsed_ms: u64,
    /// Chunks received in the current attempt.
    pub chunk_number: u64,
    /// Bytes accumulated in the current attempt.
    pub byte_count: usize,
    /// Rendered upload filename.
    pub filename: String,
    /// Session ID shared by every attempt.
    pub session_id: Uuid,
    /// Attempt counter, bumped on every recording start.
    pub attempt: u64,
}
