use crate::session::{Clock, MonotonicClock};

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

/// How often capture devices are asked to emit data.
///
/// Without a bounded interval some devices hold all data until stop.
pub const DEFAULT_CHUNK_INTERVAL: Duration = Duration::from_millis(1000);

/// Construction parameters for [`crate::RecordingController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Opaque user tag sent with every upload.
    pub user: String,
    /// Interval passed to the capture device on start.
    pub chunk_interval: Duration,
    /// Filename prefix for the first attempt.
    pub prefix: String,
    /// Session ID, fixed for the controller's lifetime.
    pub session_id: Uuid,
    /// Time source for elapsed-time tracking.
    pub clock: Arc<dyn Clock>,
}

impl ControllerOptions {
    /// Options for `user` with a fresh session ID and defaults elsewhere.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            prefix: String::new(),
            session_id: Uuid::new_v4(),
            clock: Arc::new(MonotonicClock::new()),
        }
    }
}
