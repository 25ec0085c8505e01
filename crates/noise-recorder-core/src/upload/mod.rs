//! Uploader seam.
//!
//! The controller hands each finished [`Artifact`] to an [`Uploader`]
//! exactly once and waits for a single settle.

use crate::session::Artifact;

use async_trait::async_trait;

/// Multipart field carrying the recording.
pub const NOISE_FIELD: &str = "noise";

/// Multipart field carrying the user tag.
pub const USER_FIELD: &str = "user";

/// Settled result of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Transport reported success.
    Success,
    /// Transport or server failed.
    Failure {
        /// Description of the failure.
        reason: String,
    },
}

impl UploadOutcome {
    /// Create a failure outcome.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }
}

/// Delivers artifacts to their destination.
///
/// Implementations must settle every call with exactly one outcome and
/// must not retry on their own.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Deliver `artifact` on behalf of `user`.
    async fn upload(&self, artifact: Artifact, user: &str) -> UploadOutcome;
}
