use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress of one recording attempt.
///
/// Variants are declared in order of progress; the only backward step is
/// an explicit return to [`SessionStatus::Waiting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Armed and ready to record.
    Waiting,
    /// Capture device is delivering chunks.
    Recording,
    /// Artifact handed to the uploader, awaiting its outcome.
    Uploading,
    /// Uploader reported success.
    Uploaded,
}

impl SessionStatus {
    /// Human-readable description shown by renderers.
    pub fn description(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting to record",
            Self::Recording => "Recording",
            Self::Uploading => "Recorded and uploading",
            Self::Uploaded => "Recorded and uploaded",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "Waiting",
            Self::Recording => "Recording",
            Self::Uploading => "Uploading",
            Self::Uploaded => "Uploaded",
        };
        f.write_str(name)
    }
}
