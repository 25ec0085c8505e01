use crate::config::{default_chunk_interval_ms, default_user};

use serde::{Deserialize, Serialize};

/// Recording session behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// User tag sent with every upload.
    #[serde(default = "default_user")]
    pub user: String,
    /// How often the capture device emits data, in milliseconds.
    #[serde(default = "default_chunk_interval_ms")]
    pub chunk_interval_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            chunk_interval_ms: default_chunk_interval_ms(),
        }
    }
}
