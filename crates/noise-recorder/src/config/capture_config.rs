use crate::config::default_chunk_bytes;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which capture device to record from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// Replay an encoded audio file.
    #[default]
    File,
    /// Default system microphone (requires the `microphone` feature).
    Microphone,
}

/// Capture device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Device to use.
    #[serde(default)]
    pub source: CaptureSource,
    /// Input file for the file source.
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    /// Bytes the file source emits per chunk interval.
    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,
    /// Whether the file source stops by itself at end of file.
    #[serde(default)]
    pub stop_at_eof: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureSource::default(),
            input_path: None,
            chunk_bytes: default_chunk_bytes(),
            stop_at_eof: false,
        }
    }
}
