use std::sync::Arc;

/// Finalized recording handed to the uploader.
///
/// Bytes are shared immutably; nothing upstream can alter them once the
/// artifact exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Arc<[u8]>,
    filename: String,
    attempt: u64,
}

impl Artifact {
    pub(crate) fn new(bytes: Vec<u8>, filename: String, attempt: u64) -> Self {
        Self {
            bytes: bytes.into(),
            filename,
            attempt,
        }
    }

    /// Concatenated chunk bytes in arrival order.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Rendered filename, e.g. `rain.<session id>.webm`.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Attempt number this artifact was produced by.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes were captured.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
