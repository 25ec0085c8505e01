use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Upload filename: `<prefix>.<session_id>.<extension>`.
///
/// The session ID is fixed for the lifetime of a [`crate::SessionState`];
/// only the prefix changes between attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filename {
    prefix: String,
    session_id: Uuid,
    extension: String,
}

impl Filename {
    pub(crate) fn new(session_id: Uuid, extension: impl Into<String>) -> Self {
        Self {
            prefix: String::new(),
            session_id,
            extension: extension.into(),
        }
    }

    /// Catalog-derived prefix of the current attempt.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Session ID shared by every attempt of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// File extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub(crate) fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.prefix, self.session_id, self.extension)
    }
}
