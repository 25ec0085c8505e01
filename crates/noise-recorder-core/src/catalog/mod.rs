//! Catalog of noise prompts.
//!
//! Entries are loaded once at startup. The selected entry's name becomes
//! the filename prefix of the next recording attempt.

use crate::{SessionError, SessionResult, session::SessionStatus};

use std::{panic::Location, path::PathBuf};

use async_trait::async_trait;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// One noise prompt as served by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Short name, used as the filename prefix.
    pub name: String,
    /// What to record.
    #[serde(default)]
    pub desc: String,
    /// URL of an example recording.
    #[serde(default)]
    pub preview: String,
}

impl CatalogEntry {
    /// Parse a JSON array of entries, as served by the catalog endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Catalog`] on malformed JSON.
    #[track_caller]
    pub fn parse_list(json: &str) -> SessionResult<Vec<Self>> {
        serde_json::from_str(json).map_err(|e| SessionError::Catalog {
            reason: format!("Failed to parse catalog: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Catalog entry with its display status.
///
/// The display status is independent of the active session and stays at
/// its initial value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    /// The entry.
    pub entry: CatalogEntry,
    /// Status shown next to the entry.
    pub display_status: SessionStatus,
}

/// Ordered, non-empty list of entries with one selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    selected: usize,
}

impl Catalog {
    /// Build a catalog with the first entry selected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Catalog`] if `entries` is empty.
    #[track_caller]
    pub fn new(entries: Vec<CatalogEntry>) -> SessionResult<Self> {
        if entries.is_empty() {
            return Err(SessionError::Catalog {
                reason: "Catalog contains no entries".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let items = entries
            .into_iter()
            .map(|entry| CatalogItem {
                entry,
                display_status: SessionStatus::Waiting,
            })
            .collect();

        Ok(Self { items, selected: 0 })
    }

    /// All items in catalog order.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; a catalog has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the selected entry.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected entry.
    pub fn selected(&self) -> &CatalogEntry {
        &self.items[self.selected].entry
    }

    /// Select the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Catalog`] if `index` is out of range.
    #[track_caller]
    pub fn select(&mut self, index: usize) -> SessionResult<&CatalogEntry> {
        if index >= self.items.len() {
            return Err(SessionError::Catalog {
                reason: format!(
                    "No entry {} (catalog has {})",
                    index + 1,
                    self.items.len()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.selected = index;
        debug!(index, name = %self.items[index].entry.name, "Catalog entry selected");

        Ok(&self.items[index].entry)
    }

    /// Index of the entry named `name`, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.entry.name.eq_ignore_ascii_case(name))
    }
}

/// Where the catalog comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the ordered list of entries.
    async fn load(&self) -> SessionResult<Vec<CatalogEntry>>;
}

/// Catalog stored as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileCatalogSource {
    path: PathBuf,
}

impl JsonFileCatalogSource {
    /// Read entries from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalogSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> SessionResult<Vec<CatalogEntry>> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| SessionError::Catalog {
                    reason: format!("Failed to read {}: {}", self.path.display(), e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        let entries = CatalogEntry::parse_list(&contents)?;

        info!(count = entries.len(), "Catalog loaded from file");

        Ok(entries)
    }
}
