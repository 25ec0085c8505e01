use noise_recorder_core::{CatalogEntry, CatalogSource, SessionError, SessionResult};

use std::{panic::Location, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::Client;
use tracing::{info, instrument};

const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog fetched with a GET from the server.
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    /// Source reading from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Catalog`] if the HTTP client cannot be built.
    #[track_caller]
    pub fn new(url: impl Into<String>) -> SessionResult<Self> {
        let client = Client::builder()
            .timeout(CATALOG_TIMEOUT)
            .build()
            .map_err(|e| SessionError::Catalog {
                reason: format!("Failed to build HTTP client: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> SessionResult<Vec<CatalogEntry>> {
        let catalog_error = |reason: String| SessionError::Catalog {
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| catalog_error(format!("Failed to fetch catalog: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(catalog_error(format!(
                "Catalog request returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| catalog_error(format!("Failed to read catalog: {}", e)))?;

        let entries = CatalogEntry::parse_list(&body)?;

        info!(entries = entries.len(), "Catalog fetched");

        Ok(entries)
    }
}
