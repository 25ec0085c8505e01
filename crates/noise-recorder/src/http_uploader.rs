//! Multipart HTTP uploader.
//!
//! Posts each artifact as form field `noise` (with its filename) and the user
//! tag as form field `user`.

use crate::{AppError, AppResult};

use noise_recorder_core::{Artifact, NOISE_FIELD, USER_FIELD, UploadOutcome, Uploader};

use std::{panic::Location, path::Path, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use tracing::{info, instrument, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// MIME type for a recording filename, by extension.
pub fn content_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("webm") => "audio/webm",
        Some("ogg") | Some("opus") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("mp4") | Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

/// [`Uploader`] posting to a fixed URL.
pub struct HttpUploader {
    client: Client,
    url: String,
}

impl HttpUploader {
    /// Uploader posting to `url`.
    ///
    /// Only connecting is bounded; once the server accepts the connection the
    /// upload runs until it settles.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::HttpClient`] if the HTTP client cannot be built.
    #[track_caller]
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpClient {
                reason: format!("Failed to build HTTP client: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn form(artifact: &Artifact, user: &str) -> Result<Form, reqwest::Error> {
        let noise = Part::bytes(artifact.bytes().to_vec())
            .file_name(artifact.filename().to_string())
            .mime_str(content_type(artifact.filename()))?;

        Ok(Form::new()
            .part(NOISE_FIELD, noise)
            .text(USER_FIELD, user.to_string()))
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    #[instrument(skip_all, fields(filename = %artifact.filename(), attempt = artifact.attempt()))]
    async fn upload(&self, artifact: Artifact, user: &str) -> UploadOutcome {
        let form = match Self::form(&artifact, user) {
            Ok(form) => form,
            Err(e) => return UploadOutcome::failure(format!("Invalid upload form: {}", e)),
        };

        let response = match self.client.post(&self.url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %self.url, error = %e, "Upload request failed");
                return UploadOutcome::failure(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = %status, "Upload rejected");
            return UploadOutcome::failure(format!("server returned {}", status));
        }

        info!(bytes = artifact.len(), status = %status, "Upload complete");

        UploadOutcome::Success
    }
}
