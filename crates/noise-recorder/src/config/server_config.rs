use crate::config::{default_base_url, default_catalog_path, default_upload_path};

use serde::{Deserialize, Serialize};

/// Upload server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Scheme, host, and port of the server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path recordings are POSTed to.
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    /// Path the catalog JSON is fetched from.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

impl ServerConfig {
    /// Full upload URL.
    pub fn upload_url(&self) -> String {
        endpoint(&self.base_url, &self.upload_path)
    }

    /// Full catalog URL.
    pub fn catalog_url(&self) -> String {
        endpoint(&self.base_url, &self.catalog_path)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            catalog_path: default_catalog_path(),
        }
    }
}

/// Join a base URL and a path with exactly one slash between them.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
