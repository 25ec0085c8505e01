mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod recorder_config;
mod server_config;

pub(crate) use {
    capture_config::{CaptureConfig, CaptureSource},
    config::Config,
    recorder_config::RecorderConfig,
    server_config::ServerConfig,
};

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub(crate) const DEFAULT_UPLOAD_PATH: &str = "/upload";
pub(crate) const DEFAULT_CATALOG_PATH: &str = "/noises";
pub(crate) const DEFAULT_USER: &str = "you";
pub(crate) const DEFAULT_CHUNK_INTERVAL_MS: u64 = 1000;
pub(crate) const DEFAULT_CHUNK_BYTES: usize = 16 * 1024;

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_upload_path() -> String {
    DEFAULT_UPLOAD_PATH.to_string()
}

pub(crate) fn default_catalog_path() -> String {
    DEFAULT_CATALOG_PATH.to_string()
}

pub(crate) fn default_user() -> String {
    DEFAULT_USER.to_string()
}

pub(crate) fn default_chunk_interval_ms() -> u64 {
    DEFAULT_CHUNK_INTERVAL_MS
}

pub(crate) fn default_chunk_bytes() -> usize {
    DEFAULT_CHUNK_BYTES
}
