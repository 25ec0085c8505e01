use crate::config::{CaptureSource, Config};

use std::path::PathBuf;

use clap::Parser;

/// Record noise prompts and upload them.
#[derive(Debug, Default, Parser)]
#[command(name = "noise-recorder", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Encoded audio file to record from instead of the configured source.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// User tag sent with each upload.
    #[arg(long)]
    pub user: Option<String>,

    /// Catalog entry to select at startup.
    #[arg(long)]
    pub noise: Option<String>,

    /// Load the catalog from a local JSON file instead of the server.
    #[arg(long)]
    pub catalog_file: Option<PathBuf>,

    /// Server base URL, e.g. http://localhost:3000.
    #[arg(long)]
    pub server: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.capture.source = CaptureSource::File;
            config.capture.input_path = Some(input.clone());
        }
        if let Some(user) = &self.user {
            config.recorder.user = user.clone();
        }
        if let Some(server) = &self.server {
            config.server.base_url = server.clone();
        }
    }
}
