//! Noise-Recorder: record noise prompts from a catalog and upload them.

mod app;
mod app_command;
mod capture_source;
mod cli;
mod config;
mod error;
mod http_catalog;
mod http_uploader;
mod input_handler;
mod status_renderer;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    cli::Cli,
    error::{AppError, Result as AppResult},
    http_catalog::HttpCatalogSource,
    http_uploader::HttpUploader,
    input_handler::InputHandler,
    status_renderer::StatusRenderer,
};

use crate::config::Config;

use noise_recorder_core::{
    Catalog, CatalogSource, ControllerOptions, JsonFileCatalogSource, RecordingController,
};

use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "noise_recorder=info,noise_recorder_core=info";

/// Application entry point.
#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Noise-Recorder failed: {:?}", e);
            1
        }
    };

    // Stdin is read on a blocking thread that never returns on its own.
    std::process::exit(code);
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);
    config.validate()?;

    let source: Box<dyn CatalogSource> = match &cli.catalog_file {
        Some(path) => Box::new(JsonFileCatalogSource::new(path.clone())),
        None => Box::new(HttpCatalogSource::new(config.server.catalog_url())?),
    };
    let mut catalog = Catalog::new(source.load().await?)?;

    if let Some(name) = &cli.noise {
        match catalog.find(name) {
            Some(index) => {
                catalog.select(index)?;
            }
            None => warn!(noise = %name, "Unknown noise, keeping the first entry"),
        }
    }

    let uploader = HttpUploader::new(config.server.upload_url())?;

    let mut options = ControllerOptions::new(config.recorder.user.clone());
    options.chunk_interval = config.chunk_interval();
    options.prefix = catalog.selected().name.clone();

    let capture = config.capture.clone();
    let controller = RecordingController::connect(
        |sink| capture_source::open_device(&capture, sink),
        Arc::new(uploader),
        options,
    )?;

    info!(
        upload_url = %config.server.upload_url(),
        user = %config.recorder.user,
        noise = %catalog.selected().name,
        "Recorder ready"
    );

    let (controller_tx, controller_rx) = mpsc::channel(32);
    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let snapshots = controller.subscribe();
    let renderer = StatusRenderer::new(controller.subscribe());
    let input_handler = InputHandler::new(command_tx);

    let controller_task = tokio::spawn(controller.run(controller_rx, shutdown_rx.clone()));

    let app = App {
        catalog,
        controller_tx,
        command_rx,
        snapshots,
        shutdown_tx,
    };

    println!("{}", input_handler::USAGE);

    tokio::join!(
        renderer.run(shutdown_rx.clone()),
        async {
            if let Err(e) = input_handler.run(shutdown_rx.clone()).await {
                error!(error = ?e, "Input handler error");
            }
        },
        async {
            if let Err(e) = app.run().await {
                error!(error = ?e, "App error");
            }
        }
    );

    match controller_task.await {
        Ok(result) => result?,
        Err(e) => error!(error = ?e, "Controller task panicked"),
    }

    Ok(())
}
