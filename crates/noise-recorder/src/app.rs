use crate::{AppCommand, AppError, AppResult, input_handler::USAGE, status_renderer};

use noise_recorder_core::{Catalog, ControllerCommand, RecorderSnapshot, SessionStatus};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Translates user commands into controller commands. Owns the catalog;
/// the recording session itself lives in the controller task.
pub struct App {
    pub(crate) catalog: Catalog,
    pub(crate) controller_tx: mpsc::Sender<ControllerCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) snapshots: watch::Receiver<RecorderSnapshot>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Noise-Recorder starting");

        print!("{}", status_renderer::render_catalog(&self.catalog));

        loop {
            let Some(cmd) = self.command_rx.recv().await else {
                info!("All channels closed, shutting down");
                break;
            };

            let result = match cmd {
                AppCommand::Toggle => self.toggle().await,
                AppCommand::Select { index } => self.select(index).await,
                AppCommand::SelectByName { name } => match self.catalog.find(&name) {
                    Some(index) => self.select(index).await,
                    None => {
                        warn!(name = %name, "No catalog entry with that name");
                        Ok(())
                    }
                },
                AppCommand::List => {
                    print!("{}", status_renderer::render_catalog(&self.catalog));
                    Ok(())
                }
                AppCommand::Help => {
                    println!("{}", USAGE);
                    Ok(())
                }
                AppCommand::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            };

            if let Err(e) = result {
                error!(error = ?e, "Failed to handle command");
            }
        }

        // The controller finalizes an active recording before it exits.
        if self.controller_tx.send(ControllerCommand::Shutdown).await.is_err() {
            warn!("Controller already stopped");
        }
        let _ = self.shutdown_tx.send(true);

        info!("Noise-Recorder shut down");

        Ok(())
    }

    /// The record button.
    ///
    /// Waiting starts, Recording stops, Uploaded starts over with the
    /// selected prompt. Ignored while an upload is in flight.
    async fn toggle(&mut self) -> AppResult<()> {
        let status = self.snapshots.borrow_and_update().session.status;

        match status {
            SessionStatus::Waiting => self.send(ControllerCommand::Start).await,
            SessionStatus::Recording => self.send(ControllerCommand::Stop).await,
            SessionStatus::Uploading => {
                info!("Upload in progress, ignoring record request");
                Ok(())
            }
            SessionStatus::Uploaded => {
                self.send(ControllerCommand::Rearm).await?;
                self.send(ControllerCommand::Start).await
            }
        }
    }

    async fn select(&mut self, index: usize) -> AppResult<()> {
        let prefix = self.catalog.select(index)?.name.clone();

        info!(index, prefix = %prefix, "Catalog entry selected");

        self.send(ControllerCommand::Select { prefix }).await
    }

    async fn send(&self, cmd: ControllerCommand) -> AppResult<()> {
        self.controller_tx
            .send(cmd)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send controller command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
