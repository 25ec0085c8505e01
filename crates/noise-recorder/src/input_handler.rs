//! Terminal input handler.
//!
//! Reads lines from stdin and turns them into [`AppCommand`]s. An empty line
//! acts as the record button.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, error, info, instrument, warn};

/// Usage text printed on `help`.
pub const USAGE: &str = "\
  <Enter>        start / stop recording (after an upload, starts over)
  <number>       select catalog entry by position
  <name>         select catalog entry by name
  list, l        show the catalog
  help, h        show this help
  quit, q        exit";

/// Parse one input line.
pub fn parse_line(line: &str) -> Option<AppCommand> {
    let line = line.trim();

    match line.to_ascii_lowercase().as_str() {
        "" => return Some(AppCommand::Toggle),
        "q" | "quit" | "exit" => return Some(AppCommand::Shutdown),
        "l" | "list" => return Some(AppCommand::List),
        "h" | "help" | "?" => return Some(AppCommand::Help),
        _ => {}
    }

    match line.parse::<usize>() {
        Ok(0) => None,
        Ok(n) => Some(AppCommand::Select { index: n - 1 }),
        Err(_) => Some(AppCommand::SelectByName {
            name: line.to_string(),
        }),
    }
}

/// Stdin reader forwarding commands to the application.
pub struct InputHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl InputHandler {
    /// Create a handler sending on `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run on stdin until shutdown or end of input.
    ///
    /// End of input is treated as a quit request.
    #[instrument(skip_all)]
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), shutdown_rx).await
    }

    /// Run on `reader` until shutdown or end of input.
    ///
    /// A read error also asks the application to quit, so the app loop never
    /// waits on a reader that is gone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::IoError`] if reading fails, or
    /// [`AppError::ChannelSendFailed`] if the application has stopped.
    pub async fn run_with<R>(
        self,
        reader: R,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("Input handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            error!(error = %e, "Failed to read input, shutting down");
                            if self.send(AppCommand::Shutdown).await.is_err() {
                                debug!("Application already stopped");
                            }
                            return Err(e.into());
                        }
                    };

                    match line {
                        Some(line) => match parse_line(&line) {
                            Some(cmd) => self.send(cmd).await?,
                            None => warn!(input = %line, "Unrecognized input"),
                        },
                        None => {
                            info!("End of input");
                            self.send(AppCommand::Shutdown).await?;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn send(&self, cmd: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send input command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
