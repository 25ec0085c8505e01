mod command;
#[allow(clippy::module_inception)]
mod controller;
mod options;
mod snapshot;

pub use {
    command::ControllerCommand,
    controller::{RecordingController, UploadSettlement},
    options::{ControllerOptions, DEFAULT_CHUNK_INTERVAL},
    snapshot::{Notice, RecorderSnapshot},
};
