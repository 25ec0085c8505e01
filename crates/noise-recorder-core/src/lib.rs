//! Noise-recorder Core Library
//!
//! Recording-session state machine for capturing short audio clips against
//! a catalog of noise prompts and uploading each clip.
//!
//! A [`RecordingController`] drives a [`CaptureDevice`] through its
//! start/data/stop/error lifecycle, accumulates chunks in a
//! [`SessionState`], and hands the finished [`Artifact`] to an
//! [`Uploader`]. Renderers only ever read [`RecorderSnapshot`]s.
//!
//! # Example
//!
//! ```no_run
//! use noise_recorder_core::{
//!     Artifact, ControllerCommand, ControllerOptions, FileCaptureDevice, FileCaptureOptions,
//!     RecordingController, SessionResult, UploadOutcome, Uploader,
//! };
//!
//! use std::{path::Path, sync::Arc};
//!
//! use async_trait::async_trait;
//! use tokio::sync::{mpsc, watch};
//!
//! struct Discard;
//!
//! #[async_trait]
//! impl Uploader for Discard {
//!     async fn upload(&self, _artifact: Artifact, _user: &str) -> UploadOutcome {
//!         UploadOutcome::Success
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> SessionResult<()> {
//!     let mut options = ControllerOptions::new("you");
//!     options.prefix = "rain".to_string();
//!
//!     let controller = RecordingController::connect(
//!         |sink| FileCaptureDevice::open(Path::new("rain.webm"), FileCaptureOptions::default(), sink),
//!         Arc::new(Discard),
//!         options,
//!     )?;
//!
//!     let (command_tx, command_rx) = mpsc::channel(8);
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let _ = command_tx.send(ControllerCommand::Start).await;
//!     controller.run(command_rx, shutdown_rx).await
//! }
//! ```

mod capture;
mod catalog;
mod controller;
mod error;
mod session;
mod upload;

pub use {
    capture::{
        CaptureDevice, ConstructionErrorKind, ConstructionFailure, DeviceErrorKind, DeviceEvent,
        DeviceEventSink, DeviceFault, FileCaptureDevice, FileCaptureOptions, SUPPORTED_EXTENSIONS,
    },
    catalog::{Catalog, CatalogEntry, CatalogItem, CatalogSource, JsonFileCatalogSource},
    controller::{
        ControllerCommand, ControllerOptions, DEFAULT_CHUNK_INTERVAL, Notice, RecorderSnapshot,
        RecordingController, UploadSettlement,
    },
    error::{Result as SessionResult, SessionError},
    session::{
        Artifact, Clock, Filename, ManualClock, MonotonicClock, SessionSnapshot, SessionState,
        SessionStatus,
    },
    upload::{NOISE_FIELD, USER_FIELD, UploadOutcome, Uploader},
};

#[cfg(feature = "microphone")]
pub use capture::MicrophoneCaptureDevice;

#[cfg(test)]
mod tests;
