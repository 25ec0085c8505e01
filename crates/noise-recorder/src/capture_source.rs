use crate::config::{CaptureConfig, CaptureSource};

use noise_recorder_core::{
    CaptureDevice, ConstructionErrorKind, ConstructionFailure, DeviceEventSink, FileCaptureDevice,
    FileCaptureOptions,
};

use tracing::instrument;

/// Open the configured capture device.
///
/// # Errors
///
/// `Other` if the file source has no input path or the microphone source
/// was not compiled in; otherwise whatever the device's `open` reports.
#[instrument(skip(sink))]
pub fn open_device(
    config: &CaptureConfig,
    sink: DeviceEventSink,
) -> Result<Box<dyn CaptureDevice>, ConstructionFailure> {
    match config.source {
        CaptureSource::File => {
            let path = config.input_path.as_deref().ok_or_else(|| {
                ConstructionFailure::new(
                    ConstructionErrorKind::Other,
                    "No input file configured (use --input)",
                )
            })?;
            let options = FileCaptureOptions {
                chunk_bytes: config.chunk_bytes,
                stop_at_eof: config.stop_at_eof,
            };
            let device = FileCaptureDevice::open(path, options, sink)?;
            Ok(Box::new(device))
        }
        CaptureSource::Microphone => open_microphone(sink),
    }
}

#[cfg(feature = "microphone")]
fn open_microphone(sink: DeviceEventSink) -> Result<Box<dyn CaptureDevice>, ConstructionFailure> {
    let device = noise_recorder_core::MicrophoneCaptureDevice::open(sink)?;
    Ok(Box::new(device))
}

#[cfg(not(feature = "microphone"))]
fn open_microphone(_sink: DeviceEventSink) -> Result<Box<dyn CaptureDevice>, ConstructionFailure> {
    Err(ConstructionFailure::new(
        ConstructionErrorKind::Other,
        "Microphone capture not compiled in (build with --features microphone)",
    ))
}
