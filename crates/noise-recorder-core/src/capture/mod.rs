mod device;
mod file;
#[cfg(feature = "microphone")]
mod microphone;

pub use {
    device::{
        CaptureDevice, ConstructionErrorKind, ConstructionFailure, DeviceErrorKind, DeviceEvent,
        DeviceEventSink, DeviceFault,
    },
    file::{FileCaptureDevice, FileCaptureOptions, SUPPORTED_EXTENSIONS},
};

#[cfg(feature = "microphone")]
pub use microphone::MicrophoneCaptureDevice;
