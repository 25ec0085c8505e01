use crate::capture::{
    CaptureDevice, ConstructionErrorKind, ConstructionFailure, DeviceErrorKind, DeviceEventSink,
    DeviceFault,
};

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use cpal::{
    BuildStreamError, Device, SampleFormat, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tokio::{runtime::Handle, sync::oneshot, task::JoinHandle};
use tracing::{debug, error, info, instrument};

/// Default input device emitting raw little-endian `f32` PCM chunks.
///
/// The audio callback appends to a shared byte buffer; a drain task hands
/// the buffer to the sink on every chunk interval, so the callback never
/// touches the event channel.
pub struct MicrophoneCaptureDevice {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    pending: Arc<Mutex<Vec<u8>>>,
    /// Signals the audio callback to stop writing. Set before the stream
    /// is dropped so no late callback lands after the final drain.
    shutdown: Arc<AtomicBool>,
    sink: DeviceEventSink,
    stop_tx: Option<oneshot::Sender<()>>,
    drain: Option<JoinHandle<()>>,
}

impl MicrophoneCaptureDevice {
    /// Open the host's default input device.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` if the device does not deliver `f32` samples;
    /// `Other` if no input device or configuration is available.
    #[instrument(skip(sink))]
    pub fn open(sink: DeviceEventSink) -> Result<Self, ConstructionFailure> {
        let host = cpal::default_host();

        let device = host.default_input_device().ok_or_else(|| {
            ConstructionFailure::new(ConstructionErrorKind::Other, "No microphone found")
        })?;

        let config = device.default_input_config().map_err(|e| {
            ConstructionFailure::new(
                ConstructionErrorKind::Other,
                format!("Failed to get config: {}", e),
            )
        })?;

        if config.sample_format() != SampleFormat::F32 {
            return Err(ConstructionFailure::new(
                ConstructionErrorKind::UnsupportedFormat,
                format!("Unsupported sample format: {:?}", config.sample_format()),
            ));
        }

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Microphone capture device opened"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            pending: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
            sink,
            stop_tx: None,
            drain: None,
        })
    }
}

impl CaptureDevice for MicrophoneCaptureDevice {
    #[instrument(skip(self))]
    fn start(&mut self, chunk_interval: Duration) -> Result<(), DeviceFault> {
        if self.stream.is_some() {
            return Err(DeviceFault::new(
                DeviceErrorKind::InvalidState,
                "Microphone already capturing",
            ));
        }

        let handle = Handle::try_current().map_err(|e| {
            DeviceFault::new(DeviceErrorKind::Other, format!("No async runtime: {}", e))
        })?;

        self.shutdown.store(false, Ordering::Release);
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();

        let pending = Arc::clone(&self.pending);
        let shutdown = Arc::clone(&self.shutdown);
        let error_sink = self.sink.clone();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned buffer is still valid bytes; keep recording.
                    let mut buf = pending.lock().unwrap_or_else(|e| {
                        error!("Capture buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    buf.extend(data.iter().flat_map(|s| s.to_le_bytes()));
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_sink.error(DeviceErrorKind::Other, err.to_string());
                },
                None,
            )
            .map_err(|e| {
                let kind = match e {
                    BuildStreamError::DeviceNotAvailable => DeviceErrorKind::InvalidState,
                    _ => DeviceErrorKind::Other,
                };
                DeviceFault::new(kind, format!("Failed to build stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            DeviceFault::new(
                DeviceErrorKind::Other,
                format!("Failed to start stream: {}", e),
            )
        })?;

        self.stream = Some(stream);
        self.sink.started();

        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);
        self.drain = Some(handle.spawn(drain(
            Arc::clone(&self.pending),
            chunk_interval.max(Duration::from_millis(1)),
            self.sink.clone(),
            stop_rx,
        )));

        info!("Microphone capture started");

        Ok(())
    }

    #[instrument(skip(self))]
    fn stop(&mut self) -> Result<(), DeviceFault> {
        let stream = self.stream.take().ok_or_else(|| {
            DeviceFault::new(DeviceErrorKind::InvalidState, "Microphone not capturing")
        })?;

        self.shutdown.store(true, Ordering::Release);
        drop(stream);

        if let Some(stop_tx) = self.stop_tx.take() {
            if stop_tx.send(()).is_err() {
                debug!("Drain task already finished");
            }
        }
        self.drain = None;

        info!("Microphone capture stopped");

        Ok(())
    }

    fn file_extension(&self) -> &str {
        "pcm"
    }
}

async fn drain(
    pending: Arc<Mutex<Vec<u8>>>,
    interval: Duration,
    sink: DeviceEventSink,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let take = || std::mem::take(&mut *pending.lock().unwrap_or_else(|e| e.into_inner()));

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => sink.data(take()),
        }
    }

    sink.data(take());
    sink.stopped();
}
