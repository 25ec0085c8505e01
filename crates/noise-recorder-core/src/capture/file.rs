use crate::capture::{
    CaptureDevice, ConstructionErrorKind, ConstructionFailure, DeviceErrorKind, DeviceEventSink,
    DeviceFault,
};

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::{runtime::Handle, sync::oneshot, task::JoinHandle};
use tracing::{debug, info, instrument};

/// Container extensions the file device will stream.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["webm", "ogg", "opus", "wav", "mp4", "m4a"];

/// Default bytes emitted per chunk interval (16 KiB).
const DEFAULT_CHUNK_BYTES: usize = 16 * 1024;

/// Tuning for [`FileCaptureDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileCaptureOptions {
    /// Bytes emitted on each tick.
    pub chunk_bytes: usize,
    /// Emit `Stopped` on its own once the file is exhausted.
    pub stop_at_eof: bool,
}

impl Default for FileCaptureOptions {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            stop_at_eof: false,
        }
    }
}

/// Capture device that replays an already-encoded audio file.
///
/// Each tick of the chunk interval emits the next `chunk_bytes` of the
/// file. Once the file is exhausted the device idles until stopped (or
/// stops itself with `stop_at_eof`). Stopping emits an empty boundary
/// buffer followed by `Stopped`.
pub struct FileCaptureDevice {
    path: PathBuf,
    bytes: Arc<[u8]>,
    extension: String,
    options: FileCaptureOptions,
    sink: DeviceEventSink,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FileCaptureDevice {
    /// Open `path` for replay.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` if the extension is not in [`SUPPORTED_EXTENSIONS`];
    /// `Other` if the file cannot be read.
    #[instrument(skip(sink))]
    pub fn open(
        path: &Path,
        options: FileCaptureOptions,
        sink: DeviceEventSink,
    ) -> Result<Self, ConstructionFailure> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                ConstructionFailure::new(
                    ConstructionErrorKind::UnsupportedFormat,
                    format!("No file extension on {}", path.display()),
                )
            })?;

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ConstructionFailure::new(
                ConstructionErrorKind::UnsupportedFormat,
                format!("Unsupported container: .{}", extension),
            ));
        }

        if options.chunk_bytes == 0 {
            return Err(ConstructionFailure::new(
                ConstructionErrorKind::Other,
                "chunk_bytes must be greater than zero",
            ));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            ConstructionFailure::new(
                ConstructionErrorKind::Other,
                format!("Failed to read {}: {}", path.display(), e),
            )
        })?;

        info!(
            path = %path.display(),
            bytes = bytes.len(),
            extension = %extension,
            "File capture device opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            bytes: bytes.into(),
            extension,
            options,
            sink,
            stop_tx: None,
            task: None,
        })
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl CaptureDevice for FileCaptureDevice {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn start(&mut self, chunk_interval: Duration) -> Result<(), DeviceFault> {
        if self.is_capturing() {
            return Err(DeviceFault::new(
                DeviceErrorKind::InvalidState,
                "File capture already running",
            ));
        }

        let handle = Handle::try_current().map_err(|e| {
            DeviceFault::new(DeviceErrorKind::Other, format!("No async runtime: {}", e))
        })?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = handle.spawn(replay(
            Arc::clone(&self.bytes),
            self.options,
            chunk_interval.max(Duration::from_millis(1)),
            self.sink.clone(),
            stop_rx,
        ));

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);

        debug!(interval_ms = chunk_interval.as_millis(), "File capture started");

        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn stop(&mut self) -> Result<(), DeviceFault> {
        let stop_tx = self.stop_tx.take().ok_or_else(|| {
            DeviceFault::new(DeviceErrorKind::InvalidState, "File capture not running")
        })?;

        // Already finished at EOF: Stopped has been emitted.
        if stop_tx.send(()).is_err() {
            debug!("File capture already ended");
        }

        Ok(())
    }

    fn file_extension(&self) -> &str {
        &self.extension
    }
}

async fn replay(
    bytes: Arc<[u8]>,
    options: FileCaptureOptions,
    interval: Duration,
    sink: DeviceEventSink,
    mut stop_rx: oneshot::Receiver<()>,
) {
    sink.started();

    let mut ticker = tokio::time::interval(interval);
    // First tick completes immediately; data is due one interval after start.
    ticker.tick().await;

    let mut offset = 0;
    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                if offset < bytes.len() {
                    let end = (offset + options.chunk_bytes).min(bytes.len());
                    sink.data(bytes[offset..end].to_vec());
                    offset = end;
                } else if options.stop_at_eof {
                    break;
                }
            }
        }
    }

    sink.data(Vec::new());
    sink.stopped();

    debug!(bytes_emitted = offset, "File capture stopped");
}
