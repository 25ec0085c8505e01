use crate::{
    CaptureDevice, ConstructionErrorKind, ControllerCommand, ControllerOptions, DeviceErrorKind,
    DeviceEvent, DeviceEventSink, FileCaptureDevice, FileCaptureOptions, RecordingController,
    SessionStatus, UploadOutcome, tests::support::StubUploader,
};

use std::{io::Write, path::Path, time::Duration};

use tempfile::{NamedTempFile, TempDir};
use tokio::sync::{mpsc, watch};

const INTERVAL: Duration = Duration::from_millis(5);
const WAIT: Duration = Duration::from_secs(5);

fn audio_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".webm").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn eof_options(chunk_bytes: usize) -> FileCaptureOptions {
    FileCaptureOptions {
        chunk_bytes,
        stop_at_eof: true,
    }
}

async fn collect_until_stopped(rx: &mut mpsc::UnboundedReceiver<DeviceEvent>) -> Vec<DeviceEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        let stopped = event == DeviceEvent::Stopped;
        events.push(event);
        if stopped {
            return events;
        }
    }
}

/// WHAT: Unknown container extension is rejected at construction
/// WHY: Matches the device contract for unsupported formats
#[test]
fn given_unsupported_extension_when_opening_then_unsupported_format() {
    // Given: A file with an unsupported extension
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clip.flac");
    std::fs::write(&path, b"data").unwrap();
    let (sink, _rx) = DeviceEventSink::channel();

    // When: Opening the device
    let result = FileCaptureDevice::open(&path, FileCaptureOptions::default(), sink);

    // Then: UnsupportedFormat
    assert_eq!(
        result.err().map(|f| f.kind),
        Some(ConstructionErrorKind::UnsupportedFormat)
    );
}

/// WHAT: Missing file is rejected at construction
/// WHY: The device must fail before the session could start
#[test]
fn given_missing_file_when_opening_then_other_failure() {
    // Given: A path that does not exist
    let (sink, _rx) = DeviceEventSink::channel();

    // When: Opening the device
    let result = FileCaptureDevice::open(
        Path::new("/nonexistent/clip.webm"),
        FileCaptureOptions::default(),
        sink,
    );

    // Then: Other
    assert_eq!(
        result.err().map(|f| f.kind),
        Some(ConstructionErrorKind::Other)
    );
}

/// WHAT: Replay emits started, ordered chunks, an empty boundary, stopped
/// WHY: Event order is what the controller relies on
#[tokio::test]
async fn given_file_when_replaying_to_eof_then_events_in_order() {
    // Given: A 10-byte file replayed 4 bytes at a time
    let bytes: Vec<u8> = (0..10).collect();
    let file = audio_file(&bytes);
    let (sink, mut rx) = DeviceEventSink::channel();
    let mut device = FileCaptureDevice::open(file.path(), eof_options(4), sink).unwrap();

    // When: Starting and letting it run to EOF
    device.start(INTERVAL).unwrap();
    let events = collect_until_stopped(&mut rx).await;

    // Then: Started, 4+4+2 byte chunks, empty boundary, Stopped
    assert_eq!(
        events,
        vec![
            DeviceEvent::Started,
            DeviceEvent::Data(vec![0, 1, 2, 3]),
            DeviceEvent::Data(vec![4, 5, 6, 7]),
            DeviceEvent::Data(vec![8, 9]),
            DeviceEvent::Data(Vec::new()),
            DeviceEvent::Stopped,
        ]
    );
    assert_eq!(device.file_extension(), "webm");
}

/// WHAT: Explicit stop ends replay before EOF
/// WHY: The user decides when the recording ends
#[tokio::test]
async fn given_running_replay_when_stopping_then_stopped_follows() {
    // Given: A replay that never stops by itself
    let file = audio_file(&[1u8; 64]);
    let (sink, mut rx) = DeviceEventSink::channel();
    let mut device = FileCaptureDevice::open(
        file.path(),
        FileCaptureOptions {
            chunk_bytes: 1,
            stop_at_eof: false,
        },
        sink,
    )
    .unwrap();
    device.start(Duration::from_secs(60)).unwrap();
    assert_eq!(
        tokio::time::timeout(WAIT, rx.recv()).await.unwrap(),
        Some(DeviceEvent::Started)
    );

    // When: Stopping
    device.stop().unwrap();

    // Then: Boundary buffer then Stopped
    let events = collect_until_stopped(&mut rx).await;
    assert_eq!(events, vec![DeviceEvent::Data(Vec::new()), DeviceEvent::Stopped]);
}

/// WHAT: Stop without start and double start are rejected
/// WHY: Device misuse maps to the InvalidState kind
#[tokio::test]
async fn given_idle_device_when_misused_then_invalid_state() {
    // Given: An opened device
    let file = audio_file(b"abc");
    let (sink, _rx) = DeviceEventSink::channel();
    let mut device = FileCaptureDevice::open(file.path(), FileCaptureOptions::default(), sink)
        .unwrap();

    // When/Then: Stop before start is InvalidState
    assert_eq!(
        device.stop().err().map(|f| f.kind),
        Some(DeviceErrorKind::InvalidState)
    );

    // When/Then: Starting twice is InvalidState
    device.start(Duration::from_secs(60)).unwrap();
    assert_eq!(
        device.start(Duration::from_secs(60)).err().map(|f| f.kind),
        Some(DeviceErrorKind::InvalidState)
    );
    device.stop().unwrap();
}

/// WHAT: File replay through the controller uploads the whole file
/// WHY: End-to-end check of device, session, and uploader together
#[tokio::test]
async fn given_file_device_when_recording_to_eof_then_artifact_equals_file() {
    // Given: A controller over a file device that stops at EOF
    let bytes: Vec<u8> = (0..=255).collect();
    let file = audio_file(&bytes);
    let uploader = StubUploader::new(UploadOutcome::Success);
    let mut options = ControllerOptions::new("tester");
    options.prefix = "rain".to_string();
    options.chunk_interval = INTERVAL;

    let controller = RecordingController::connect(
        |sink| FileCaptureDevice::open(file.path(), eof_options(100), sink),
        uploader.clone(),
        options,
    )
    .unwrap();
    let mut snapshots = controller.subscribe();
    let (command_tx, command_rx) = mpsc::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(controller.run(command_rx, shutdown_rx));

    // When: Starting and waiting for the upload
    command_tx.send(ControllerCommand::Start).await.unwrap();
    let snap = tokio::time::timeout(
        WAIT,
        snapshots.wait_for(|s| s.session.status == SessionStatus::Uploaded),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    // Then: One upload, bytes identical to the file, three chunks counted
    let calls = uploader.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.bytes(), bytes.as_slice());
    assert_eq!(calls[0].1, "tester");
    assert!(calls[0].0.filename().starts_with("rain."));
    assert!(calls[0].0.filename().ends_with(".webm"));
    assert_eq!(snap.session.chunk_number, 3);

    command_tx.send(ControllerCommand::Shutdown).await.unwrap();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();
}
